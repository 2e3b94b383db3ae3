//! Matchit routing for the CRUD screens.

use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::header::{CONTENT_TYPE, LOCATION};
use hyper::{Method, Request, Response, StatusCode};
use matchit::Router as MatchitRouter;

use crud_app::controller::Outcome;
use crud_app::view;
use crud_app::{form, AppError, Controller, ThingRecord};
use object_db_core::StoreError;

/// Routes HTTP requests to controller actions.
pub struct Router {
    inner: MatchitRouter<Route>,
    controller: Controller,
}

/// Route targets, method-dispatched in the handler.
#[derive(Clone, Copy)]
enum Route {
    Home,
    Collection,
    NewForm,
    Item,
    EditForm,
    DeleteAction,
    ResetAction,
}

impl Router {
    /// Creates the router with the full set of application routes.
    pub fn new(controller: Controller) -> Self {
        let mut inner = MatchitRouter::new();

        inner
            .insert("/", Route::Home)
            .expect("Failed to insert / route");
        inner
            .insert("/things", Route::Collection)
            .expect("Failed to insert /things route");
        inner
            .insert("/things/new", Route::NewForm)
            .expect("Failed to insert /things/new route");
        inner
            .insert("/things/{key}", Route::Item)
            .expect("Failed to insert /things/{key} route");
        inner
            .insert("/things/{key}/edit", Route::EditForm)
            .expect("Failed to insert /things/{key}/edit route");
        inner
            .insert("/things/{key}/delete", Route::DeleteAction)
            .expect("Failed to insert /things/{key}/delete route");
        inner
            .insert("/reset", Route::ResetAction)
            .expect("Failed to insert /reset route");

        Self { inner, controller }
    }

    /// Routes one request to its handler and renders the response.
    pub async fn route(&self, req: Request<IncomingBody>) -> Response<Bytes> {
        let path = req.uri().path().to_string();
        let method = req.method().clone();

        let (route, key) = match self.inner.at(&path) {
            Ok(matched) => {
                let key = match matched.params.get("key") {
                    Some(raw) => match raw.parse::<u64>() {
                        Ok(key) => Some(key),
                        Err(_) => {
                            return error_response(
                                StatusCode::BAD_REQUEST,
                                &format!("invalid key '{}'", raw),
                            );
                        }
                    },
                    None => None,
                };
                (*matched.value, key)
            }
            Err(_) => {
                return error_response(
                    StatusCode::NOT_FOUND,
                    &format!("no route found for {}", path),
                );
            }
        };

        let outcome = match (route, method, key) {
            (Route::Home, Method::GET, _) => self.controller.list().await,
            (Route::Collection, Method::GET, _) => self.controller.list().await,
            (Route::NewForm, Method::GET, _) => self.controller.show_create().await,
            (Route::Collection, Method::POST, _) => self.create(req).await,
            (Route::Item, Method::GET, Some(key)) => self.controller.show(key).await,
            (Route::EditForm, Method::GET, Some(key)) => self.controller.show_edit(key).await,
            (Route::Item, Method::POST, Some(key)) => self.edit(req, key).await,
            (Route::DeleteAction, Method::POST, Some(key)) => self.controller.delete(key).await,
            (Route::ResetAction, Method::POST, _) => self.controller.reset_database().await,
            _ => {
                return error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
            }
        };

        match outcome {
            Ok(Outcome::Screen(html)) => html_response(StatusCode::OK, html),
            Ok(Outcome::RedirectToList) => redirect_to_list(),
            Err(err) => {
                tracing::warn!("Request to {} failed: {}", path, err);
                let status = status_for(&err);
                error_response(status, &err.to_string())
            }
        }
    }

    async fn create(&self, req: Request<IncomingBody>) -> Result<Outcome, AppError> {
        let body = read_body(req).await?;
        let (_, thing) = form::parse_thing(&body)?;
        self.controller.create(thing).await
    }

    async fn edit(&self, req: Request<IncomingBody>, key: u64) -> Result<Outcome, AppError> {
        let body = read_body(req).await?;
        let (form_key, thing) = form::parse_thing(&body)?;
        if let Some(form_key) = form_key {
            if form_key != key {
                return Err(AppError::InvalidInput(format!(
                    "form key {} does not match path key {}",
                    form_key, key
                )));
            }
        }
        self.controller.edit(ThingRecord { key, thing }).await
    }
}

async fn read_body(req: Request<IncomingBody>) -> Result<String, AppError> {
    let bytes = req
        .into_body()
        .collect()
        .await
        .map_err(|e| AppError::InvalidInput(format!("failed to read request body: {}", e)))?
        .to_bytes();
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::InvalidInput("request body is not valid UTF-8".to_string()))
}

/// Maps application errors to HTTP status codes.
fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::MissingKey | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Store(StoreError::VersionConflict { .. }) => StatusCode::CONFLICT,
        AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn html_response(status: StatusCode, html: String) -> Response<Bytes> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Bytes::from(html))
        .unwrap_or_else(|_| fallback_response())
}

fn error_response(status: StatusCode, message: &str) -> Response<Bytes> {
    html_response(status, view::error_page(status.as_u16(), message))
}

fn redirect_to_list() -> Response<Bytes> {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(LOCATION, "/things")
        .body(Bytes::new())
        .unwrap_or_else(|_| fallback_response())
}

fn fallback_response() -> Response<Bytes> {
    let mut response = Response::new(Bytes::from("Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
