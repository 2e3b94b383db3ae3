//! OMDb-style metadata client.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use thiserror::Error;

/// Errors from the metadata client.
#[derive(Debug, Error)]
pub enum MovieError {
    #[error("no movie found for '{title}': {message}")]
    NotFound { title: String, message: String },
    #[error("request failed: {0}")]
    Http(String),
    #[error("submit endpoint rejected the form: {0}")]
    SubmitRejected(String),
}

/// The JSON payload returned by the metadata API.
///
/// Field names follow the API's PascalCase convention. `Response` is
/// the string `"True"` or `"False"`; on `"False"` only `Error` is
/// populated, so every data field tolerates absence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePayload {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Rated", default)]
    pub rated: Option<String>,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Writer", default)]
    pub writer: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Country", default)]
    pub country: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Production", default)]
    pub production: String,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Response", default)]
    pub response: String,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

/// Client for the metadata API.
pub struct MovieClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl MovieClient {
    /// Creates a client against `api_base` using `api_key`.
    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }

    /// The query URL for a title search.
    pub fn build_url(&self, title: &str) -> String {
        format!(
            "{}?apikey={}&t={}",
            self.api_base,
            self.api_key,
            utf8_percent_encode(title, NON_ALPHANUMERIC)
        )
    }

    /// Fetches metadata for `title`.
    pub async fn fetch(&self, title: &str) -> Result<MoviePayload, MovieError> {
        let url = self.build_url(title);
        tracing::debug!("Fetching {}", url);
        let payload = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MovieError::Http(e.to_string()))?
            .json::<MoviePayload>()
            .await
            .map_err(|e| MovieError::Http(e.to_string()))?;
        check_found(title, payload)
    }
}

/// Rejects `Response: "False"` payloads with a typed error.
pub fn check_found(title: &str, payload: MoviePayload) -> Result<MoviePayload, MovieError> {
    if payload.response == "False" {
        return Err(MovieError::NotFound {
            title: title.to_string(),
            message: payload
                .error
                .unwrap_or_else(|| "no error message".to_string()),
        });
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_key_and_encoded_title() {
        let client = MovieClient::new(
            "http://www.omdbapi.com/".to_string(),
            "f02e43b0".to_string(),
        );
        assert_eq!(
            client.build_url("Guardians of the Galaxy"),
            "http://www.omdbapi.com/?apikey=f02e43b0&t=Guardians%20of%20the%20Galaxy"
        );
    }

    #[test]
    fn missing_movie_is_a_typed_not_found() {
        let payload: MoviePayload =
            serde_json::from_str(r#"{"Response":"False","Error":"Movie not found!"}"#).unwrap();
        let err = check_found("nope", payload).unwrap_err();
        match err {
            MovieError::NotFound { title, message } => {
                assert_eq!(title, "nope");
                assert_eq!(message, "Movie not found!");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn found_payload_passes_through() {
        let payload: MoviePayload = serde_json::from_str(
            r#"{"Title":"Up","Year":"2009","Response":"True","imdbID":"tt1049413"}"#,
        )
        .unwrap();
        let payload = check_found("Up", payload).unwrap();
        assert_eq!(payload.title, "Up");
        assert_eq!(payload.imdb_id, "tt1049413");
        assert_eq!(payload.rated, None);
    }
}
