//! The movie form filled from a metadata payload.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::client::{MovieError, MoviePayload};

/// A flat form with one field per input the screen shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieForm {
    pub title: String,
    pub year: String,
    pub runtime: String,
    pub country: String,
    pub imdb_id: String,
    pub plot: String,
    pub director: String,
    pub production: String,
    pub released: String,
    pub writer: String,
    pub genre: String,
    pub poster: String,
}

impl From<MoviePayload> for MovieForm {
    fn from(payload: MoviePayload) -> Self {
        Self {
            title: payload.title,
            year: payload.year,
            runtime: payload.runtime,
            country: payload.country,
            imdb_id: payload.imdb_id,
            plot: payload.plot,
            director: payload.director,
            production: payload.production,
            released: payload.released,
            writer: payload.writer,
            genre: payload.genre,
            poster: payload.poster,
        }
    }
}

impl MovieForm {
    /// The form as an `application/x-www-form-urlencoded` body.
    pub fn submit_body(&self) -> String {
        let pairs: [(&str, &str); 12] = [
            ("imdb", &self.imdb_id),
            ("titulo", &self.title),
            ("anyo", &self.year),
            ("duracion", &self.runtime),
            ("pais", &self.country),
            ("sinop", &self.plot),
            ("director", &self.director),
            ("productor", &self.production),
            ("fecha", &self.released),
            ("guion", &self.writer),
            ("genero", &self.genre),
            ("portada", &self.poster),
        ];
        pairs
            .iter()
            .map(|(name, value)| {
                format!("{}={}", name, utf8_percent_encode(value, NON_ALPHANUMERIC))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Posts the form to `url`, succeeding only on a `correcto` body.
    pub async fn submit(&self, http: &reqwest::Client, url: &str) -> Result<(), MovieError> {
        let body = self
            .post_form(http, url)
            .await
            .map_err(|e| MovieError::Http(e.to_string()))?;
        if body == "correcto" {
            Ok(())
        } else {
            Err(MovieError::SubmitRejected(body))
        }
    }

    async fn post_form(&self, http: &reqwest::Client, url: &str) -> reqwest::Result<String> {
        http.post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(self.submit_body())
            .send()
            .await?
            .text()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> MoviePayload {
        serde_json::from_str(
            r#"{
                "Title": "Up",
                "Year": "2009",
                "Rated": "PG",
                "Released": "29 May 2009",
                "Runtime": "96 min",
                "Genre": "Animation",
                "Director": "Pete Docter",
                "Writer": "Pete Docter, Bob Peterson",
                "Plot": "78-year-old Carl sets out to fulfill his dream.",
                "Country": "USA",
                "Poster": "https://example.com/up.jpg",
                "Production": "Pixar",
                "imdbID": "tt1049413",
                "Response": "True"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn payload_maps_onto_every_form_field() {
        let form = MovieForm::from(sample_payload());
        assert_eq!(form.title, "Up");
        assert_eq!(form.year, "2009");
        assert_eq!(form.runtime, "96 min");
        assert_eq!(form.country, "USA");
        assert_eq!(form.imdb_id, "tt1049413");
        assert_eq!(form.director, "Pete Docter");
        assert_eq!(form.production, "Pixar");
        assert_eq!(form.released, "29 May 2009");
        assert_eq!(form.writer, "Pete Docter, Bob Peterson");
        assert_eq!(form.genre, "Animation");
        assert_eq!(form.poster, "https://example.com/up.jpg");
    }

    #[test]
    fn submit_body_is_urlencoded_pairs() {
        let form = MovieForm {
            title: "Up & Away".to_string(),
            imdb_id: "tt1".to_string(),
            ..Default::default()
        };
        let body = form.submit_body();
        assert!(body.starts_with("imdb=tt1&titulo=Up%20%26%20Away&"));
        assert!(body.ends_with("&portada="));
        assert_eq!(body.matches('&').count(), 11);
    }
}
