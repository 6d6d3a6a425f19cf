use reqwest::Client;
use tracing::debug;

use marquee_core::models::MovieId;

use super::types::{TmdbErrorBody, TmdbMovieDetails};
use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB v3 REST client holding the secret API key.
///
/// Only the proxy constructs one of these. A client without a key still
/// builds, but every call fails with [`ApiError::MissingKey`].
#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
}

impl TmdbClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self::with_client(Client::new(), api_key, base_url, language)
    }

    pub fn with_client(
        http: Client,
        api_key: Option<String>,
        base_url: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            language: language.into(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key.as_deref().ok_or(ApiError::MissingKey)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Pass successful responses through; turn failures into [`ApiError::Api`]
    /// carrying TMDB's `status_message` (empty when there is none).
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TmdbErrorBody>(&body)
                .ok()
                .and_then(|b| b.status_message)
                .unwrap_or_default();
            Err(ApiError::Api { status, message })
        }
    }

    /// Search movies by title, first page only.
    ///
    /// Records are returned untouched so the proxy can pass them through.
    pub async fn search_movies(&self, query: &str) -> Result<Vec<serde_json::Value>, ApiError> {
        let api_key = self.api_key()?;
        debug!(query, "TMDB movie search");

        let resp = self
            .http
            .get(self.url("/search/movie"))
            .header("Accept", "application/json")
            .query(&[
                ("api_key", api_key),
                ("query", query),
                ("include_adult", "false"),
                ("language", self.language.as_str()),
                ("page", "1"),
            ])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(body
            .get("results")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default())
    }

    /// Get movie details.
    ///
    /// GET /movie/{movie_id}
    pub async fn get_movie(&self, id: MovieId) -> Result<TmdbMovieDetails, ApiError> {
        let api_key = self.api_key()?;
        debug!(id, "TMDB movie details");

        let resp = self
            .http
            .get(self.url(&format!("/movie/{id}")))
            .header("Accept", "application/json")
            .query(&[("api_key", api_key), ("language", self.language.as_str())])
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}
