//! Client for the `marquee-proxy` routes.
//!
//! This is the only network path the UI side uses; it never sees the
//! upstream credential.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use marquee_core::models::{MovieDetails, MovieId, MovieSummary};

use crate::error::ApiError;
use crate::tmdb::TmdbMovieSearchResult;
use crate::traits::MovieSource;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    movie: MovieDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

/// HTTP client for `GET {base}/search` and `GET {base}/movie/{id}`.
#[derive(Clone)]
pub struct ProxyClient {
    base: Url,
    http: Client,
}

impl ProxyClient {
    /// `base_url` is the route prefix, e.g. `http://127.0.0.1:3000/api/tmdb`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            http: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Parse(format!("base URL cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Pass successful responses through; otherwise surface the proxy's
    /// `{error}` text (empty when the body has none).
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_default();
            Err(ApiError::Api { status, message })
        }
    }
}

/// Records are decoded one at a time; a malformed record is dropped
/// without failing the rest of the page.
fn decode_results(results: Vec<Value>) -> Vec<MovieSummary> {
    results
        .into_iter()
        .filter_map(|record| {
            match serde_json::from_value::<TmdbMovieSearchResult>(record) {
                Ok(result) => Some(result.into_summary()),
                Err(e) => {
                    warn!("Skipping malformed search record: {e}");
                    None
                }
            }
        })
        .collect()
}

impl MovieSource for ProxyClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, ApiError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("query", query);
        debug!(query, "Proxy search");

        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(decode_results(body.results))
    }

    async fn movie_details(&self, id: MovieId) -> Result<MovieDetails, ApiError> {
        let url = self.endpoint(&["movie", &id.to_string()])?;
        debug!(id, "Proxy details");

        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body: DetailsResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(body.movie)
    }
}
