use std::future::Future;

use serde_json::Value;

use marquee_api::tmdb::TmdbMovieDetails;
use marquee_api::{ApiError, TmdbClient};
use marquee_core::models::MovieId;

/// The upstream calls the routes make.
pub trait Upstream: Send + Sync + 'static {
    /// Raw search records, passed through to the caller untouched.
    fn search_movies(&self, query: &str)
        -> impl Future<Output = Result<Vec<Value>, ApiError>> + Send;

    fn movie_details(
        &self,
        id: MovieId,
    ) -> impl Future<Output = Result<TmdbMovieDetails, ApiError>> + Send;
}

impl Upstream for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<Value>, ApiError> {
        TmdbClient::search_movies(self, query).await
    }

    async fn movie_details(&self, id: MovieId) -> Result<TmdbMovieDetails, ApiError> {
        self.get_movie(id).await
    }
}
