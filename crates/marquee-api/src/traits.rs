//! The seam between the UI-side state machines and the network.

use std::future::Future;

use marquee_core::models::{MovieDetails, MovieId, MovieSummary};

use crate::error::ApiError;

/// Something that can answer movie searches and detail lookups.
///
/// [`crate::ProxyClient`] is the production implementation; tests swap in
/// scripted fakes.
pub trait MovieSource: Send + Sync + 'static {
    /// First page of results for a title query.
    fn search_movies(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<MovieSummary>, ApiError>> + Send;

    /// Full details for one movie.
    fn movie_details(
        &self,
        id: MovieId,
    ) -> impl Future<Output = Result<MovieDetails, ApiError>> + Send;
}
