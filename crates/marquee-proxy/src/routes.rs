//! `/search` and `/movie/{id}` handlers.

use axum::{
    extract::{rejection::PathRejection, Path, RawQuery, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::debug;

use marquee_core::models::{MovieDetails, MovieId};

use crate::error::ProxyError;
use crate::state::AppState;
use crate::upstream::Upstream;

/// Trimmed queries shorter than this are answered locally.
pub const MIN_QUERY_LEN: usize = 2;

pub const SEARCH_FAILED: &str = "TMDB search failed.";
pub const DETAILS_FAILED: &str = "TMDB details failed.";

pub fn routes<U: Upstream>() -> Router<AppState<U>> {
    Router::new()
        .route("/search", get(search::<U>))
        .route("/movie/{id}", get(movie::<U>))
}

async fn search<U: Upstream>(
    State(state): State<AppState<U>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Value>, ProxyError> {
    let query = query_param(raw.as_deref());
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Ok(Json(json!({ "results": [] })));
    }

    let results = state
        .upstream
        .search_movies(query)
        .await
        .map_err(|e| ProxyError::from_upstream(e, SEARCH_FAILED))?;

    debug!(query, count = results.len(), "Search proxied");
    Ok(Json(json!({ "results": results })))
}

async fn movie<U: Upstream>(
    State(state): State<AppState<U>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ProxyError> {
    // A segment that does not percent-decode to UTF-8 is just a bad id.
    let Path(raw) = path.map_err(|_| ProxyError::InvalidId)?;
    let id = parse_movie_id(&raw)?;

    let details = state
        .upstream
        .movie_details(id)
        .await
        .map_err(|e| ProxyError::from_upstream(e, DETAILS_FAILED))?;

    debug!(id, "Details proxied");
    Ok(Json(json!({ "movie": MovieDetails::from(details) })))
}

/// First `query` value, decoded leniently. Missing means empty.
fn query_param(raw: Option<&str>) -> String {
    raw.and_then(|raw| {
        url::form_urlencoded::parse(raw.as_bytes())
            .find(|(key, _)| key == "query")
            .map(|(_, value)| value.into_owned())
    })
    .unwrap_or_default()
}

fn parse_movie_id(raw: &str) -> Result<MovieId, ProxyError> {
    match raw.trim().parse::<MovieId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ProxyError::InvalidId),
    }
}
