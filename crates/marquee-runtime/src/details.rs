//! Details view state for the selected movie.

use tracing::{debug, warn};

use marquee_api::ApiError;
use marquee_core::models::{MovieDetails, MovieId, MovieSummary};

use crate::attempt::{Attempt, AttemptTracker};

pub const DETAILS_FAILED: &str = "Failed to load details.";
pub const DETAILS_NETWORK_ERROR: &str = "Network error.";

/// A detail lookup the driver should perform.
#[derive(Debug, Clone)]
pub struct DetailRequest {
    pub attempt: Attempt,
    pub id: MovieId,
}

/// What the details view shows: fetched details where available, the
/// summary it was opened from otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: String,
    pub runtime: Option<u32>,
}

#[derive(Debug, Default)]
pub struct DetailFetcher {
    selected: Option<MovieSummary>,
    details: Option<MovieDetails>,
    loading: bool,
    error: Option<String>,
    attempts: AttemptTracker,
}

impl DetailFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the view for `movie`, or close it with `None`.
    ///
    /// Re-selecting the movie already open only refreshes the summary.
    pub fn select(&mut self, movie: Option<MovieSummary>) -> Option<DetailRequest> {
        let Some(movie) = movie else {
            self.close();
            return None;
        };

        if self.selected_id() == Some(movie.id) {
            self.selected = Some(movie);
            return None;
        }

        let id = movie.id;
        self.selected = Some(movie);
        self.details = None;
        self.error = None;
        self.loading = true;
        debug!(id, "Details requested");

        Some(DetailRequest {
            attempt: self.attempts.begin(),
            id,
        })
    }

    /// Close the view, discarding any in-flight lookup.
    pub fn close(&mut self) {
        self.attempts.abandon();
        self.selected = None;
        self.details = None;
        self.loading = false;
        self.error = None;
    }

    /// Apply a lookup outcome. Returns `false` for superseded attempts.
    pub fn apply(&mut self, generation: u64, result: Result<MovieDetails, ApiError>) -> bool {
        if !self.attempts.finish(generation) {
            debug!(generation, "Dropping stale details result");
            return false;
        }

        self.loading = false;
        match result {
            Ok(details) => {
                self.details = Some(details);
            }
            Err(e) => {
                warn!(id = ?self.selected_id(), "Details failed: {e}");
                self.details = None;
                self.error = Some(e.user_message(DETAILS_FAILED, DETAILS_NETWORK_ERROR));
            }
        }
        true
    }

    pub fn selected_id(&self) -> Option<MovieId> {
        self.selected.as_ref().map(|m| m.id)
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn details(&self) -> Option<&MovieDetails> {
        self.details.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Merged view; `None` while closed.
    pub fn view(&self) -> Option<DetailView> {
        let summary = self.selected.as_ref()?;
        let details = self.details.as_ref();

        Some(DetailView {
            id: summary.id,
            title: details
                .map(|d| d.title.clone())
                .unwrap_or_else(|| summary.title.clone()),
            poster_path: details
                .and_then(|d| d.poster_path.clone())
                .or_else(|| summary.poster_path.clone()),
            release_date: details
                .and_then(|d| d.release_date.clone())
                .or_else(|| summary.release_date.clone()),
            overview: details
                .map(|d| d.overview.as_str())
                .unwrap_or(summary.overview.as_str())
                .trim()
                .to_string(),
            runtime: details.and_then(|d| d.runtime),
        })
    }

    /// The summary to store when the user favorites from this view.
    pub fn favorite_summary(&self) -> Option<MovieSummary> {
        self.view().map(|v| MovieSummary {
            id: v.id,
            title: v.title,
            overview: v.overview,
            release_date: v.release_date,
            poster_path: v.poster_path,
        })
    }
}
