//! Search state: debounced query in, results / loading / error out.

use tracing::{debug, warn};

use marquee_api::ApiError;
use marquee_core::models::MovieSummary;

use crate::attempt::{Attempt, AttemptTracker};

/// Queries shorter than this (after trimming) never reach the network.
pub const MIN_QUERY_LEN: usize = 2;

pub const SEARCH_FAILED: &str = "Search failed. Please try again.";
pub const SEARCH_NETWORK_ERROR: &str = "Network error. Please try again.";

/// A search the driver should perform.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub attempt: Attempt,
    pub query: String,
}

/// Hint shown above the results list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchNotice {
    /// Nothing typed yet.
    Prompt,
    /// Typed, but below [`MIN_QUERY_LEN`].
    TooShort,
    /// A finished search came back empty.
    NoResults,
}

impl SearchNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::Prompt => "Start typing a movie title to search.",
            Self::TooShort => "Type at least 2 characters to search.",
            Self::NoResults => "No results.",
        }
    }
}

/// Search screen state.
#[derive(Debug, Default)]
pub struct SearchOrchestrator {
    /// Last debounced input, trimmed.
    typed: String,
    /// The query actually searched for; empty when idle.
    active: String,
    results: Vec<MovieSummary>,
    loading: bool,
    error: Option<String>,
    has_searched: bool,
    attempts: AttemptTracker,
}

/// The query a trimmed input maps to, or `""` when it is too short.
fn effective_query(trimmed: &str) -> &str {
    if trimmed.chars().count() < MIN_QUERY_LEN {
        ""
    } else {
        trimmed
    }
}

impl SearchOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a debounced query. Returns the request to run, if any.
    ///
    /// An input that maps to the query already active is ignored. Anything
    /// else abandons the in-flight request before deciding what to do.
    pub fn set_query(&mut self, query: &str) -> Option<SearchRequest> {
        let trimmed = query.trim();
        self.typed = trimmed.to_string();

        let effective = effective_query(trimmed);
        if effective == self.active {
            return None;
        }
        self.active = effective.to_string();
        self.attempts.abandon();

        if effective.is_empty() {
            self.results.clear();
            self.loading = false;
            self.error = None;
            self.has_searched = false;
            return None;
        }

        self.loading = true;
        self.has_searched = true;
        self.error = None;
        debug!(query = %effective, "Search started");

        Some(SearchRequest {
            attempt: self.attempts.begin(),
            query: effective.to_string(),
        })
    }

    /// Apply the outcome of a search. Returns `false` when the result
    /// belongs to a superseded attempt and was dropped.
    pub fn apply(&mut self, generation: u64, result: Result<Vec<MovieSummary>, ApiError>) -> bool {
        if !self.attempts.finish(generation) {
            debug!(generation, "Dropping stale search result");
            return false;
        }

        self.loading = false;
        match result {
            Ok(results) => {
                debug!(query = %self.active, count = results.len(), "Search finished");
                self.results = results;
            }
            Err(e) => {
                warn!(query = %self.active, "Search failed: {e}");
                self.results.clear();
                self.error = Some(e.user_message(SEARCH_FAILED, SEARCH_NETWORK_ERROR));
            }
        }
        true
    }

    pub fn query(&self) -> &str {
        &self.active
    }

    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn notice(&self) -> Option<SearchNotice> {
        if self.typed.is_empty() {
            Some(SearchNotice::Prompt)
        } else if self.typed.chars().count() < MIN_QUERY_LEN {
            Some(SearchNotice::TooShort)
        } else if self.has_searched && !self.loading && self.error.is_none() && self.results.is_empty()
        {
            Some(SearchNotice::NoResults)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> MovieSummary {
        MovieSummary {
            id: 27205,
            title: "Inception".into(),
            overview: "...".into(),
            release_date: Some("2010-07-16".into()),
            poster_path: Some("/poster.jpg".into()),
        }
    }

    fn interstellar() -> MovieSummary {
        MovieSummary {
            id: 157336,
            title: "Interstellar".into(),
            overview: String::new(),
            release_date: Some("2014-11-05".into()),
            poster_path: None,
        }
    }

    #[test]
    fn test_short_query_never_requests() {
        let mut search = SearchOrchestrator::new();
        assert!(search.set_query("a").is_none());
        assert!(!search.has_searched());
        assert!(search.results().is_empty());
        assert!(!search.loading());
        assert_eq!(search.notice(), Some(SearchNotice::TooShort));

        assert!(search.set_query("   ").is_none());
        assert_eq!(search.notice(), Some(SearchNotice::Prompt));
    }

    #[test]
    fn test_successful_search() {
        let mut search = SearchOrchestrator::new();
        let req = search.set_query("  Incep ").unwrap();
        assert_eq!(req.query, "Incep");
        assert!(search.loading());
        assert!(search.has_searched());

        assert!(search.apply(req.attempt.generation, Ok(vec![inception()])));
        assert!(!search.loading());
        assert_eq!(search.error(), None);
        assert_eq!(search.results(), &[inception()]);
        assert_eq!(search.notice(), None);
    }

    #[test]
    fn test_upstream_error_message_surfaces() {
        let mut search = SearchOrchestrator::new();
        let req = search.set_query("Incep").unwrap();
        search.apply(
            req.attempt.generation,
            Err(ApiError::Api {
                status: 502,
                message: "Invalid API key".into(),
            }),
        );

        assert_eq!(search.error(), Some("Invalid API key"));
        assert!(search.results().is_empty());
        assert!(!search.loading());
    }

    #[test]
    fn test_error_without_message_uses_fallback() {
        let mut search = SearchOrchestrator::new();
        let req = search.set_query("Incep").unwrap();
        search.apply(
            req.attempt.generation,
            Err(ApiError::Api {
                status: 500,
                message: String::new(),
            }),
        );
        assert_eq!(search.error(), Some(SEARCH_FAILED));
    }

    #[test]
    fn test_stale_response_does_not_overwrite_newer_query() {
        let mut search = SearchOrchestrator::new();
        let incep = search.set_query("Incep").unwrap();
        let inter = search.set_query("Interstellar").unwrap();
        assert!(incep.attempt.cancel.is_cancelled());

        assert!(!search.apply(incep.attempt.generation, Ok(vec![inception()])));
        assert!(search.loading());
        assert_eq!(search.query(), "Interstellar");
        assert!(search.results().is_empty());

        assert!(search.apply(inter.attempt.generation, Ok(vec![interstellar()])));
        assert_eq!(search.results(), &[interstellar()]);
    }

    #[test]
    fn test_clearing_query_abandons_request() {
        let mut search = SearchOrchestrator::new();
        let req = search.set_query("Incep").unwrap();
        assert!(search.set_query("").is_none());

        assert!(req.attempt.cancel.is_cancelled());
        assert!(!search.apply(req.attempt.generation, Ok(vec![inception()])));
        assert!(!search.has_searched());
        assert!(!search.loading());
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_same_effective_query_is_ignored() {
        let mut search = SearchOrchestrator::new();
        let req = search.set_query("Heat").unwrap();
        assert!(search.set_query("Heat  ").is_none());
        assert!(!req.attempt.cancel.is_cancelled());
    }

    #[test]
    fn test_empty_results_notice() {
        let mut search = SearchOrchestrator::new();
        let req = search.set_query("zzzzqx").unwrap();
        search.apply(req.attempt.generation, Ok(Vec::new()));
        assert_eq!(search.notice(), Some(SearchNotice::NoResults));
    }
}
