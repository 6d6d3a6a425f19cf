//! Client-side session: search, details and favorites wired to a
//! [`MovieSource`].
//!
//! The state machines in [`search`] and [`details`] are synchronous; the
//! [`Session`] spawns the requests they ask for and feeds results back in
//! through a channel, one at a time.

pub mod attempt;
pub mod debounce;
pub mod details;
pub mod search;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use marquee_api::{ApiError, MovieSource};
use marquee_core::favorites::FavoritesStore;
use marquee_core::models::{MovieDetails, MovieSummary};
use marquee_core::storage::KvStore;

pub use debounce::{debounce, Debouncer, DEBOUNCE_DELAY};
pub use details::{DetailFetcher, DetailRequest, DetailView};
pub use search::{SearchNotice, SearchOrchestrator, SearchRequest, MIN_QUERY_LEN};

/// A finished request coming back from a spawned task.
#[derive(Debug)]
pub enum Event {
    SearchFinished {
        generation: u64,
        result: Result<Vec<MovieSummary>, ApiError>,
    },
    DetailsFinished {
        generation: u64,
        result: Result<MovieDetails, ApiError>,
    },
}

/// Which part of the session an applied event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Changed {
    Search,
    Details,
    /// The result was stale and dropped.
    Nothing,
}

pub struct Session<S: MovieSource, K: KvStore> {
    source: Arc<S>,
    search: SearchOrchestrator,
    details: DetailFetcher,
    favorites: FavoritesStore<K>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl<S: MovieSource, K: KvStore> Session<S, K> {
    pub fn new(source: S, favorites: FavoritesStore<K>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            source: Arc::new(source),
            search: SearchOrchestrator::new(),
            details: DetailFetcher::new(),
            favorites,
            events_tx,
            events_rx,
        }
    }

    pub fn search(&self) -> &SearchOrchestrator {
        &self.search
    }

    pub fn details(&self) -> &DetailFetcher {
        &self.details
    }

    pub fn favorites(&self) -> &FavoritesStore<K> {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore<K> {
        &mut self.favorites
    }

    /// Feed a debounced query into the search state.
    pub fn set_query(&mut self, query: &str) {
        if let Some(request) = self.search.set_query(query) {
            self.spawn_search(request);
        }
    }

    /// Open the details view for a movie.
    pub fn open_details(&mut self, movie: MovieSummary) {
        if let Some(request) = self.details.select(Some(movie)) {
            self.spawn_details(request);
        }
    }

    pub fn close_details(&mut self) {
        self.details.close();
    }

    /// Favorite or unfavorite the movie in the details view.
    ///
    /// Returns the new favorite state, or `None` when no view is open.
    pub fn toggle_favorite_from_details(&mut self) -> Option<bool> {
        let summary = self.details.favorite_summary()?;
        if self.favorites.is_favorite(summary.id) {
            self.favorites.remove_favorite(summary.id);
            Some(false)
        } else {
            self.favorites.add_favorite(&summary);
            Some(true)
        }
    }

    /// Whether any request is still outstanding.
    pub fn busy(&self) -> bool {
        self.search.loading() || self.details.loading()
    }

    /// Wait for the next finished request and apply it.
    pub async fn next_event(&mut self) -> Changed {
        match self.events_rx.recv().await {
            Some(event) => self.apply(event),
            // Unreachable while `self` holds a sender.
            None => Changed::Nothing,
        }
    }

    /// Apply events until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.busy() {
            self.next_event().await;
        }
    }

    pub fn apply(&mut self, event: Event) -> Changed {
        match event {
            Event::SearchFinished { generation, result } => {
                if self.search.apply(generation, result) {
                    Changed::Search
                } else {
                    Changed::Nothing
                }
            }
            Event::DetailsFinished { generation, result } => {
                if self.details.apply(generation, result) {
                    Changed::Details
                } else {
                    Changed::Nothing
                }
            }
        }
    }

    fn spawn_search(&self, request: SearchRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let SearchRequest { attempt, query } = request;
            tokio::select! {
                () = attempt.cancel.cancelled() => {
                    debug!(generation = attempt.generation, query = %query, "Search cancelled");
                }
                result = source.search_movies(&query) => {
                    let _ = tx.send(Event::SearchFinished { generation: attempt.generation, result });
                }
            }
        });
    }

    fn spawn_details(&self, request: DetailRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let DetailRequest { attempt, id } = request;
            tokio::select! {
                () = attempt.cancel.cancelled() => {
                    debug!(generation = attempt.generation, id, "Details cancelled");
                }
                result = source.movie_details(id) => {
                    let _ = tx.send(Event::DetailsFinished { generation: attempt.generation, result });
                }
            }
        });
    }
}
