//! Supersession bookkeeping for in-flight requests.
//!
//! Each request is started as an [`Attempt`] with a fresh generation number
//! and its own cancellation token. Starting another attempt (or abandoning
//! the current one) cancels the previous token and makes its generation
//! stale, so a late result can be recognized and dropped before it touches
//! visible state.

use tokio_util::sync::CancellationToken;

/// One request attempt handed to the task that performs it.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub generation: u64,
    pub cancel: CancellationToken,
}

/// Tracks the single live attempt for one purpose.
#[derive(Debug, Default)]
pub struct AttemptTracker {
    generation: u64,
    live: Option<CancellationToken>,
}

impl AttemptTracker {
    /// Start a new attempt, cancelling whatever was in flight.
    pub fn begin(&mut self) -> Attempt {
        self.abandon();
        let cancel = CancellationToken::new();
        self.live = Some(cancel.clone());
        Attempt {
            generation: self.generation,
            cancel,
        }
    }

    /// Cancel the in-flight attempt, if any, without starting another.
    pub fn abandon(&mut self) {
        if let Some(token) = self.live.take() {
            token.cancel();
        }
        self.generation += 1;
    }

    /// Whether `generation` belongs to the attempt still in flight.
    pub fn is_current(&self, generation: u64) -> bool {
        self.live.is_some() && generation == self.generation
    }

    /// Mark the attempt finished. Returns `false` for stale generations,
    /// whose results must be discarded.
    pub fn finish(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.live = None;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> bool {
        self.live.is_some()
    }
}
