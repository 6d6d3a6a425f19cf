use std::sync::Arc;

use crate::upstream::Upstream;

/// Shared handler state.
pub struct AppState<U> {
    pub upstream: Arc<U>,
}

impl<U: Upstream> AppState<U> {
    pub fn new(upstream: U) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}

// Derived `Clone` would require `U: Clone`.
impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            upstream: Arc::clone(&self.upstream),
        }
    }
}
