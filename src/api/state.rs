//! Application state for the API server

use crate::TuneFetch;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The service instance behind every route
    pub service: Arc<TuneFetch>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<TuneFetch>) -> Self {
        Self { service }
    }
}
