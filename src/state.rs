//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::config::AuthConfig;
use crate::dispatch::Dispatcher;
use crate::store::Store;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: AuthConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(store, auth),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
