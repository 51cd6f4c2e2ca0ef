//! Application state management

use std::sync::Arc;

use crate::config::Config;

/// Shared application state
///
/// The configuration is loaded once at startup and passed explicitly through
/// this handle; nothing reads ambient global state per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
