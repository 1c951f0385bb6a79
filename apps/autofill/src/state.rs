use std::sync::Arc;

use crate::autofill::ProfileStore;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable profile backend, chosen at startup from `Config`.
    pub profile_store: Arc<dyn ProfileStore>,
}
