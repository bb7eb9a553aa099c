use crate::config::Config;
use crate::sync::{SessionStore, SyncConfig};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Live editing sessions, keyed by id. Driven by the sync pump.
    pub sessions: SessionStore,
    /// Debounce windows handed to every new session.
    pub sync: SyncConfig,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sync = config.sync_config();
        Self {
            config,
            sessions: SessionStore::new(),
            sync,
        }
    }
}
