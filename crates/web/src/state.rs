//! Application state shared across handlers.

use std::sync::Arc;

use concierge::Concierge;
use database::Database;

use crate::session::SessionStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Chat pipeline.
    pub concierge: Arc<Concierge>,
    /// Logged-in sessions.
    pub sessions: SessionStore,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
}

impl AppState {
    /// Create new application state with an empty session store.
    pub fn new(db: Database, concierge: Arc<Concierge>, cookie_secure: bool) -> Self {
        Self {
            db,
            concierge,
            sessions: SessionStore::new(),
            cookie_secure,
        }
    }

    /// Replace the session store, e.g. to change the session lifetime.
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }
}
