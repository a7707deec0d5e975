//! Web front end for the Concierge hotel assistant.
//!
//! Serves server-rendered pages, JSON account and reservation endpoints,
//! and a server-sent events chat stream backed by [`concierge::Concierge`].

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod session;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use error::WebError;
pub use session::{Session, SessionStore, SESSION_COOKIE};
pub use state::AppState;

/// Build the application with request tracing and permissive CORS.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
