//! Route handlers for the Concierge web front end.

pub mod auth;
pub mod chat;
pub mod health;
pub mod pages;
pub mod reservations;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/conversation_history", get(pages::conversation_history))
        // Accounts
        .route("/register", get(pages::register).post(auth::register))
        .route("/login", get(pages::login).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/check_session", get(auth::check_session))
        // Chat
        .route("/chat", post(chat::chat))
        // Reservations
        .route("/check_availability", post(reservations::check_availability))
        .route("/book_room", post(reservations::book_room))
        .route("/view_reservations", get(reservations::view_reservations))
        .route(
            "/cancel_reservation/:id",
            post(reservations::cancel_reservation),
        )
        // Health check
        .route("/health", get(health::health))
}
