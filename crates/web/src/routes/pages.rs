//! Server-rendered pages.

use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use database::{conversation, user};

use crate::error::Result;
use crate::session::MaybeSession;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate;

/// Chat page with the opening greeting.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub greeting: String,
}

/// One row of the history page.
pub struct HistoryEntry {
    pub message: String,
    pub response: String,
    pub date: String,
}

#[derive(Template)]
#[template(path = "conversation_history.html")]
pub struct ConversationHistoryTemplate {
    pub username: String,
    pub entries: Vec<HistoryEntry>,
}

pub async fn index() -> IndexTemplate {
    IndexTemplate
}

pub async fn register() -> RegisterTemplate {
    RegisterTemplate
}

pub async fn login() -> LoginTemplate {
    LoginTemplate
}

/// Render the dashboard, or send anonymous visitors home.
pub async fn dashboard(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response> {
    let Some(session) = session else {
        return Ok(Redirect::to("/").into_response());
    };

    let guest = user::get_user(state.db.pool(), session.user_id).await?;
    let greeting = state.concierge.greeting(&guest).await?;

    Ok(DashboardTemplate {
        username: guest.username,
        greeting,
    }
    .into_response())
}

/// Every exchange for the current user, newest first.
pub async fn conversation_history(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response> {
    let Some(session) = session else {
        return Ok(Redirect::to("/login").into_response());
    };

    let entries = conversation::list_for_user(state.db.pool(), session.user_id)
        .await?
        .into_iter()
        .map(|c| HistoryEntry {
            message: c.message,
            response: c.response,
            date: c.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    Ok(ConversationHistoryTemplate {
        username: session.username,
        entries,
    }
    .into_response())
}
