//! Registration, login and session routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use database::validation::validate_password;
use database::{user, DatabaseError, NewUser};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{Result, WebError};
use crate::session::{session_cookie, MaybeSession, SESSION_COOKIE};
use crate::state::AppState;

/// Registration form.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Create an account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    validate_password(&req.password).map_err(DatabaseError::from)?;

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| WebError::Internal(format!("hashing task failed: {e}")))?
    .map_err(|e| WebError::Internal(format!("password hashing failed: {e}")))?;

    let new_user = NewUser {
        username: req.username,
        email: req.email,
        password_hash,
    };

    match user::create_user(state.db.pool(), &new_user).await {
        Ok(created) => {
            info!(user_id = created.id, username = %created.username, "User registered");
            Ok(Json(json!({"message": "User registered successfully!"})))
        }
        Err(DatabaseError::AlreadyExists { .. }) => Err(WebError::BadRequest(
            "Username already exists. Please choose another one.".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>)> {
    let invalid = || WebError::Unauthorized("Invalid credentials".to_string());

    let guest = match user::get_user_by_username(state.db.pool(), req.username.trim()).await {
        Ok(guest) => guest,
        Err(DatabaseError::NotFound { .. }) => return Err(invalid()),
        Err(e) => return Err(e.into()),
    };

    let password = req.password;
    let hash = guest.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(|e| WebError::Internal(format!("verification task failed: {e}")))?;

    if !verified {
        warn!(username = %guest.username, "Failed login");
        return Err(invalid());
    }

    let token = state.sessions.create(guest.id, &guest.username).await;
    info!(user_id = guest.id, "User logged in");

    Ok((
        jar.add(session_cookie(token, state.cookie_secure)),
        Json(json!({"message": "Login successful!"})),
    ))
}

/// End the session and go home.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value()).await;
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/"),
    )
}

/// Report whether the caller is logged in.
pub async fn check_session(MaybeSession(session): MaybeSession) -> impl IntoResponse {
    match session {
        Some(session) => (
            StatusCode::OK,
            Json(json!({"status": "logged_in", "user_id": session.user_id})),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "not_logged_in"})),
        ),
    }
}
