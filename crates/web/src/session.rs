//! In-process login sessions.
//!
//! A session is a random token stored in an HTTP-only cookie and mapped to
//! the logged-in user. Sessions live in memory only, so a restart logs
//! everyone out. Each session expires a fixed time after login; expired
//! entries are dropped when looked up and whenever a new session starts.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "concierge_session";

/// Default lifetime of a session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// The logged-in user behind a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug)]
struct Entry {
    session: Session,
    expires_at: Instant,
}

/// Token to session map shared by every handler.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose sessions last `ttl` from login.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Start a session and return its token.
    pub async fn create(&self, user_id: i64, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "Dropped expired sessions");
        }

        sessions.insert(
            token.clone(),
            Entry {
                session: Session {
                    user_id,
                    username: username.to_string(),
                },
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// The live session for `token`. An expired one is removed.
    pub async fn get(&self, token: &str) -> Option<Session> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(entry) if entry.expires_at > now => return Some(entry.session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions
            .write()
            .await
            .retain(|_, entry| entry.expires_at > now);
        None
    }

    /// End a session. Returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drop every session.
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Cookie carrying a fresh session token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// The current session, if the request carries a valid cookie.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl MaybeSession {
    /// The session, or a 403 carrying `message`.
    pub fn require(self, message: &str) -> Result<Session, WebError> {
        self.0.ok_or_else(|| WebError::Forbidden(message.to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let session = match jar.get(SESSION_COOKIE) {
            Some(cookie) => state.sessions.get(cookie.value()).await,
            None => None,
        };
        Ok(Self(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new();
        let token = store.create(7, "alice").await;

        assert_eq!(token.len(), 32);
        assert_eq!(
            store.get(&token).await,
            Some(Session {
                user_id: 7,
                username: "alice".to_string()
            })
        );
        assert!(store.get("unknown").await.is_none());

        let other = store.create(8, "bob").await;
        assert_ne!(token, other);
        assert_eq!(store.len().await, 2);

        assert!(store.remove(&token).await);
        assert!(!store.remove(&token).await);

        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_dropped() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        let token = store.create(7, "alice").await;
        assert_eq!(store.len().await, 1);

        assert!(store.get(&token).await.is_none());
        assert!(store.is_empty().await);

        // Starting a session also sweeps out stale ones.
        store.create(7, "alice").await;
        store.create(8, "bob").await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_live_session_survives_sweep() {
        let store = SessionStore::with_ttl(Duration::from_secs(3600));
        let alice = store.create(7, "alice").await;
        store.create(8, "bob").await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(&alice).await.map(|s| s.user_id), Some(7));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_require() {
        assert!(matches!(
            MaybeSession(None).require("You must be logged in"),
            Err(WebError::Forbidden(_))
        ));
    }
}
