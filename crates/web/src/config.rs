//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use concierge::{DEFAULT_FOLLOW_UP_INTERVAL, DEFAULT_QUEUE_CAPACITY};

use crate::session::DEFAULT_SESSION_TTL;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Frequency dictionary to use instead of the bundled one.
    pub spelling_dictionary: Option<PathBuf>,
    /// Time between follow-up scans.
    pub follow_up_interval: Duration,
    /// Capacity of the conversation writer queue.
    pub conversation_queue_capacity: usize,
    /// Mark the session cookie `Secure`.
    pub session_cookie_secure: bool,
    /// How long a login lasts.
    pub session_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CONCIERGE_ADDR` | Server bind address | `127.0.0.1:5000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:concierge.db?mode=rwc` |
    /// | `SPELLING_DICTIONARY` | Frequency dictionary path | (bundled) |
    /// | `FOLLOW_UP_INTERVAL_SECS` | Seconds between follow-up scans | `86400` |
    /// | `CONVERSATION_QUEUE_CAPACITY` | Pending conversation rows | `64` |
    /// | `SESSION_COOKIE_SECURE` | Secure session cookie | `false` |
    /// | `SESSION_TTL_SECS` | Session lifetime in seconds | `86400` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("CONCIERGE_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:concierge.db?mode=rwc".to_string());

        let spelling_dictionary = env::var("SPELLING_DICTIONARY")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let follow_up_interval = match env_number("FOLLOW_UP_INTERVAL_SECS")? {
            Some(0) => return Err(ConfigError::Zero("FOLLOW_UP_INTERVAL_SECS")),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_FOLLOW_UP_INTERVAL,
        };

        let conversation_queue_capacity = match env_number("CONVERSATION_QUEUE_CAPACITY")? {
            Some(0) => return Err(ConfigError::Zero("CONVERSATION_QUEUE_CAPACITY")),
            Some(capacity) => capacity as usize,
            None => DEFAULT_QUEUE_CAPACITY,
        };

        let session_cookie_secure = match env::var("SESSION_COOKIE_SECURE") {
            Ok(value) => parse_bool(&value)
                .ok_or(ConfigError::InvalidBool("SESSION_COOKIE_SECURE"))?,
            Err(_) => false,
        };

        let session_ttl = match env_number("SESSION_TTL_SECS")? {
            Some(0) => return Err(ConfigError::Zero("SESSION_TTL_SECS")),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_SESSION_TTL,
        };

        Ok(Self {
            addr,
            database_url,
            spelling_dictionary,
            follow_up_interval,
            conversation_queue_capacity,
            session_cookie_secure,
            session_ttl,
        })
    }
}

fn env_number(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CONCIERGE_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must be true or false")]
    InvalidBool(&'static str),
}
