//! SQLite persistence layer for the Concierge hotel assistant.
//!
//! This crate provides async database operations for guests, the room
//! catalog, reservations, the conversation log and per-user memory using SQLx
//! with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{models::NewUser, user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:concierge.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let guest = NewUser {
//!         username: "alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!         password_hash: "$2b$12$...".to_string(),
//!     };
//!     user::create_user(db.pool(), &guest).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod conversation;
pub mod error;
pub mod follow_up;
pub mod memory;
pub mod models;
pub mod reservation;
pub mod room;
pub mod user;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{
    Conversation, FollowUp, Memory, NewConversation, NewReservation, NewRoom, NewUser,
    Reservation, ReservationSummary, Room, User,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// `sqlite::memory:` gives every pooled connection its own database, so
    /// in-memory callers should use [`Database::connect_with_pool_size`] with
    /// a size of 1.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to database");

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
