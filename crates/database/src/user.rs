//! User operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, User};
use crate::validation::{validate_email, validate_username};

const USER_COLUMNS: &str = "id, username, email, password_hash, preferred_hotel_chain, \
                            loyalty_points, created_at, updated_at";

/// Create a new user, returning the stored row.
///
/// The username and email are validated first; a duplicate username or
/// email maps to [`DatabaseError::AlreadyExists`].
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<User> {
    validate_username(&user.username)?;
    validate_email(&user.email)?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user.username.trim())
    .bind(user.email.trim())
    .bind(&user.password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: user.username.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_user(pool, id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        })
}

/// Get a user by username.
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<User> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: username.to_string(),
    })
}

/// Set or clear the user's preferred hotel chain.
pub async fn set_preferred_chain(pool: &SqlitePool, id: i64, chain: Option<&str>) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET preferred_hotel_chain = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(chain)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Add loyalty points, returning the new balance.
pub async fn add_loyalty_points(pool: &SqlitePool, id: i64, points: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE users
        SET loyalty_points = loyalty_points + ?, updated_at = datetime('now')
        WHERE id = ?
        RETURNING loyalty_points
        "#,
    )
    .bind(points)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
