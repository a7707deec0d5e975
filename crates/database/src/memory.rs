//! Per-user key/value memory.
//!
//! Each `(user_id, key)` pair holds at most one row; writing an existing key
//! replaces its value.

use sqlx::SqlitePool;

use crate::models::Memory;
use crate::Result;

/// Create or update a memory entry.
pub async fn upsert_memory(pool: &SqlitePool, user_id: i64, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO memories (user_id, key, value)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id, key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a single memory entry.
pub async fn get_memory(pool: &SqlitePool, user_id: i64, key: &str) -> Result<Option<Memory>> {
    let record = sqlx::query_as::<_, Memory>(
        r#"
        SELECT id, user_id, key, value, created_at, updated_at
        FROM memories
        WHERE user_id = ? AND key = ?
        "#,
    )
    .bind(user_id)
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// List every memory entry for a user, ordered by key.
pub async fn list_memories(pool: &SqlitePool, user_id: i64) -> Result<Vec<Memory>> {
    let records = sqlx::query_as::<_, Memory>(
        r#"
        SELECT id, user_id, key, value, created_at, updated_at
        FROM memories
        WHERE user_id = ?
        ORDER BY key
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Forget a memory entry. Returns whether a row was removed.
pub async fn delete_memory(pool: &SqlitePool, user_id: i64, key: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM memories
        WHERE user_id = ? AND key = ?
        "#,
    )
    .bind(user_id)
    .bind(key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
