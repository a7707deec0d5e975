//! Conversation log.
//!
//! Rows are append-only; the follow-up date is the only column updated after
//! insert.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Conversation, NewConversation};

const CONVERSATION_COLUMNS: &str =
    "id, user_id, message, response, created_at, updated_at, follow_up_date";

/// Append a chat exchange, returning the stored row.
pub async fn insert_conversation(
    pool: &SqlitePool,
    conversation: &NewConversation,
) -> Result<Conversation> {
    let record = sqlx::query_as::<_, Conversation>(&format!(
        r#"
        INSERT INTO conversations (user_id, message, response, follow_up_date)
        VALUES (?, ?, ?, ?)
        RETURNING {CONVERSATION_COLUMNS}
        "#
    ))
    .bind(conversation.user_id)
    .bind(&conversation.message)
    .bind(&conversation.response)
    .bind(conversation.follow_up_date)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Most recent exchange for a user.
pub async fn latest_for_user(pool: &SqlitePool, user_id: i64) -> Result<Option<Conversation>> {
    let record = sqlx::query_as::<_, Conversation>(&format!(
        r#"
        SELECT {CONVERSATION_COLUMNS}
        FROM conversations
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// The last `limit` exchanges for a user, oldest first.
pub async fn recent_for_user(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<Conversation>> {
    let mut records = sqlx::query_as::<_, Conversation>(&format!(
        r#"
        SELECT {CONVERSATION_COLUMNS}
        FROM conversations
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    records.reverse();
    Ok(records)
}

/// Every exchange for a user, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Conversation>> {
    let records = sqlx::query_as::<_, Conversation>(&format!(
        r#"
        SELECT {CONVERSATION_COLUMNS}
        FROM conversations
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Schedule a follow-up for an exchange.
pub async fn set_follow_up_date(pool: &SqlitePool, id: i64, when: NaiveDateTime) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE conversations
        SET follow_up_date = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(when)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Conversation",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Exchanges whose follow-up date has arrived.
pub async fn due_follow_ups(pool: &SqlitePool, now: NaiveDateTime) -> Result<Vec<Conversation>> {
    let records = sqlx::query_as::<_, Conversation>(&format!(
        r#"
        SELECT {CONVERSATION_COLUMNS}
        FROM conversations
        WHERE follow_up_date IS NOT NULL AND follow_up_date <= ?
        ORDER BY follow_up_date, id
        "#
    ))
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Clear the follow-up date once it has been handled.
pub async fn clear_follow_up_date(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE conversations
        SET follow_up_date = NULL, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
