//! Follow-up messages written by the follow-up timer.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{follow_up_status, FollowUp};

const FOLLOW_UP_COLUMNS: &str = "id, user_id, message, scheduled_at, sent_at, status";

/// Record a follow-up in the `scheduled` state.
pub async fn schedule_follow_up(
    pool: &SqlitePool,
    user_id: i64,
    message: &str,
    scheduled_at: NaiveDateTime,
) -> Result<FollowUp> {
    let record = sqlx::query_as::<_, FollowUp>(&format!(
        r#"
        INSERT INTO follow_ups (user_id, message, scheduled_at, status)
        VALUES (?, ?, ?, ?)
        RETURNING {FOLLOW_UP_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(message)
    .bind(scheduled_at)
    .bind(follow_up_status::SCHEDULED)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Mark a follow-up as delivered.
pub async fn mark_sent(pool: &SqlitePool, id: i64, sent_at: NaiveDateTime) -> Result<()> {
    update_status(pool, id, follow_up_status::SENT, Some(sent_at)).await
}

/// Mark a follow-up as undeliverable.
pub async fn mark_failed(pool: &SqlitePool, id: i64) -> Result<()> {
    update_status(pool, id, follow_up_status::FAILED, None).await
}

async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: &str,
    sent_at: Option<NaiveDateTime>,
) -> Result<()> {
    let result = sqlx::query("UPDATE follow_ups SET status = ?, sent_at = ? WHERE id = ?")
        .bind(status)
        .bind(sent_at)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "FollowUp",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List a user's follow-ups, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<FollowUp>> {
    let records = sqlx::query_as::<_, FollowUp>(&format!(
        r#"
        SELECT {FOLLOW_UP_COLUMNS}
        FROM follow_ups
        WHERE user_id = ?
        ORDER BY scheduled_at DESC, id DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::test_support::test_db;
    use crate::user::create_user;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_follow_up_status_transitions() {
        let db = test_db().await;
        let user_id = create_user(
            db.pool(),
            &NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "$2b$12$hash".to_string(),
            },
        )
        .await
        .unwrap()
        .id;

        let when = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let first = schedule_follow_up(db.pool(), user_id, "See you soon", when)
            .await
            .unwrap();
        let second = schedule_follow_up(db.pool(), user_id, "Still there?", when)
            .await
            .unwrap();
        assert_eq!(first.status, follow_up_status::SCHEDULED);
        assert!(first.sent_at.is_none());

        mark_sent(db.pool(), first.id, when).await.unwrap();
        mark_failed(db.pool(), second.id).await.unwrap();

        let records = list_for_user(db.pool(), user_id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, follow_up_status::FAILED);
        assert_eq!(records[1].status, follow_up_status::SENT);
        assert_eq!(records[1].sent_at, Some(when));

        let missing = mark_failed(db.pool(), 999).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }
}
