//! Background conversation logging.
//!
//! Chat replies are streamed to the browser before they are stored, so the
//! insert happens on a dedicated task fed by a bounded queue.

use std::sync::Arc;

use database::{conversation, Database, NewConversation};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

enum Command {
    Save(NewConversation),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Handle to the conversation writer task.
///
/// Clones share the same queue and task.
#[derive(Debug, Clone)]
pub struct ConversationWriter {
    tx: mpsc::Sender<Command>,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Save(row) => f.debug_tuple("Save").field(&row.user_id).finish(),
            Command::Flush(_) => f.write_str("Flush"),
            Command::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl ConversationWriter {
    /// Spawn the writer task with a queue of `capacity` rows.
    pub fn start(database: Database, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run(database, rx));
        info!(capacity, "Conversation writer started");

        Self {
            tx,
            handle: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Queue a row without waiting. Returns false when it was dropped.
    pub fn try_enqueue(&self, row: NewConversation) -> bool {
        let user_id = row.user_id;
        match self.tx.try_send(Command::Save(row)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(user_id, "Conversation queue full, dropping exchange");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(user_id, "Conversation writer stopped, dropping exchange");
                false
            }
        }
    }

    /// Wait until every row queued before this call has been written.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Write whatever is queued, then stop the task and wait for it.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        let Some(handle) = self.handle.lock().await.take() else {
            return;
        };

        let _ = self.tx.send(Command::Shutdown).await;
        if let Err(e) = handle.await {
            error!(error = %e, "Conversation writer task failed");
        }
        info!("Conversation writer stopped");
    }
}

async fn run(database: Database, mut rx: mpsc::Receiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Save(row) => save(&database, row).await,
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => {
                // New rows are refused from here on; rows already queued
                // behind the shutdown request are still written.
                rx.close();
                while let Some(command) = rx.recv().await {
                    match command {
                        Command::Save(row) => save(&database, row).await,
                        Command::Flush(ack) => {
                            let _ = ack.send(());
                        }
                        Command::Shutdown => {}
                    }
                }
                break;
            }
        }
    }
}

async fn save(database: &Database, row: NewConversation) {
    match conversation::insert_conversation(database.pool(), &row).await {
        Ok(saved) => debug!(
            id = saved.id,
            user_id = saved.user_id,
            follow_up = ?saved.follow_up_date,
            "Conversation saved"
        ),
        Err(e) => error!(user_id = row.user_id, error = %e, "Failed to save conversation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, test_user};

    fn row(user_id: i64, message: &str) -> NewConversation {
        NewConversation {
            user_id,
            message: message.to_string(),
            response: format!("re: {message}"),
            follow_up_date: None,
        }
    }

    #[tokio::test]
    async fn test_rows_are_written_in_order() {
        let db = test_db().await;
        let user = test_user(&db, "alice").await;
        let writer = ConversationWriter::start(db.clone(), 8);

        assert!(writer.try_enqueue(row(user.id, "first")));
        assert!(writer.try_enqueue(row(user.id, "second")));
        writer.flush().await;

        let saved = conversation::recent_for_user(db.pool(), user.id, 10)
            .await
            .unwrap();
        let messages: Vec<_> = saved.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);

        writer.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_and_rejects_later_rows() {
        let db = test_db().await;
        let user = test_user(&db, "alice").await;
        let writer = ConversationWriter::start(db.clone(), 8);

        assert!(writer.try_enqueue(row(user.id, "queued")));
        writer.shutdown().await;
        writer.shutdown().await;

        let saved = conversation::list_for_user(db.pool(), user.id).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert!(!writer.try_enqueue(row(user.id, "late")));
    }

    #[tokio::test]
    async fn test_rows_racing_shutdown_are_written() {
        let db = test_db().await;
        let user = test_user(&db, "alice").await;
        let writer = ConversationWriter::start(db.clone(), 8);

        // Queued behind a shutdown request the task has not seen yet.
        assert!(writer.try_enqueue(row(user.id, "before")));
        writer.tx.try_send(Command::Shutdown).unwrap();
        assert!(writer.try_enqueue(row(user.id, "behind shutdown")));

        writer.shutdown().await;

        let saved = conversation::recent_for_user(db.pool(), user.id, 10)
            .await
            .unwrap();
        let messages: Vec<_> = saved.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["before", "behind shutdown"]);

        // The queue is closed now, so later rows are refused up front.
        assert!(!writer.try_enqueue(row(user.id, "late")));
    }

    #[tokio::test]
    async fn test_full_queue_drops() {
        let db = test_db().await;
        let user = test_user(&db, "alice").await;
        let writer = ConversationWriter::start(db.clone(), 1);

        // The task cannot run between these calls on a current-thread runtime.
        let accepted = (0..5)
            .filter(|n| writer.try_enqueue(row(user.id, &format!("m{n}"))))
            .count();
        assert!(accepted < 5);

        writer.shutdown().await;
        let saved = conversation::list_for_user(db.pool(), user.id).await.unwrap();
        assert_eq!(saved.len(), accepted);
    }

    #[tokio::test]
    async fn test_failed_insert_is_logged_not_fatal() {
        let db = test_db().await;
        let user = test_user(&db, "alice").await;
        let writer = ConversationWriter::start(db.clone(), 8);

        // Unknown user violates the foreign key.
        assert!(writer.try_enqueue(row(9_999, "orphan")));
        assert!(writer.try_enqueue(row(user.id, "kept")));
        writer.flush().await;

        let saved = conversation::list_for_user(db.pool(), user.id).await.unwrap();
        assert_eq!(saved.len(), 1);
        writer.shutdown().await;
    }
}
