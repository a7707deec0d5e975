//! Periodic follow-up delivery.
//!
//! Booked conversations carry a follow-up date. On every tick the scheduler
//! picks up the due ones, clears the date so it is never sent twice, records
//! a follow-up row and hands the message to a [`FollowUpNotifier`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use database::{conversation, follow_up, user, Conversation, Database};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::notifier::FollowUpNotifier;

/// Default time between scans.
pub const DEFAULT_FOLLOW_UP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Check-in text sent to a guest.
pub fn follow_up_message(username: &str) -> String {
    format!(
        "Hi {username}! Your stay with us is coming up soon. \
         Is there anything we can help you prepare before you arrive?"
    )
}

/// Outcome of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowUpRun {
    pub sent: usize,
    pub failed: usize,
}

/// Sends follow-ups for conversations whose follow-up date has arrived.
#[derive(Clone)]
pub struct FollowUpScheduler {
    database: Database,
    notifier: Arc<dyn FollowUpNotifier>,
}

impl FollowUpScheduler {
    pub fn new(database: Database, notifier: Arc<dyn FollowUpNotifier>) -> Self {
        Self { database, notifier }
    }

    /// Handle every conversation due at `now`.
    ///
    /// A failure on one conversation is logged and counted; the rest of the
    /// batch still goes out.
    pub async fn run_once(&self, now: NaiveDateTime) -> Result<FollowUpRun> {
        let pool = self.database.pool();
        let due = conversation::due_follow_ups(pool, now).await?;
        debug!(count = due.len(), "Due follow-ups");

        let mut run = FollowUpRun::default();
        for conversation in due {
            // Claimed before delivery: a conversation whose date cannot be
            // cleared is left for the next scan and not sent now.
            if let Err(e) = conversation::clear_follow_up_date(pool, conversation.id).await {
                error!(
                    conversation_id = conversation.id,
                    error = %e,
                    "Failed to clear follow-up date, skipping"
                );
                run.failed += 1;
                continue;
            }

            match self.deliver(&conversation, now).await {
                Ok(true) => run.sent += 1,
                Ok(false) => run.failed += 1,
                Err(e) => {
                    error!(conversation_id = conversation.id, error = %e, "Follow-up failed");
                    run.failed += 1;
                }
            }
        }

        if run.sent + run.failed > 0 {
            info!(sent = run.sent, failed = run.failed, "Follow-up run complete");
        }
        Ok(run)
    }

    /// Returns whether the notifier accepted the message.
    async fn deliver(&self, conversation: &Conversation, now: NaiveDateTime) -> Result<bool> {
        let pool = self.database.pool();
        let guest = user::get_user(pool, conversation.user_id).await?;
        let message = follow_up_message(&guest.username);
        let record = follow_up::schedule_follow_up(pool, guest.id, &message, now).await?;

        match self.notifier.notify(&guest, &message).await {
            Ok(()) => {
                follow_up::mark_sent(pool, record.id, Utc::now().naive_utc()).await?;
                Ok(true)
            }
            Err(e) => {
                warn!(user_id = guest.id, error = %e, "Notifier rejected follow-up");
                follow_up::mark_failed(pool, record.id).await?;
                Ok(false)
            }
        }
    }

    /// Scan every `interval` on a background task until stopped.
    ///
    /// The first scan runs immediately.
    pub fn start(self, interval: Duration) -> FollowUpHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once(Utc::now().naive_utc()).await {
                            error!(error = %e, "Follow-up scan failed");
                        }
                    }
                }
            }
        });

        info!(interval_secs = interval.as_secs(), "Follow-up scheduler started");
        FollowUpHandle {
            stop: stop_tx,
            handle,
        }
    }
}

/// A running [`FollowUpScheduler`].
pub struct FollowUpHandle {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl FollowUpHandle {
    /// Stop the scheduler and wait for an in-flight scan to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            error!(error = %e, "Follow-up scheduler task failed");
        }
        info!("Follow-up scheduler stopped");
    }
}
