//! Follow-up delivery trait and implementations.

use async_trait::async_trait;
use database::User;
use tracing::info;

use crate::error::ConciergeError;

/// Delivers follow-up messages to guests.
///
/// Abstracted so email, SMS or test transports can be plugged in.
#[async_trait]
pub trait FollowUpNotifier: Send + Sync {
    /// Deliver `message` to `user`.
    async fn notify(&self, user: &User, message: &str) -> Result<(), ConciergeError>;
}

/// A notifier that writes each follow-up to the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl FollowUpNotifier for LoggingNotifier {
    async fn notify(&self, user: &User, message: &str) -> Result<(), ConciergeError> {
        info!(
            user_id = user.id,
            email = %user.email,
            "Sending follow-up: {}",
            message
        );
        Ok(())
    }
}
