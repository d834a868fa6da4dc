//! Notification collaborator used by moderation flows.
use qa_ledger_shared::types::User;
use tracing::info;

/// Delivers notifications about account changes to the affected user.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send_ban_notification(&self, user: &User, reason: &str);
}

/// A `Notifier` that only records the notification in the log.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait::async_trait]
impl Notifier for TracingNotifier {
    async fn send_ban_notification(&self, user: &User, reason: &str) {
        info!(
            user_id = %user.id,
            email = %user.email,
            reason,
            "Ban notification issued"
        );
    }
}
