use tracing::debug;
use uuid::Uuid;

/// Capability interface for pushing policy announcements out to users
/// (email, in-app, push). The core calls it synchronously on policy changes.
pub trait NotificationSink: Send + Sync {
    fn policy_changed(&self, policy_id: Uuid, title: &str);
}

/// Null-object sink: acknowledges every notification and delivers nothing.
pub struct NoopNotifier;

impl NotificationSink for NoopNotifier {
    fn policy_changed(&self, policy_id: Uuid, title: &str) {
        debug!(%policy_id, title, "policy notification dropped (no sink configured)");
    }
}
