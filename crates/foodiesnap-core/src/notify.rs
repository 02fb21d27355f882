//! Broadcast channel for transient user-facing notifications.

use tokio::sync::broadcast;
use tracing::debug;

use crate::types::Notification;

const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self { Self::new(DEFAULT_CAPACITY) }
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> { self.tx.subscribe() }

    /// Emits to current subscribers. Having none is not an error.
    pub fn emit(&self, notification: Notification) {
        debug!(kind = ?notification.kind, message = %notification.message, "notification");
        let _ = self.tx.send(notification);
    }
}
