use std::time::Duration;

use propwire_frame::{decode, hex, DeviceStatus, StatusUpdate};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::pending::{PendingReplies, ReplyFuture};

/// Per-connection correlation engine.
///
/// Every notification is decoded into the running [`DeviceStatus`] and then
/// offered to the pending waiters. Owned by exactly one task; nothing here
/// locks.
#[derive(Debug)]
pub struct Engine {
    pending: PendingReplies,
    status: watch::Sender<DeviceStatus>,
}

/// What a single notification did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Fields the decoder extracted.
    pub update: StatusUpdate,
    /// Whether a pending waiter was resolved.
    pub matched: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let (status, _) = watch::channel(DeviceStatus::default());
        Self {
            pending: PendingReplies::new(),
            status,
        }
    }

    /// Expect a notification starting with `prefix` within `timeout`.
    pub fn register(&mut self, prefix: &str, timeout: Duration) -> ReplyFuture {
        self.pending.register(prefix, timeout)
    }

    /// Decode a notification, publish any status change, and resolve the
    /// earliest matching waiter.
    pub fn on_notification(&mut self, bytes: &[u8]) -> Delivery {
        let notification_hex = hex::encode_upper(bytes);
        debug!(notification = %notification_hex, "notification received");

        let update = decode(bytes);
        if !update.is_empty() {
            self.status.send_if_modified(|status| status.apply(&update));
        }

        let matched = self.pending.resolve(&notification_hex);
        if !matched {
            debug!(notification = %notification_hex, "no waiter matched");
        }

        Delivery { update, matched }
    }

    /// Reject every pending waiter as disconnected.
    pub fn on_disconnect(&mut self, reason: &str) -> usize {
        let rejected = self.pending.reject_all(reason);
        info!(rejected, reason, "device link closed");
        rejected
    }

    /// Time out every waiter due at `now`.
    pub fn expire(&mut self, now: Instant) -> usize {
        self.pending.expire(now)
    }

    /// Drop waiters whose callers have gone away.
    pub fn prune_abandoned(&mut self) {
        self.pending.prune_abandoned();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.next_deadline()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Snapshot of the current device status.
    pub fn status(&self) -> DeviceStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to device status changes.
    pub fn subscribe(&self) -> watch::Receiver<DeviceStatus> {
        self.status.subscribe()
    }
}
