//! Ordered set of outstanding reply expectations.
//!
//! A waiter is satisfied by the first notification whose uppercase hex form
//! starts with the waiter's prefix. When several waiters share a prefix the
//! earliest registered one wins; replies carry no transaction id, so callers
//! that need exact pairing must keep one request per tag in flight.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{PeerError, Result};

/// Deadline used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

struct Waiter {
    prefix: String,
    timeout: Duration,
    deadline: Instant,
    reply: oneshot::Sender<Result<String>>,
}

/// Resolves with the hex string of the matching notification.
///
/// Fails with [`PeerError::Timeout`] or [`PeerError::Disconnected`].
/// Dropping it abandons the waiter; it is pruned before the next match.
#[derive(Debug)]
pub struct ReplyFuture {
    rx: oneshot::Receiver<Result<String>>,
}

impl ReplyFuture {
    /// Take the outcome if the waiter has already been settled.
    pub fn try_take(&mut self) -> Option<Result<String>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(dropped())),
        }
    }
}

impl Future for ReplyFuture {
    type Output = Result<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(dropped())))
    }
}

fn deadline_after(now: Instant, timeout: Duration) -> Instant {
    now.checked_add(timeout).unwrap_or(now + FAR_FUTURE)
}

fn dropped() -> PeerError {
    PeerError::Disconnected("reply registry dropped".to_string())
}

/// Pending waiters in registration order.
#[derive(Default)]
pub struct PendingReplies {
    waiters: Vec<Waiter>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waiter whose deadline starts now.
    pub fn register(&mut self, prefix: &str, timeout: Duration) -> ReplyFuture {
        self.register_at(prefix, timeout, Instant::now())
    }

    /// Register a waiter whose deadline is measured from `now`.
    pub fn register_at(&mut self, prefix: &str, timeout: Duration, now: Instant) -> ReplyFuture {
        let (tx, rx) = oneshot::channel();
        let prefix = prefix.to_ascii_uppercase();
        debug!(%prefix, ?timeout, pending = self.waiters.len() + 1, "waiter registered");
        self.waiters.push(Waiter {
            prefix,
            timeout,
            deadline: deadline_after(now, timeout),
            reply: tx,
        });
        ReplyFuture { rx }
    }

    /// Resolve the earliest waiter whose prefix matches `notification_hex`.
    ///
    /// `notification_hex` must be uppercase. Returns true if a waiter matched.
    pub fn resolve(&mut self, notification_hex: &str) -> bool {
        self.prune_abandoned();

        let Some(index) = self
            .waiters
            .iter()
            .position(|waiter| notification_hex.starts_with(&waiter.prefix))
        else {
            return false;
        };

        let waiter = self.waiters.remove(index);
        debug!(prefix = %waiter.prefix, "waiter resolved");
        let _ = waiter.reply.send(Ok(notification_hex.to_string()));
        true
    }

    /// Reject every waiter whose deadline is at or before `now`.
    ///
    /// Returns the number of waiters rejected.
    pub fn expire(&mut self, now: Instant) -> usize {
        let mut expired = 0usize;
        let mut kept = Vec::with_capacity(self.waiters.len());
        for waiter in self.waiters.drain(..) {
            if waiter.deadline <= now {
                warn!(prefix = %waiter.prefix, timeout = ?waiter.timeout, "waiter timed out");
                let _ = waiter.reply.send(Err(PeerError::Timeout(waiter.timeout)));
                expired += 1;
            } else {
                kept.push(waiter);
            }
        }
        self.waiters = kept;
        expired
    }

    /// Reject every waiter as disconnected and empty the set.
    ///
    /// Returns the number of waiters rejected.
    pub fn reject_all(&mut self, reason: &str) -> usize {
        let count = self.waiters.len();
        for waiter in self.waiters.drain(..) {
            let _ = waiter
                .reply
                .send(Err(PeerError::Disconnected(reason.to_string())));
        }
        if count > 0 {
            debug!(count, reason, "rejected pending waiters");
        }
        count
    }

    /// Drop waiters whose [`ReplyFuture`] is gone.
    pub fn prune_abandoned(&mut self) {
        self.waiters.retain(|waiter| !waiter.reply.is_closed());
    }

    /// Earliest deadline among pending waiters.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.waiters.iter().map(|waiter| waiter.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}

impl std::fmt::Debug for PendingReplies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefixes: Vec<&str> = self.waiters.iter().map(|w| w.prefix.as_str()).collect();
        f.debug_struct("PendingReplies")
            .field("prefixes", &prefixes)
            .finish()
    }
}
