//! In-process device link.
//!
//! [`memory_link`] returns the host-side [`MemoryLink`], the inbound event
//! receiver the host consumes, and the device-side [`MemoryDevice`] used to
//! observe written frames and push notifications back.

use std::future::Future;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{DeviceLink, LinkEvent};

/// Host side of an in-memory link.
#[derive(Debug, Clone)]
pub struct MemoryLink {
    writes: mpsc::Sender<Bytes>,
}

/// Device side of an in-memory link.
#[derive(Debug)]
pub struct MemoryDevice {
    writes: mpsc::Receiver<Bytes>,
    events: mpsc::Sender<LinkEvent>,
}

/// Create a connected in-memory link with the given channel capacity.
pub fn memory_link(capacity: usize) -> (MemoryLink, mpsc::Receiver<LinkEvent>, MemoryDevice) {
    let (write_tx, write_rx) = mpsc::channel(capacity);
    let (event_tx, event_rx) = mpsc::channel(capacity);
    (
        MemoryLink { writes: write_tx },
        event_rx,
        MemoryDevice {
            writes: write_rx,
            events: event_tx,
        },
    )
}

impl DeviceLink for MemoryLink {
    fn write(&mut self, frame: Bytes) -> impl Future<Output = Result<()>> + Send {
        let writes = self.writes.clone();
        async move {
            debug!(len = frame.len(), "memory link write");
            writes.send(frame).await.map_err(|_| TransportError::Closed)
        }
    }
}

impl MemoryDevice {
    /// Wait for the next frame written by the host.
    ///
    /// Returns `None` once every host-side handle has been dropped.
    pub async fn next_write(&mut self) -> Option<Bytes> {
        self.writes.recv().await
    }

    /// Take a written frame if one is already queued.
    pub fn try_next_write(&mut self) -> Option<Bytes> {
        self.writes.try_recv().ok()
    }

    /// Push a notification to the host.
    pub async fn notify(&self, bytes: impl Into<Bytes>) -> Result<()> {
        self.events
            .send(LinkEvent::notification(bytes))
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Signal a link loss to the host.
    pub async fn disconnect(&self) -> Result<()> {
        self.events
            .send(LinkEvent::Disconnected)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_reaches_device() {
        let (mut link, _events, mut device) = memory_link(4);

        link.write(Bytes::from_static(&[0xAA, 0xE5, 0x00]))
            .await
            .expect("write should succeed");

        let frame = device.next_write().await.expect("device should see frame");
        assert_eq!(frame.as_ref(), &[0xAA, 0xE5, 0x00]);
    }

    #[tokio::test]
    async fn notifications_arrive_in_order() {
        let (_link, mut events, device) = memory_link(4);

        device.notify(vec![0xBB, 0xE5, 0x01]).await.unwrap();
        device.notify(vec![0xBB, 0xE6, 0x00]).await.unwrap();
        device.disconnect().await.unwrap();

        assert_eq!(
            events.recv().await,
            Some(LinkEvent::notification(vec![0xBB, 0xE5, 0x01]))
        );
        assert_eq!(
            events.recv().await,
            Some(LinkEvent::notification(vec![0xBB, 0xE6, 0x00]))
        );
        assert_eq!(events.recv().await, Some(LinkEvent::Disconnected));
    }

    #[tokio::test]
    async fn write_after_device_dropped_is_closed() {
        let (mut link, _events, device) = memory_link(1);
        drop(device);

        let err = link
            .write(Bytes::from_static(&[0xAA]))
            .await
            .expect_err("write should fail");
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test]
    async fn notify_after_host_dropped_is_closed() {
        let (link, events, device) = memory_link(1);
        drop(link);
        drop(events);

        let err = device.notify(vec![0xBB]).await.expect_err("notify should fail");
        assert!(matches!(err, TransportError::Closed));
        assert!(matches!(
            device.disconnect().await,
            Err(TransportError::Closed)
        ));
    }
}
