use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// Write half of a connected device link.
///
/// Implemented by whatever owns the GATT write characteristic. The protocol
/// core only ever hands it complete command frames.
pub trait DeviceLink: Send + 'static {
    /// Write one complete frame to the device.
    fn write(&mut self, frame: Bytes) -> impl Future<Output = Result<()>> + Send;
}

/// Inbound event from a connected device link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A notification arrived on the notify characteristic.
    Notification(Bytes),
    /// The link dropped. No further events follow.
    Disconnected,
}

impl LinkEvent {
    /// Convenience constructor for a notification event.
    pub fn notification(bytes: impl Into<Bytes>) -> Self {
        Self::Notification(bytes.into())
    }
}
