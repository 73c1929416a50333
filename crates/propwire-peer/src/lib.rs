//! Request/response correlation and session management for BLE props.
//!
//! This is the "just works" layer. Spawn a [`Session`] over a connected
//! device link, issue typed commands, and read the device status folded
//! from every notification the prop sends.

pub mod command;
pub mod engine;
pub mod error;
pub mod pending;
pub mod session;

pub use command::{DeviceCommand, DEFAULT_MIN_PAYLOAD_BYTES};
pub use engine::{Delivery, Engine};
pub use error::{PeerError, Result};
pub use pending::{PendingReplies, ReplyFuture};
pub use session::{Session, SessionConfig};
