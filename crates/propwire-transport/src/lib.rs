//! Transport seam for talking to a BLE animatronic prop.
//!
//! The GATT stack itself (discovery, connect, characteristic write/notify)
//! lives outside this workspace. This crate defines the narrow surface the
//! protocol core consumes from it:
//! - [`DeviceLink`] for writing raw command frames
//! - a stream of [`LinkEvent`]s for notifications and disconnects
//!
//! An in-process [`memory`] link is provided for tests and simulation.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::{memory_link, MemoryDevice, MemoryLink};
pub use traits::{DeviceLink, LinkEvent};
