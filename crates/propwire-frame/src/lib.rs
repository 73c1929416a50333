//! Command framing and status decoding for BLE animatronic props.
//!
//! Outbound commands are framed as:
//! - a start byte `0xAA`
//! - a one-byte tag naming the command family
//! - a zero-padded payload
//! - a trailing Dallas/Maxim CRC-8 over everything before it
//!
//! Inbound notifications start with `0xBB` and the mirrored tag; their
//! layout is tag-specific and decoded by [`status::decode`].

pub mod codec;
pub mod error;
pub mod hex;
pub mod status;
pub mod tag;

pub use codec::{
    build_command, checksum, encode_command, reply_prefix, verify_command, COMMAND_OVERHEAD,
    COMMAND_START, NOTIFY_START,
};
pub use error::{FrameError, Result};
pub use status::{decode, Capacity, DeviceStatus, StatusUpdate, CHANNEL_COUNT};
pub use tag::{tag_name, Tag};
