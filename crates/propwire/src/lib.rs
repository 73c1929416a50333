//! Command protocol and reply correlation for BLE animatronic props.
//!
//! propwire builds checksummed command frames, decodes the prop's status
//! notifications, and matches replies back to the commands that asked for
//! them, with timeouts and disconnect handling.
//!
//! # Crate Structure
//!
//! - [`transport`] — Device link seam and in-memory link
//! - [`frame`] — Command framing, CRC-8 and status decoding
//! - [`peer`] — Reply correlation and sessions (behind `peer` feature)

/// Re-export transport types.
pub mod transport {
    pub use propwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use propwire_frame::*;
}

/// Re-export peer types (requires `peer` feature).
#[cfg(feature = "peer")]
pub mod peer {
    pub use propwire_peer::*;
}
