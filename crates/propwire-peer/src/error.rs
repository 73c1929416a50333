use std::time::Duration;

/// Errors that can occur in session and correlation operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] propwire_transport::TransportError),

    /// Frame-level (format) error.
    #[error("frame error: {0}")]
    Frame(#[from] propwire_frame::FrameError),

    /// The device disconnected before a reply arrived, or the session has ended.
    #[error("device disconnected: {0}")]
    Disconnected(String),

    /// No matching notification arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A reply matched by tag but did not carry the expected fields.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}

pub type Result<T> = std::result::Result<T, PeerError>;
