/// Errors that can occur on the device link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The link is closed; the other side has gone away.
    #[error("link closed")]
    Closed,

    /// The platform stack rejected a characteristic write.
    #[error("characteristic write failed: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
