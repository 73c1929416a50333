/// Format errors raised while building command frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// A hex string has an odd number of digits.
    #[error("hex string has odd length ({len} digits)")]
    OddLength { len: usize },

    /// A hex string contains a character that is not a hex digit.
    #[error("invalid hex digit {ch:?} at position {position}")]
    InvalidDigit { ch: char, position: usize },

    /// The tag does not encode exactly one byte.
    #[error("tag must be exactly one byte (got {len} hex digits)")]
    InvalidTag { len: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
