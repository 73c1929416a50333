//! Uppercase hex helpers.
//!
//! Hex strings are only a debugging and correlation convenience; the wire
//! carries raw bytes.

use std::fmt::Write;

use crate::error::{FrameError, Result};

/// Encode bytes as an uppercase hex string without separators.
pub fn encode_upper(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
    out
}

/// Decode a hex string into bytes.
///
/// Case-insensitive. Whitespace is not accepted here; callers that allow it
/// strip it first.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    if input.len() % 2 != 0 {
        return Err(FrameError::OddLength { len: input.len() });
    }

    let mut out = Vec::with_capacity(input.len() / 2);
    let mut high: Option<u8> = None;
    for (position, ch) in input.chars().enumerate() {
        let value = nibble(ch, position)?;
        match high.take() {
            None => high = Some(value),
            Some(hi) => out.push((hi << 4) | value),
        }
    }
    Ok(out)
}

/// Remove all whitespace from a hex string.
pub fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `position` counts characters, not bytes.
fn nibble(ch: char, position: usize) -> Result<u8> {
    match ch.to_digit(16) {
        Some(value) => Ok(value as u8),
        None => Err(FrameError::InvalidDigit { ch, position }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_uppercase() {
        assert_eq!(encode_upper(&[0xbb, 0xe5, 0x0a]), "BBE50A");
        assert_eq!(encode_upper(&[]), "");
    }

    #[test]
    fn decode_mixed_case() {
        assert_eq!(decode("aAfF09").unwrap(), vec![0xAA, 0xFF, 0x09]);
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert_eq!(decode("ABC"), Err(FrameError::OddLength { len: 3 }));
    }

    #[test]
    fn decode_rejects_non_hex() {
        assert_eq!(
            decode("A0G1"),
            Err(FrameError::InvalidDigit {
                ch: 'G',
                position: 2
            })
        );
    }

    #[test]
    fn decode_reports_non_ascii_character() {
        // "é" is two UTF-8 bytes, so the length check passes.
        assert_eq!(
            decode("é"),
            Err(FrameError::InvalidDigit {
                ch: 'é',
                position: 0
            })
        );
        assert_eq!(
            decode("0Aé"),
            Err(FrameError::InvalidDigit {
                ch: 'é',
                position: 2
            })
        );
    }

    #[test]
    fn strip_whitespace_removes_all_kinds() {
        assert_eq!(strip_whitespace(" 01 02\t03\n"), "010203");
    }
}
