use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::hex;

/// First byte of every outbound command frame.
pub const COMMAND_START: u8 = 0xAA;

/// First byte of every inbound notification frame.
pub const NOTIFY_START: u8 = 0xBB;

/// Command overhead: start (1) + tag (1) + checksum (1).
pub const COMMAND_OVERHEAD: usize = 3;

/// Reflected form of the Dallas/Maxim polynomial x^8 + x^5 + x^4 + 1.
const CRC8_POLY: u8 = 0x8C;

/// Dallas/Maxim CRC-8 over `bytes`.
///
/// Zero initial value, reflected, no final XOR. Appending the result to the
/// input and recomputing always yields zero.
pub fn checksum(bytes: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in bytes {
        let mut x = crc ^ byte;
        for _ in 0..8 {
            x = if x & 0x01 != 0 {
                (x >> 1) ^ CRC8_POLY
            } else {
                x >> 1
            };
        }
        crc = x;
    }
    crc
}

/// Build a command frame from hex input.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────┬──────────────────────────┬────────────┐
/// │ Start (1B) │ Tag (1B) │ Payload (>= min bytes,   │ CRC-8 (1B) │
/// │ 0xAA       │          │ zero-padded on the right)│            │
/// └────────────┴──────────┴──────────────────────────┴────────────┘
/// ```
///
/// `tag` must be exactly two hex digits (any case). Whitespace in
/// `payload_hex` is ignored. A payload longer than `min_payload_bytes` is
/// kept whole.
pub fn build_command(tag: &str, payload_hex: &str, min_payload_bytes: usize) -> Result<Bytes> {
    let tag = tag.to_ascii_uppercase();
    let tag_bytes = hex::decode(&tag)?;
    let &[tag_byte] = tag_bytes.as_slice() else {
        return Err(FrameError::InvalidTag { len: tag.len() });
    };

    let payload_hex = hex::strip_whitespace(payload_hex);
    if payload_hex.len() % 2 != 0 {
        return Err(FrameError::OddLength {
            len: payload_hex.len(),
        });
    }
    let payload = hex::decode(&payload_hex)?;

    Ok(encode_command(tag_byte, &payload, min_payload_bytes))
}

/// Build a command frame from raw bytes.
pub fn encode_command(tag: u8, payload: &[u8], min_payload_bytes: usize) -> Bytes {
    let payload_len = payload.len().max(min_payload_bytes);
    let mut dst = BytesMut::with_capacity(COMMAND_OVERHEAD + payload_len);
    dst.put_u8(COMMAND_START);
    dst.put_u8(tag);
    dst.put_slice(payload);
    dst.put_bytes(0, payload_len - payload.len());
    let crc = checksum(&dst);
    dst.put_u8(crc);
    dst.freeze()
}

/// Check that `frame` is a well-formed command frame with a valid checksum.
pub fn verify_command(frame: &[u8]) -> bool {
    frame.len() >= COMMAND_OVERHEAD && frame[0] == COMMAND_START && checksum(frame) == 0
}

/// Hex prefix a notification must start with to answer a command with `tag`.
pub fn reply_prefix(tag: u8) -> String {
    hex::encode_upper(&[NOTIFY_START, tag])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_known_check_value() {
        assert_eq!(checksum(b"123456789"), 0xA1);
        assert_eq!(checksum(&[]), 0x00);
    }

    #[test]
    fn checksum_appended_yields_zero() {
        // Deterministic LCG so the sample set is stable across runs.
        let mut state: u32 = 0x1234_5678;
        for len in 0..64 {
            let mut message = Vec::with_capacity(len + 1);
            for _ in 0..len {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                message.push((state >> 16) as u8);
            }
            let crc = checksum(&message);
            message.push(crc);
            assert_eq!(checksum(&message), 0, "len {len}");
        }
    }

    #[test]
    fn checksum_of_every_single_byte_closes() {
        for byte in 0..=u8::MAX {
            assert_eq!(checksum(&[byte, checksum(&[byte])]), 0);
        }
    }

    #[test]
    fn play_frame_shape() {
        let frame = build_command("FC", "01", 0).unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(&frame[..3], &[0xAA, 0xFC, 0x01]);
        assert_eq!(frame[3], checksum(&frame[..3]));
    }

    #[test]
    fn payload_is_zero_padded() {
        let frame = build_command("E5", "", 8).unwrap();
        assert_eq!(frame.len(), 11);
        assert_eq!(&frame[..2], &[0xAA, 0xE5]);
        assert!(frame[2..10].iter().all(|&b| b == 0));
        assert_eq!(frame[10], checksum(&frame[..10]));
    }

    #[test]
    fn long_payload_is_not_truncated() {
        let frame = build_command("AB", "FFFF", 1).unwrap();
        assert_eq!(frame.len(), 5);
        assert_eq!(&frame[..4], &[0xAA, 0xAB, 0xFF, 0xFF]);
        assert_eq!(frame[4], checksum(&frame[..4]));
    }

    #[test]
    fn tag_is_case_insensitive_and_payload_whitespace_ignored() {
        let lower = build_command("fa", " 3 2 ", 8).unwrap();
        let upper = build_command("FA", "32", 8).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn rejects_odd_length_payload_before_padding() {
        assert_eq!(
            build_command("FA", "ABC", 4),
            Err(FrameError::OddLength { len: 3 })
        );
    }

    #[test]
    fn rejects_non_hex_payload() {
        assert!(matches!(
            build_command("FA", "0Z", 0),
            Err(FrameError::InvalidDigit { ch: 'Z', .. })
        ));
    }

    #[test]
    fn rejects_bad_tags() {
        assert_eq!(
            build_command("E", "", 0),
            Err(FrameError::OddLength { len: 1 })
        );
        assert_eq!(build_command("", "", 0), Err(FrameError::InvalidTag { len: 0 }));
        assert_eq!(
            build_command("E5E5", "", 0),
            Err(FrameError::InvalidTag { len: 4 })
        );
        assert!(matches!(
            build_command("XY", "", 0),
            Err(FrameError::InvalidDigit { .. })
        ));
    }

    #[test]
    fn hex_and_byte_builders_agree() {
        assert_eq!(
            build_command("FA", "32", 8).unwrap(),
            encode_command(0xFA, &[0x32], 8)
        );
    }

    #[test]
    fn verify_accepts_built_frames_only() {
        let frame = build_command("E0", "", 8).unwrap();
        assert!(verify_command(&frame));

        let mut corrupted = frame.to_vec();
        corrupted[3] ^= 0x01;
        assert!(!verify_command(&corrupted));
        assert!(!verify_command(&[0xAA, 0xE0]));
        assert!(!verify_command(&[0xBB, 0xE5, checksum(&[0xBB, 0xE5])]));
    }

    #[test]
    fn reply_prefix_is_uppercase_notify_tag() {
        assert_eq!(reply_prefix(0xe5), "BBE5");
        assert_eq!(reply_prefix(0xD2), "BBD2");
    }
}
