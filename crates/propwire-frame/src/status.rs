//! Status decoding for inbound notifications.
//!
//! [`decode`] projects one notification onto a sparse [`StatusUpdate`];
//! [`DeviceStatus::apply`] folds updates into the running view of the prop.
//! The device remains the source of truth.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::tag::Tag;

/// Number of channel values carried by a device-parameters reply.
pub const CHANNEL_COUNT: usize = 6;

const CHANNELS_OFFSET: usize = 2;
const SHOW_MODE_OFFSET: usize = 20;
const DEVICE_NAME_LEN_OFFSET: usize = 28;
const BT_NAME_LEN_OFFSET: usize = 2;
const LIVE_ACTION_OFFSET: usize = 2;
const LIVE_EYE_OFFSET: usize = 45;
const VOLUME_OFFSET: usize = 2;
const CAPACITY_KB_OFFSET: usize = 2;
const CAPACITY_FILES_OFFSET: usize = 6;

/// Storage usage reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    /// Used capacity in kilobytes.
    pub kb: u32,
    /// Number of stored files.
    pub files: u8,
}

/// Fields carried by a single notification. `None` means "not carried".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_mode: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<[u8; CHANNEL_COUNT]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bluetooth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_action: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_eye_icon: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
}

impl StatusUpdate {
    /// True when the notification carried no recognized fields.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Last observed state of the prop. Fields stay `None` until first reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_name: Option<String>,
    pub show_mode: Option<u8>,
    pub channels: Option<[u8; CHANNEL_COUNT]>,
    pub bluetooth_name: Option<String>,
    pub volume: Option<u8>,
    pub live_action: Option<u8>,
    pub live_eye_icon: Option<u8>,
    pub capacity: Option<Capacity>,
}

impl DeviceStatus {
    /// Overwrite every field the update carries. Returns true if anything changed.
    pub fn apply(&mut self, update: &StatusUpdate) -> bool {
        let before = self.clone();

        if let Some(name) = &update.device_name {
            self.device_name = Some(name.clone());
        }
        if let Some(mode) = update.show_mode {
            self.show_mode = Some(mode);
        }
        if let Some(channels) = update.channels {
            self.channels = Some(channels);
        }
        if let Some(name) = &update.bluetooth_name {
            self.bluetooth_name = Some(name.clone());
        }
        if let Some(volume) = update.volume {
            self.volume = Some(volume);
        }
        if let Some(action) = update.live_action {
            self.live_action = Some(action);
        }
        if let Some(icon) = update.live_eye_icon {
            self.live_eye_icon = Some(icon);
        }
        if let Some(capacity) = update.capacity {
            self.capacity = Some(capacity);
        }

        *self != before
    }
}

/// Decode one notification into the fields it carries.
///
/// Dispatches on the tag at byte 1; byte 0 is not inspected. Unknown tags
/// and tags without a reply layout decode to an empty update. A field whose
/// bytes are missing from a short frame is left out, and names are clamped
/// to the bytes present.
pub fn decode(frame: &[u8]) -> StatusUpdate {
    let mut update = StatusUpdate::default();
    let Some(&tag_byte) = frame.get(1) else {
        trace!(len = frame.len(), "notification too short to carry a tag");
        return update;
    };

    match Tag::from_byte(tag_byte) {
        Some(Tag::Volume) => {
            update.volume = frame.get(VOLUME_OFFSET).copied();
        }
        Some(Tag::BluetoothName) => {
            update.bluetooth_name = length_prefixed_ascii(frame, BT_NAME_LEN_OFFSET);
        }
        Some(Tag::LiveMode) => {
            update.live_action = frame.get(LIVE_ACTION_OFFSET).copied();
            update.live_eye_icon = frame.get(LIVE_EYE_OFFSET).copied();
        }
        Some(Tag::DeviceParameters) => {
            update.channels = frame
                .get(CHANNELS_OFFSET..CHANNELS_OFFSET + CHANNEL_COUNT)
                .and_then(|bytes| bytes.try_into().ok());
            update.show_mode = frame.get(SHOW_MODE_OFFSET).copied();
            update.device_name = length_prefixed_ascii(frame, DEVICE_NAME_LEN_OFFSET);
        }
        Some(Tag::Capacity) => {
            let kb = frame
                .get(CAPACITY_KB_OFFSET..CAPACITY_KB_OFFSET + 4)
                .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok())
                .map(u32::from_be_bytes);
            if let (Some(kb), Some(&files)) = (kb, frame.get(CAPACITY_FILES_OFFSET)) {
                update.capacity = Some(Capacity { kb, files });
            }
        }
        Some(tag) => {
            debug!(tag = tag.name(), "no status layout for tag");
        }
        None => {
            debug!(tag = format_args!("{tag_byte:02X}"), "ignoring unknown tag");
        }
    }

    update
}

/// Read `n = frame[len_offset]` followed by up to `n` ASCII bytes.
///
/// Bytes outside 0x20..=0x7E are dropped and the result is trimmed.
fn length_prefixed_ascii(frame: &[u8], len_offset: usize) -> Option<String> {
    let len = usize::from(*frame.get(len_offset)?);
    let start = len_offset + 1;
    let end = (start + len).min(frame.len());
    let raw = frame.get(start..end).unwrap_or_default();

    let text: String = raw
        .iter()
        .filter(|b| (0x20..=0x7E).contains(*b))
        .map(|&b| char::from(b))
        .collect();
    Some(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex;

    fn parameters_frame(name: &str) -> Vec<u8> {
        let mut frame = vec![0u8; 29];
        frame[0] = 0xBB;
        frame[1] = 0xE0;
        frame[2..8].copy_from_slice(&[10, 20, 30, 40, 50, 60]);
        frame[20] = 3;
        frame[28] = name.len() as u8;
        frame.extend_from_slice(name.as_bytes());
        frame
    }

    #[test]
    fn volume() {
        let update = decode(&[0xBB, 0xE5, 0x32, 0x00, 0x00]);
        assert_eq!(update.volume, Some(50));
        assert_eq!(
            update,
            StatusUpdate {
                volume: Some(50),
                ..StatusUpdate::default()
            }
        );
    }

    #[test]
    fn bluetooth_name() {
        let frame = hex::decode("BBE60548656C6C6F").unwrap();
        assert_eq!(decode(&frame).bluetooth_name.as_deref(), Some("Hello"));
    }

    #[test]
    fn bluetooth_name_drops_non_printable_and_trims() {
        let frame = [0xBB, 0xE6, 0x07, b' ', b'H', 0x00, b'i', 0x7F, b' ', 0xC8];
        assert_eq!(decode(&frame).bluetooth_name.as_deref(), Some("Hi"));
    }

    #[test]
    fn bluetooth_name_clamped_to_frame() {
        let frame = [0xBB, 0xE6, 0x10, b'A', b'B'];
        assert_eq!(decode(&frame).bluetooth_name.as_deref(), Some("AB"));
    }

    #[test]
    fn capacity() {
        let frame = hex::decode("BBD20000100005").unwrap();
        assert_eq!(
            decode(&frame).capacity,
            Some(Capacity { kb: 4096, files: 5 })
        );
    }

    #[test]
    fn capacity_needs_all_bytes() {
        let frame = hex::decode("BBD2000010").unwrap();
        assert!(decode(&frame).is_empty());
    }

    #[test]
    fn live_mode() {
        let mut frame = vec![0u8; 46];
        frame[0] = 0xBB;
        frame[1] = 0xE1;
        frame[2] = 1;
        frame[45] = 7;
        let update = decode(&frame);
        assert_eq!(update.live_action, Some(1));
        assert_eq!(update.live_eye_icon, Some(7));
    }

    #[test]
    fn live_mode_short_frame_keeps_action_only() {
        let update = decode(&[0xBB, 0xE1, 0x02]);
        assert_eq!(update.live_action, Some(2));
        assert_eq!(update.live_eye_icon, None);
    }

    #[test]
    fn device_parameters() {
        let update = decode(&parameters_frame("Skelly"));
        assert_eq!(update.channels, Some([10, 20, 30, 40, 50, 60]));
        assert_eq!(update.show_mode, Some(3));
        assert_eq!(update.device_name.as_deref(), Some("Skelly"));
    }

    #[test]
    fn unknown_and_layoutless_tags_are_ignored() {
        assert!(decode(&[0xBB, 0x42, 0x01, 0x02]).is_empty());
        assert!(decode(&[0xBB, 0xEE, 0x01, 0x02]).is_empty());
        assert!(decode(&[0xBB]).is_empty());
        assert!(decode(&[]).is_empty());
    }

    #[test]
    fn apply_overwrites_only_carried_fields() {
        let mut status = DeviceStatus::default();
        assert!(status.apply(&decode(&parameters_frame("Skelly"))));
        assert!(status.apply(&decode(&[0xBB, 0xE5, 0x10])));

        assert_eq!(status.volume, Some(16));
        assert_eq!(status.device_name.as_deref(), Some("Skelly"));
        assert_eq!(status.show_mode, Some(3));

        assert!(!status.apply(&decode(&[0xBB, 0xE5, 0x10])));
        assert!(!status.apply(&StatusUpdate::default()));
    }

    #[test]
    fn update_serializes_sparse() {
        let update = decode(&[0xBB, 0xE5, 0x32]);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "volume": 50 }));
    }
}
