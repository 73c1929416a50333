use bytes::Bytes;
use propwire_frame::{encode_command, reply_prefix, tag};

/// Payload length the prop expects on every command; shorter payloads are zero-padded.
pub const DEFAULT_MIN_PAYLOAD_BYTES: usize = 8;

const ON: [u8; 1] = [0x01];
const OFF: [u8; 1] = [0x00];

/// Commands from the observed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Channels, show mode and device name (`E0`).
    QueryParameters,
    /// Live action and eye icon (`E1`).
    QueryLiveMode,
    /// Volume (`E5`).
    QueryVolume,
    /// Bluetooth name (`E6`).
    QueryBluetoothName,
    /// Storage capacity (`D2`).
    QueryCapacity,
    /// Firmware version (`EE`).
    QueryFirmware,
    /// Set volume, 0-255 (`FA`).
    SetVolume(u8),
    /// Start playback (`FC 01`).
    Play,
    /// Pause playback (`FC 00`).
    Pause,
    /// Switch the prop into classic Bluetooth mode (`FD 01`).
    EnableClassicBluetooth,
}

impl DeviceCommand {
    pub fn tag(&self) -> u8 {
        match self {
            Self::QueryParameters => tag::DEVICE_PARAMETERS,
            Self::QueryLiveMode => tag::LIVE_MODE,
            Self::QueryVolume => tag::VOLUME,
            Self::QueryBluetoothName => tag::BLUETOOTH_NAME,
            Self::QueryCapacity => tag::CAPACITY,
            Self::QueryFirmware => tag::FIRMWARE_VERSION,
            Self::SetVolume(_) => tag::SET_VOLUME,
            Self::Play | Self::Pause => tag::PLAYBACK,
            Self::EnableClassicBluetooth => tag::CLASSIC_BLUETOOTH,
        }
    }

    /// Unpadded payload bytes.
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::SetVolume(volume) => std::slice::from_ref(volume),
            Self::Play | Self::EnableClassicBluetooth => &ON,
            Self::Pause => &OFF,
            _ => &[],
        }
    }

    /// Queries are answered with a notification carrying the same tag.
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            Self::QueryParameters
                | Self::QueryLiveMode
                | Self::QueryVolume
                | Self::QueryBluetoothName
                | Self::QueryCapacity
                | Self::QueryFirmware
        )
    }

    /// Hex prefix of the notification that answers this command.
    pub fn reply_prefix(&self) -> String {
        reply_prefix(self.tag())
    }

    /// Encode the command frame.
    pub fn frame(&self, min_payload_bytes: usize) -> Bytes {
        encode_command(self.tag(), self.payload(), min_payload_bytes)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::QueryParameters => "query-parameters",
            Self::QueryLiveMode => "query-live-mode",
            Self::QueryVolume => "query-volume",
            Self::QueryBluetoothName => "query-bluetooth-name",
            Self::QueryCapacity => "query-capacity",
            Self::QueryFirmware => "query-firmware",
            Self::SetVolume(_) => "set-volume",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::EnableClassicBluetooth => "enable-classic-bluetooth",
        }
    }
}
