//! Observed command/reply tags.
//!
//! Request and reply tags are identical for every observed command.

/// Device parameters (channels, show mode, device name).
pub const DEVICE_PARAMETERS: u8 = 0xE0;

/// Live mode (action and eye icon).
pub const LIVE_MODE: u8 = 0xE1;

/// Volume query.
pub const VOLUME: u8 = 0xE5;

/// Bluetooth name query.
pub const BLUETOOTH_NAME: u8 = 0xE6;

/// Storage capacity (KB and file count).
pub const CAPACITY: u8 = 0xD2;

/// Firmware version. Reply layout is not documented.
pub const FIRMWARE_VERSION: u8 = 0xEE;

/// Set volume (one byte payload, 0-255).
pub const SET_VOLUME: u8 = 0xFA;

/// Play (`01`) or pause (`00`).
pub const PLAYBACK: u8 = 0xFC;

/// Enable classic Bluetooth mode (`01`).
pub const CLASSIC_BLUETOOTH: u8 = 0xFD;

/// Closed set of tags with a known layout or purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    DeviceParameters,
    LiveMode,
    Volume,
    BluetoothName,
    Capacity,
    FirmwareVersion,
    SetVolume,
    Playback,
    ClassicBluetooth,
}

impl Tag {
    /// Map a raw tag byte onto the catalog. Unknown bytes yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            DEVICE_PARAMETERS => Some(Self::DeviceParameters),
            LIVE_MODE => Some(Self::LiveMode),
            VOLUME => Some(Self::Volume),
            BLUETOOTH_NAME => Some(Self::BluetoothName),
            CAPACITY => Some(Self::Capacity),
            FIRMWARE_VERSION => Some(Self::FirmwareVersion),
            SET_VOLUME => Some(Self::SetVolume),
            PLAYBACK => Some(Self::Playback),
            CLASSIC_BLUETOOTH => Some(Self::ClassicBluetooth),
            _ => None,
        }
    }

    /// The raw tag byte.
    pub fn byte(self) -> u8 {
        match self {
            Self::DeviceParameters => DEVICE_PARAMETERS,
            Self::LiveMode => LIVE_MODE,
            Self::Volume => VOLUME,
            Self::BluetoothName => BLUETOOTH_NAME,
            Self::Capacity => CAPACITY,
            Self::FirmwareVersion => FIRMWARE_VERSION,
            Self::SetVolume => SET_VOLUME,
            Self::Playback => PLAYBACK,
            Self::ClassicBluetooth => CLASSIC_BLUETOOTH,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::DeviceParameters => "DEVICE_PARAMETERS",
            Self::LiveMode => "LIVE_MODE",
            Self::Volume => "VOLUME",
            Self::BluetoothName => "BLUETOOTH_NAME",
            Self::Capacity => "CAPACITY",
            Self::FirmwareVersion => "FIRMWARE_VERSION",
            Self::SetVolume => "SET_VOLUME",
            Self::Playback => "PLAYBACK",
            Self::ClassicBluetooth => "CLASSIC_BLUETOOTH",
        }
    }
}

/// Returns a human-readable name for a raw tag byte.
pub fn tag_name(byte: u8) -> &'static str {
    Tag::from_byte(byte).map_or("UNKNOWN", Tag::name)
}
