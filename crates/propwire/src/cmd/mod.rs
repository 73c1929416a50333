use clap::{Args, Subcommand};
use propwire_peer::{DeviceCommand, DEFAULT_MIN_PAYLOAD_BYTES};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod checksum;
pub mod command;
pub mod decode;
pub mod frame;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a command frame from a hex tag and payload.
    Frame(FrameArgs),
    /// Build the frame for a catalog command.
    Command(CommandArgs),
    /// Compute the CRC-8 of hex bytes.
    Checksum(ChecksumArgs),
    /// Decode a notification into status fields.
    Decode(DecodeArgs),
    /// Run a session against a simulated prop and print its status.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Frame(args) => frame::run(args, format),
        Command::Command(args) => command::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Tag byte as two hex digits (e.g. E5).
    pub tag: String,
    /// Payload as hex; whitespace is ignored.
    #[arg(default_value = "")]
    pub payload: String,
    /// Zero-pad the payload to at least this many bytes.
    #[arg(long, default_value_t = 0)]
    pub min_bytes: usize,
}

#[derive(Args, Debug)]
pub struct CommandArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
    /// Zero-pad the payload to at least this many bytes.
    #[arg(long, default_value_t = DEFAULT_MIN_PAYLOAD_BYTES, global = true)]
    pub min_bytes: usize,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CatalogCommand {
    /// Query channels, show mode and device name (E0).
    Parameters,
    /// Query live action and eye icon (E1).
    LiveMode,
    /// Query volume (E5).
    Volume,
    /// Query Bluetooth name (E6).
    BluetoothName,
    /// Query storage capacity (D2).
    Capacity,
    /// Query firmware version (EE).
    Firmware,
    /// Set volume (FA).
    SetVolume {
        /// Volume, 0-255.
        value: u8,
    },
    /// Start playback (FC 01).
    Play,
    /// Pause playback (FC 00).
    Pause,
    /// Enable classic Bluetooth mode (FD 01).
    ClassicBluetooth,
}

impl From<CatalogCommand> for DeviceCommand {
    fn from(command: CatalogCommand) -> Self {
        match command {
            CatalogCommand::Parameters => DeviceCommand::QueryParameters,
            CatalogCommand::LiveMode => DeviceCommand::QueryLiveMode,
            CatalogCommand::Volume => DeviceCommand::QueryVolume,
            CatalogCommand::BluetoothName => DeviceCommand::QueryBluetoothName,
            CatalogCommand::Capacity => DeviceCommand::QueryCapacity,
            CatalogCommand::Firmware => DeviceCommand::QueryFirmware,
            CatalogCommand::SetVolume { value } => DeviceCommand::SetVolume(value),
            CatalogCommand::Play => DeviceCommand::Play,
            CatalogCommand::Pause => DeviceCommand::Pause,
            CatalogCommand::ClassicBluetooth => DeviceCommand::EnableClassicBluetooth,
        }
    }
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Bytes as hex; whitespace is ignored.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Notification bytes as hex (e.g. BBE5320000); whitespace is ignored.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Reply timeout per request (e.g. 3s, 500ms).
    #[arg(long, default_value = "3s", env = "PROPWIRE_TIMEOUT")]
    pub timeout: String,
    /// Set this volume before querying.
    #[arg(long)]
    pub volume: Option<u8>,
    /// Bluetooth name the simulated prop reports.
    #[arg(long, default_value = "PropWire")]
    pub name: String,
    /// Drop the link after this many replies to exercise disconnect handling.
    #[arg(long)]
    pub drop_after: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
