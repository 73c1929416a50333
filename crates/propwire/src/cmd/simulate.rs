use std::time::Duration;

use propwire_frame::{tag, verify_command, DeviceStatus, Tag, CHANNEL_COUNT, NOTIFY_START};
use propwire_peer::{Session, SessionConfig};
use propwire_transport::{memory_link, MemoryDevice};
use tracing::{debug, info, warn};

use crate::cmd::SimulateArgs;
use crate::exit::{io_error, peer_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_fields, OutputFormat};

const MAX_NAME_LEN: usize = 32;
const PARAMETERS_NAME_OFFSET: usize = 29;
const LIVE_MODE_LEN: usize = 46;

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))?;

    let status = runtime.block_on(simulate(&args, timeout))?;
    print_fields("status", &status, format);
    Ok(SUCCESS)
}

async fn simulate(args: &SimulateArgs, timeout: Duration) -> CliResult<DeviceStatus> {
    let (link, events, device) = memory_link(16);
    let server = tokio::spawn(serve(
        device,
        SimulatedProp::new(&args.name),
        args.drop_after,
    ));
    let session = Session::spawn(
        link,
        events,
        SessionConfig {
            request_timeout: timeout,
            ..SessionConfig::default()
        },
    );

    if let Some(volume) = args.volume {
        session
            .set_volume(volume)
            .await
            .map_err(|err| peer_error("set volume failed", err))?;
    }

    let volume = session
        .query_volume()
        .await
        .map_err(|err| peer_error("volume query failed", err))?;
    let name = session
        .query_bluetooth_name()
        .await
        .map_err(|err| peer_error("name query failed", err))?;
    info!(volume, %name, "prop identified");

    session
        .query_parameters()
        .await
        .map_err(|err| peer_error("parameters query failed", err))?;
    session
        .query_live_mode()
        .await
        .map_err(|err| peer_error("live mode query failed", err))?;
    session
        .query_capacity()
        .await
        .map_err(|err| peer_error("capacity query failed", err))?;
    let firmware = session
        .query_firmware()
        .await
        .map_err(|err| peer_error("firmware query failed", err))?;
    info!(%firmware, "firmware reply");

    let status = session.status();
    session.shutdown().await;
    if let Err(err) = server.await {
        warn!("simulated prop ended abnormally: {err}");
    }
    Ok(status)
}

/// Answer frames from the host until the link closes.
async fn serve(mut device: MemoryDevice, mut prop: SimulatedProp, drop_after: Option<usize>) {
    let mut sent = 0usize;
    while let Some(frame) = device.next_write().await {
        let Some(reply) = prop.handle(&frame) else {
            continue;
        };
        if drop_after.is_some_and(|limit| sent >= limit) {
            info!(sent, "simulated prop dropping link");
            let _ = device.disconnect().await;
            return;
        }
        if device.notify(reply).await.is_err() {
            return;
        }
        sent += 1;
    }
    debug!("host closed simulated link");
}

/// In-process stand-in for a prop.
#[derive(Debug, Clone)]
pub struct SimulatedProp {
    volume: u8,
    bluetooth_name: String,
    device_name: String,
    show_mode: u8,
    channels: [u8; CHANNEL_COUNT],
    live_action: u8,
    live_eye_icon: u8,
    capacity_kb: u32,
    files: u8,
    playing: bool,
    classic_bluetooth: bool,
}

impl SimulatedProp {
    pub fn new(name: &str) -> Self {
        Self {
            volume: 80,
            bluetooth_name: name.to_string(),
            device_name: "Skeleton".to_string(),
            show_mode: 1,
            channels: [0, 32, 64, 96, 128, 160],
            live_action: 0,
            live_eye_icon: 3,
            capacity_kb: 4096,
            files: 5,
            playing: false,
            classic_bluetooth: false,
        }
    }

    /// Apply one command frame. Returns the notification to emit, if any.
    ///
    /// Frames with a bad checksum are ignored. A volume change is followed by
    /// an unsolicited volume push.
    pub fn handle(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
        if !verify_command(frame) {
            warn!(len = frame.len(), "simulated prop ignoring corrupt frame");
            return None;
        }
        let value = frame.get(2).copied().unwrap_or_default();

        match Tag::from_byte(frame[1])? {
            Tag::Volume => Some(vec![NOTIFY_START, tag::VOLUME, self.volume]),
            Tag::BluetoothName => {
                let name = truncated(&self.bluetooth_name);
                let mut reply = vec![NOTIFY_START, tag::BLUETOOTH_NAME, name.len() as u8];
                reply.extend_from_slice(name);
                Some(reply)
            }
            Tag::DeviceParameters => {
                let name = truncated(&self.device_name);
                let mut reply = vec![0u8; PARAMETERS_NAME_OFFSET];
                reply[0] = NOTIFY_START;
                reply[1] = tag::DEVICE_PARAMETERS;
                reply[2..2 + CHANNEL_COUNT].copy_from_slice(&self.channels);
                reply[20] = self.show_mode;
                reply[28] = name.len() as u8;
                reply.extend_from_slice(name);
                Some(reply)
            }
            Tag::LiveMode => {
                let mut reply = vec![0u8; LIVE_MODE_LEN];
                reply[0] = NOTIFY_START;
                reply[1] = tag::LIVE_MODE;
                reply[2] = self.live_action;
                reply[45] = self.live_eye_icon;
                Some(reply)
            }
            Tag::Capacity => {
                let mut reply = vec![NOTIFY_START, tag::CAPACITY];
                reply.extend_from_slice(&self.capacity_kb.to_be_bytes());
                reply.push(self.files);
                Some(reply)
            }
            Tag::FirmwareVersion => Some(vec![NOTIFY_START, tag::FIRMWARE_VERSION, 1, 0, 3]),
            Tag::SetVolume => {
                self.volume = value;
                Some(vec![NOTIFY_START, tag::VOLUME, self.volume])
            }
            Tag::Playback => {
                self.playing = value == 0x01;
                debug!(playing = self.playing, "simulated playback");
                None
            }
            Tag::ClassicBluetooth => {
                self.classic_bluetooth = value == 0x01;
                debug!(enabled = self.classic_bluetooth, "simulated classic bluetooth");
                None
            }
        }
    }
}

fn truncated(name: &str) -> &[u8] {
    let bytes = name.as_bytes();
    &bytes[..bytes.len().min(MAX_NAME_LEN)]
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
