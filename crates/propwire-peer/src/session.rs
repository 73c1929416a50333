//! Session task owning one device link.
//!
//! A single spawned task owns the correlation [`Engine`] and the device
//! status. Callers talk to it over a channel, so notifications, registrations
//! and timeouts are all handled in one strict order. Link writes run on a
//! separate writer task; a stalled write never holds up timers or link events.

use std::time::Duration;

use bytes::Bytes;
use propwire_frame::{
    build_command, decode, hex, reply_prefix, Capacity, DeviceStatus, StatusUpdate,
};
use propwire_transport::{DeviceLink, LinkEvent, TransportError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::{DeviceCommand, DEFAULT_MIN_PAYLOAD_BYTES};
use crate::engine::Engine;
use crate::error::{PeerError, Result};
use crate::pending::ReplyFuture;

/// How long the loop sleeps when no waiter has a deadline.
const IDLE_TICK: Duration = Duration::from_secs(3600);

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time allowed for a reply, or for the write of a command that expects
    /// none. Default: 3s.
    pub request_timeout: Duration,
    /// Minimum payload length for typed commands. Default: 8 bytes.
    pub min_payload_bytes: usize,
    /// Capacity of the request queue and of the write queue. Default: 32.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(3),
            min_payload_bytes: DEFAULT_MIN_PAYLOAD_BYTES,
            channel_capacity: 32,
        }
    }
}

/// Work handed to the session task.
struct Request {
    frame: Bytes,
    expect: Option<Expectation>,
    reply: oneshot::Sender<Submitted>,
}

/// Work handed to the writer task.
struct WriteJob {
    frame: Bytes,
    ack: oneshot::Sender<propwire_transport::Result<()>>,
}

/// A request accepted by the session task: its waiter, if any, and the write
/// acknowledgement.
struct Submitted {
    reply: Option<ReplyFuture>,
    written: oneshot::Receiver<propwire_transport::Result<()>>,
}

impl Submitted {
    /// Wait for the outcome.
    ///
    /// With a waiter, the first of reply, timeout, disconnect or write failure
    /// decides. Without one, the write acknowledgement must arrive within
    /// `write_timeout`.
    async fn outcome(self, write_timeout: Duration) -> Result<String> {
        let Submitted { reply, mut written } = self;
        match reply {
            Some(mut reply) => {
                tokio::select! {
                    biased;
                    result = &mut reply => result,
                    ack = &mut written => {
                        write_acknowledged(ack)?;
                        reply.await
                    }
                }
            }
            None => match tokio::time::timeout(write_timeout, written).await {
                Ok(ack) => write_acknowledged(ack).map(|()| String::new()),
                Err(_) => Err(PeerError::Timeout(write_timeout)),
            },
        }
    }
}

fn write_acknowledged(
    ack: std::result::Result<propwire_transport::Result<()>, oneshot::error::RecvError>,
) -> Result<()> {
    match ack {
        Ok(result) => result.map_err(PeerError::from),
        Err(_) => Err(ended()),
    }
}

struct Expectation {
    prefix: String,
    timeout: Duration,
}

/// Handle to a running session.
#[derive(Debug)]
pub struct Session {
    tx: mpsc::Sender<Request>,
    status: watch::Receiver<DeviceStatus>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    writer: JoinHandle<()>,
    config: SessionConfig,
}

impl Session {
    /// Spawn the session task for a connected link.
    ///
    /// `events` is the link's notification/disconnect stream. Must be called
    /// from within a tokio runtime.
    pub fn spawn<L: DeviceLink>(
        link: L,
        events: mpsc::Receiver<LinkEvent>,
        config: SessionConfig,
    ) -> Self {
        let capacity = config.channel_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let (writes_tx, writes_rx) = mpsc::channel(capacity);
        let engine = Engine::new();
        let status = engine.subscribe();
        let cancel = CancellationToken::new();
        let writer_cancel = cancel.child_token();

        let writer = tokio::spawn(write_frames(link, writes_rx, writer_cancel.clone()));
        let task = tokio::spawn(run(
            events,
            rx,
            writes_tx,
            engine,
            cancel.clone(),
            writer_cancel,
        ));

        Self {
            tx,
            status,
            cancel,
            task,
            writer,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send a command and wait for its reply, returned as uppercase hex.
    ///
    /// Commands that expect no reply resolve with an empty string once written.
    pub async fn request(&self, command: DeviceCommand) -> Result<String> {
        self.request_with_timeout(command, self.config.request_timeout)
            .await
    }

    /// [`Session::request`] with an explicit reply timeout.
    pub async fn request_with_timeout(
        &self,
        command: DeviceCommand,
        timeout: Duration,
    ) -> Result<String> {
        let frame = command.frame(self.config.min_payload_bytes);
        let expect = command.expects_reply().then(|| Expectation {
            prefix: command.reply_prefix(),
            timeout,
        });
        debug!(command = command.name(), "issuing command");
        self.submit(frame, expect).await
    }

    /// Send an arbitrary tag and payload and wait for a reply with the same tag.
    pub async fn request_raw(
        &self,
        tag: &str,
        payload_hex: &str,
        min_payload_bytes: usize,
    ) -> Result<String> {
        let frame = build_command(tag, payload_hex, min_payload_bytes)?;
        let expect = Expectation {
            prefix: reply_prefix(frame[1]),
            timeout: self.config.request_timeout,
        };
        self.submit(frame, Some(expect)).await
    }

    /// Write a command without waiting for any reply.
    pub async fn send(&self, command: DeviceCommand) -> Result<()> {
        let frame = command.frame(self.config.min_payload_bytes);
        self.submit(frame, None).await.map(|_| ())
    }

    pub async fn query_volume(&self) -> Result<u8> {
        let update = self.query(DeviceCommand::QueryVolume).await?;
        update
            .volume
            .ok_or_else(|| PeerError::UnexpectedReply("volume reply carried no volume".into()))
    }

    pub async fn query_bluetooth_name(&self) -> Result<String> {
        let update = self.query(DeviceCommand::QueryBluetoothName).await?;
        update
            .bluetooth_name
            .ok_or_else(|| PeerError::UnexpectedReply("name reply carried no name".into()))
    }

    pub async fn query_capacity(&self) -> Result<Capacity> {
        let update = self.query(DeviceCommand::QueryCapacity).await?;
        update.capacity.ok_or_else(|| {
            PeerError::UnexpectedReply("capacity reply carried no capacity".into())
        })
    }

    /// Channels, show mode and device name.
    pub async fn query_parameters(&self) -> Result<StatusUpdate> {
        self.query(DeviceCommand::QueryParameters).await
    }

    /// Live action and eye icon.
    pub async fn query_live_mode(&self) -> Result<StatusUpdate> {
        self.query(DeviceCommand::QueryLiveMode).await
    }

    /// Raw firmware reply as hex; its layout is not decoded.
    pub async fn query_firmware(&self) -> Result<String> {
        self.request(DeviceCommand::QueryFirmware).await
    }

    pub async fn set_volume(&self, volume: u8) -> Result<()> {
        self.send(DeviceCommand::SetVolume(volume)).await
    }

    pub async fn play(&self) -> Result<()> {
        self.send(DeviceCommand::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(DeviceCommand::Pause).await
    }

    pub async fn enable_classic_bluetooth(&self) -> Result<()> {
        self.send(DeviceCommand::EnableClassicBluetooth).await
    }

    /// Snapshot of the last known device status.
    pub fn status(&self) -> DeviceStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to device status changes.
    pub fn subscribe(&self) -> watch::Receiver<DeviceStatus> {
        self.status.clone()
    }

    /// True once the session task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Stop the session. Pending requests fail as disconnected.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            warn!("session task ended abnormally: {err}");
        }
        if let Err(err) = self.writer.await {
            warn!("writer task ended abnormally: {err}");
        }
    }

    async fn query(&self, command: DeviceCommand) -> Result<StatusUpdate> {
        let reply = self.request(command).await?;
        Ok(decode(&hex::decode(&reply)?))
    }

    async fn submit(&self, frame: Bytes, expect: Option<Expectation>) -> Result<String> {
        self.enqueue(frame, expect)
            .await?
            .outcome(self.config.request_timeout)
            .await
    }

    /// Hand a frame to the session task; returns once the waiter is registered.
    async fn enqueue(&self, frame: Bytes, expect: Option<Expectation>) -> Result<Submitted> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request {
                frame,
                expect,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ended())?;
        reply_rx.await.map_err(|_| ended())
    }
}

fn ended() -> PeerError {
    PeerError::Disconnected("session ended".to_string())
}

/// The session loop.
///
/// Priority order: cancellation, link events, reply deadlines, caller requests.
async fn run(
    mut events: mpsc::Receiver<LinkEvent>,
    mut requests: mpsc::Receiver<Request>,
    writes: mpsc::Sender<WriteJob>,
    mut engine: Engine,
    cancel: CancellationToken,
    writer_cancel: CancellationToken,
) {
    loop {
        let deadline = engine.next_deadline();
        let wake_at = deadline.unwrap_or_else(|| Instant::now() + IDLE_TICK);

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                engine.on_disconnect("session shut down");
                break;
            }

            event = events.recv() => match event {
                Some(LinkEvent::Notification(bytes)) => {
                    engine.on_notification(&bytes);
                }
                Some(LinkEvent::Disconnected) | None => {
                    engine.on_disconnect("link lost");
                    break;
                }
            },

            _ = sleep_until(wake_at), if deadline.is_some() => {
                engine.expire(Instant::now());
                engine.prune_abandoned();
            }

            request = requests.recv() => match request {
                Some(request) => handle_request(request, &writes, &mut engine),
                None => {
                    debug!("all session handles dropped");
                    engine.on_disconnect("session dropped");
                    break;
                }
            },
        }
    }
    writer_cancel.cancel();
}

/// Register the reply expectation, then queue the write. Registering first
/// means a reply that races the write acknowledgement is still matched.
fn handle_request(request: Request, writes: &mpsc::Sender<WriteJob>, engine: &mut Engine) {
    let Request {
        frame,
        expect,
        reply,
    } = request;

    let pending = expect.map(|expect| engine.register(&expect.prefix, expect.timeout));
    let (ack, written) = oneshot::channel();

    if let Err(err) = writes.try_send(WriteJob { frame, ack }) {
        let (job, failure) = match err {
            mpsc::error::TrySendError::Full(job) => {
                (job, TransportError::Write("write queue full".to_string()))
            }
            mpsc::error::TrySendError::Closed(job) => (job, TransportError::Closed),
        };
        warn!("command not queued: {failure}");
        let _ = job.ack.send(Err(failure));
    }

    let _ = reply.send(Submitted {
        reply: pending,
        written,
    });
}

/// Write queued frames to the link in order until cancelled.
async fn write_frames<L: DeviceLink>(
    mut link: L,
    mut jobs: mpsc::Receiver<WriteJob>,
    cancel: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let WriteJob { frame, ack } = job;
        debug!(frame = %hex::encode_upper(&frame), "writing command");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = link.write(frame) => {
                if let Err(err) = &result {
                    warn!("command write failed: {err}");
                }
                let _ = ack.send(result);
            }
        }
    }
    debug!("writer stopped");
}
