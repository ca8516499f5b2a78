use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use adcp_frame::{FrameError, FrameReader, FrameType};
use adcp_schema::{CommandRegistry, CommandSpec, ResponseKind};
use adcp_state::DeviceState;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::connector::ClientConfig;
use crate::correlator::Correlator;
use crate::error::{ClientError, Result};
use crate::snapshot::StateCell;
use crate::status::StatusCode;
use crate::timeout::effective_timeout;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State shared between the caller-facing client and its receiver thread.
struct Shared {
    writer: Mutex<TcpStream>,
    control: TcpStream,
    correlator: Correlator,
    state: StateCell,
    frames: Mutex<Vec<(FrameType, Sender<Bytes>)>>,
}

/// A connected instrument client.
///
/// Commands flow through [`execute`](Self::execute); the background
/// receiver thread keeps the latest [`DeviceState`] snapshot fresh and
/// wakes whichever caller is awaiting a response. Dropping the client
/// shuts the socket down, which deterministically ends the receiver.
pub struct Client {
    shared: Arc<Shared>,
    registry: Arc<CommandRegistry>,
    config: ClientConfig,
    receiver: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub(crate) fn spawn(
        stream: TcpStream,
        registry: Arc<CommandRegistry>,
        config: ClientConfig,
    ) -> Result<Self> {
        let reader_stream = stream.try_clone()?;
        let writer = stream.try_clone()?;

        let shared = Arc::new(Shared {
            writer: Mutex::new(writer),
            control: stream,
            correlator: Correlator::new(),
            state: StateCell::new(),
            frames: Mutex::new(Vec::new()),
        });

        let receiver = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name("adcp-recv".to_string())
                .spawn(move || receive_loop(&shared, reader_stream))?
        };

        Ok(Self {
            shared,
            registry,
            config,
            receiver: Some(receiver),
        })
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The most recent state snapshot, if any has been seen.
    pub fn latest_state(&self) -> Option<Arc<DeviceState>> {
        self.shared.state.latest()
    }

    /// Register for every future state snapshot.
    pub fn subscribe_state(&self) -> Receiver<Arc<DeviceState>> {
        self.shared.state.subscribe()
    }

    /// Register for raw payloads of one frame type (debug, data, or FFT).
    pub fn subscribe_frames(&self, frame_type: FrameType) -> Receiver<Bytes> {
        let (tx, rx) = channel();
        lock(&self.shared.frames).push((frame_type, tx));
        rx
    }

    /// Resolve, encode, send, and await one command line.
    ///
    /// Input errors are rejected before any byte is written. A non-OK
    /// device status is reported in the outcome, not as an error; only
    /// transport faults and timeouts fail the call.
    pub fn execute(&self, line: &str) -> Result<CommandOutcome> {
        let (spec, bytes) = self.registry.encode_line(line)?;
        let state = self.latest_state();
        let timeout = effective_timeout(spec, &bytes, state.as_deref(), self.config.response_timeout);

        debug!(command = %spec.name, ?timeout, "sending command");
        let payload = self.send_raw(&bytes, timeout)?;
        self.interpret(spec, payload)
    }

    /// Send pre-encoded command bytes and await the raw response payload.
    ///
    /// Fails with `ExchangeInFlight` while another command is outstanding;
    /// a timeout leaves the connection usable for the next command.
    pub fn send_raw(&self, bytes: &[u8], timeout: Duration) -> Result<Bytes> {
        let ticket = self.shared.correlator.begin()?;

        let written = {
            let mut writer = lock(&self.shared.writer);
            writer.write_all(bytes).and_then(|()| writer.flush())
        };
        if let Err(err) = written {
            self.shared.correlator.abandon(ticket);
            return Err(ClientError::Io(err));
        }

        self.shared.correlator.wait(ticket, timeout)
    }

    /// Execute `adc update state` and return the fresh snapshot.
    pub fn refresh_state(&self) -> Result<Arc<DeviceState>> {
        let outcome = self.execute("adc update state")?;
        match outcome.reply {
            CommandReply::State(state) => Ok(state),
            _ => Err(ClientError::Device(outcome.status)),
        }
    }

    /// Shut the connection down and wait for the receiver to exit.
    pub fn close(mut self) {
        self.shutdown();
        if let Some(handle) = self.receiver.take() {
            let _ = handle.join();
        }
    }

    fn shutdown(&self) {
        let _ = self.shared.control.shutdown(Shutdown::Both);
    }

    fn interpret(&self, spec: &CommandSpec, payload: Bytes) -> Result<CommandOutcome> {
        // Verbose-text responses carry no status byte at all.
        if spec.response == ResponseKind::Text {
            let text = String::from_utf8_lossy(&payload).into_owned();
            return Ok(CommandOutcome {
                command: spec.name.clone(),
                status: StatusCode::Ok,
                reply: CommandReply::Text(text),
                payload,
            });
        }

        let Some(&status_byte) = payload.first() else {
            return Err(ClientError::ResponseTooShort { needed: 1, got: 0 });
        };
        let status = StatusCode::from_byte(status_byte);
        let trailing = payload.slice(1..);

        let reply = match (status.is_ok(), spec.response) {
            (false, _) | (true, ResponseKind::Status | ResponseKind::Text) => {
                CommandReply::Ack { trailing }
            }
            (true, ResponseKind::Value32) => {
                if trailing.len() < 4 {
                    return Err(ClientError::ResponseTooShort {
                        needed: 5,
                        got: payload.len(),
                    });
                }
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&trailing[..4]);
                CommandReply::Value(ResponseValue(raw))
            }
            (true, ResponseKind::State) => {
                let state = Arc::new(DeviceState::decode(&trailing)?);
                self.shared.state.publish(Arc::clone(&state));
                CommandReply::State(state)
            }
        };

        Ok(CommandOutcome {
            command: spec.name.clone(),
            status,
            payload,
            reply,
        })
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The result of one executed command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Resolved command name.
    pub command: String,
    /// Device-reported status, surfaced verbatim.
    pub status: StatusCode,
    /// The complete raw response payload.
    pub payload: Bytes,
    /// The payload interpreted per the command's response kind.
    pub reply: CommandReply,
}

/// A response payload interpreted per the command's declared kind.
#[derive(Debug, Clone)]
pub enum CommandReply {
    /// Status byte plus whatever trailing bytes the command returned.
    Ack { trailing: Bytes },
    /// A fixed 4-byte little-endian value.
    Value(ResponseValue),
    /// A decoded state snapshot (also published to subscribers).
    State(Arc<DeviceState>),
    /// Bare ASCII text.
    Text(String),
}

/// Four little-endian value bytes whose signedness depends on the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseValue([u8; 4]);

impl ResponseValue {
    pub fn as_i32(self) -> i32 {
        i32::from_le_bytes(self.0)
    }

    pub fn as_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    pub fn bytes(self) -> [u8; 4] {
        self.0
    }
}

fn receive_loop(shared: &Shared, stream: TcpStream) {
    let mut reader = FrameReader::new(stream);
    loop {
        match reader.read_frame() {
            Ok(frame) => dispatch(shared, frame.frame_type, frame.payload),
            Err(FrameError::ConnectionClosed) => {
                debug!("connection closed, receiver exiting");
                break;
            }
            Err(err) => {
                warn!(%err, "receive path failed");
                break;
            }
        }
    }
}

fn dispatch(shared: &Shared, frame_type: FrameType, payload: Bytes) {
    match frame_type {
        FrameType::Response => shared.correlator.deliver(payload),
        FrameType::Status => match DeviceState::decode(&payload) {
            Ok(state) => shared.state.publish(Arc::new(state)),
            Err(err) => warn!(%err, "dropping undecodable status frame"),
        },
        other => {
            let mut subscribers = lock(&shared.frames);
            subscribers.retain(|(ty, tx)| *ty != other || tx.send(payload.clone()).is_ok());
        }
    }
}
