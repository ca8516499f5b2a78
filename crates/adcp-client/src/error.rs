use crate::status::StatusCode;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Frame-level error on the receive path.
    #[error("frame error: {0}")]
    Frame(#[from] adcp_frame::FrameError),

    /// Command resolution or argument encoding failed; nothing was sent.
    #[error("command error: {0}")]
    Schema(#[from] adcp_schema::SchemaError),

    /// A state payload could not be decoded.
    #[error("state decode error: {0}")]
    State(#[from] adcp_state::StateError),

    /// An I/O error on the socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection handshake was rejected.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// A command is already awaiting its response on this connection.
    #[error("a command is already awaiting its response")]
    ExchangeInFlight,

    /// No response arrived within the command's window.
    #[error("no response within {0:?}")]
    ResponseTimeout(std::time::Duration),

    /// The connection was closed.
    #[error("connection closed")]
    Disconnected,

    /// The response payload is shorter than its kind requires.
    #[error("response too short: need {needed} bytes, got {got}")]
    ResponseTooShort { needed: usize, got: usize },

    /// The device reported a non-OK status where data was required.
    #[error("device reported {0}")]
    Device(StatusCode),
}

pub type Result<T> = std::result::Result<T, ClientError>;
