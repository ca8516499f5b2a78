use std::fmt;

use adcp_client::ClientError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const USAGE: i32 = 64;
pub const DEVICE_ERROR: i32 = 65;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    let code = match &err {
        ClientError::Schema(_) => USAGE,
        ClientError::ResponseTimeout(_) => TIMEOUT,
        ClientError::Device(_) => DEVICE_ERROR,
        ClientError::Io(_)
        | ClientError::Frame(_)
        | ClientError::Handshake(_)
        | ClientError::Disconnected => FAILURE,
        ClientError::ExchangeInFlight
        | ClientError::State(_)
        | ClientError::ResponseTooShort { .. } => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
