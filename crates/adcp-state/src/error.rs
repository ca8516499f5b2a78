/// Errors raised while decoding a device-state record.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    /// The payload is shorter than the declared layout requires.
    #[error("state record too short: need {needed} bytes, got {got}")]
    InsufficientData { needed: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, StateError>;
