use crate::scalar::ScalarType;

/// Errors that can occur while encoding or decoding wire scalars.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    /// The requested width is not one of 8, 16, 32, or 64 bits.
    #[error("unsupported scalar width: {0} bits")]
    UnsupportedWidth(u32),

    /// A scalar type token (e.g. from a schema file) was not recognized.
    #[error("unknown scalar type '{0}'")]
    UnknownType(String),

    /// The value does not fit the scalar's signed/unsigned envelope.
    #[error("value {value} does not fit in {ty}")]
    ValueOutOfBounds { value: i128, ty: ScalarType },

    /// Not enough bytes remain to decode the scalar.
    #[error("need {needed} bytes to decode {ty}, got {got}")]
    InsufficientBytes {
        ty: ScalarType,
        needed: usize,
        got: usize,
    },

    /// The token is not an integer in any supported notation.
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, WireError>;
