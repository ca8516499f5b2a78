use adcp_wire::ScalarType;

/// Errors raised while building the registry or encoding command input.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file or document could not be loaded.
    #[error("failed to load protocol schema: {0}")]
    LoadFailed(String),

    /// The schema is not valid JSON or has the wrong shape.
    #[error("invalid schema json: {0}")]
    Json(#[from] serde_json::Error),

    /// A prefix or command byte literal did not parse to a byte.
    #[error("invalid byte literal '{0}' in schema")]
    InvalidByteLiteral(String),

    /// The entry's response tag is not one of the known kinds.
    #[error("command '{name}': unknown response kind '{tag}'")]
    UnknownResponseKind { name: String, tag: String },

    /// The entry's timeout tag is not one of the known kinds.
    #[error("command '{name}': unknown timeout kind '{tag}'")]
    UnknownTimeoutKind { name: String, tag: String },

    /// An argument's type token was not recognized.
    #[error("command '{name}': {source}")]
    BadArgumentType {
        name: String,
        source: adcp_wire::WireError,
    },

    /// The same command name appears twice in the schema.
    #[error("command '{0}' registered twice")]
    DuplicateCommand(String),

    /// A range constraint with `from` above `to`.
    #[error("command '{name}': range {from}..={to} is inverted")]
    InvalidRange { name: String, from: i128, to: i128 },

    /// No registered command name prefixes the input.
    #[error("no command matches '{0}'")]
    UnknownCommand(String),

    /// Wrong number of argument tokens.
    #[error("expected {expected} arguments, {given} given")]
    ArgumentCount { expected: usize, given: usize },

    /// An argument token is not an integer in any supported notation.
    #[error("argument {index} ('{token}') is not a number")]
    NotANumber { index: usize, token: String },

    /// A range-constrained argument value lies outside its bounds.
    #[error("argument {index} (value {value}) is out of range {lo}..={hi}")]
    OutOfRange {
        index: usize,
        value: i128,
        lo: i128,
        hi: i128,
    },

    /// An enumerated argument token is not one of the allowed keys.
    #[error("argument {index} ('{token}') is not in the allowed set")]
    NotInSet { index: usize, token: String },

    /// A resolved value exceeds its argument's bit-width envelope.
    #[error("argument {index} (value {value}) does not fit {ty}")]
    ValueOutOfBounds {
        index: usize,
        value: i128,
        ty: ScalarType,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
