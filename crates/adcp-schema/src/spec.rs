use adcp_wire::{parse_number, ScalarType};

use crate::error::{Result, SchemaError};

/// How an argument's value is constrained before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    /// Integer bounded to an inclusive range.
    Range { lo: i128, hi: i128 },
    /// Token mapped through a fixed name → integer set, in schema order.
    Choice(Vec<(String, i128)>),
    /// Plain integer, bounded only by the wire type's envelope.
    Number,
}

/// One positional argument of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub help: Option<String>,
    pub ty: ScalarType,
    pub kind: ArgKind,
}

impl ArgumentSpec {
    /// Resolve a single input token to its integer value.
    fn resolve(&self, index: usize, token: &str) -> Result<i128> {
        match &self.kind {
            ArgKind::Range { lo, hi } => {
                let value = parse_number(token).map_err(|_| SchemaError::NotANumber {
                    index,
                    token: token.to_string(),
                })?;
                if value < *lo || value > *hi {
                    return Err(SchemaError::OutOfRange {
                        index,
                        value,
                        lo: *lo,
                        hi: *hi,
                    });
                }
                Ok(value)
            }
            ArgKind::Choice(choices) => choices
                .iter()
                .find(|(key, _)| key == token)
                .map(|(_, value)| *value)
                .ok_or_else(|| SchemaError::NotInSet {
                    index,
                    token: token.to_string(),
                }),
            ArgKind::Number => parse_number(token).map_err(|_| SchemaError::NotANumber {
                index,
                token: token.to_string(),
            }),
        }
    }

    /// One-line constraint description for usage output.
    pub fn constraint(&self) -> String {
        match &self.kind {
            ArgKind::Range { lo, hi } => format!("range {lo} to {hi} (both incl.)"),
            ArgKind::Choice(choices) => {
                let keys: Vec<&str> = choices.iter().map(|(key, _)| key.as_str()).collect();
                format!("one of {{{}}}", keys.join(", "))
            }
            ArgKind::Number => {
                let sign = if self.ty.signed { "signed" } else { "unsigned" };
                format!("{sign} {}-byte number", self.ty.width.bytes())
            }
        }
    }
}

/// How a command's response payload is interpreted.
///
/// A closed set selected by the schema entry's `response` field and
/// resolved once at registry build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Status byte, optionally followed by raw trailing bytes.
    #[default]
    Status,
    /// Status byte followed by exactly four little-endian value bytes.
    Value32,
    /// Status byte followed by a device-state record.
    State,
    /// Bare ASCII text, no status byte.
    Text,
}

impl ResponseKind {
    pub(crate) fn parse(name: &str, tag: Option<&str>) -> Result<Self> {
        match tag {
            None | Some("status") => Ok(ResponseKind::Status),
            Some("value32") => Ok(ResponseKind::Value32),
            Some("state") => Ok(ResponseKind::State),
            Some("text") => Ok(ResponseKind::Text),
            Some(other) => Err(SchemaError::UnknownResponseKind {
                name: name.to_string(),
                tag: other.to_string(),
            }),
        }
    }
}

/// How a command's response deadline is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutKind {
    /// The configured response timeout.
    #[default]
    Fixed,
    /// Extended by the target measurement's averaging at the current
    /// samplerate.
    OneShot,
    /// Extended by the calibration sample count at the current samplerate.
    Calibration,
}

impl TimeoutKind {
    pub(crate) fn parse(name: &str, tag: Option<&str>) -> Result<Self> {
        match tag {
            None | Some("fixed") => Ok(TimeoutKind::Fixed),
            Some("oneshot") => Ok(TimeoutKind::OneShot),
            Some("calibration") => Ok(TimeoutKind::Calibration),
            Some(other) => Err(SchemaError::UnknownTimeoutKind {
                name: name.to_string(),
                tag: other.to_string(),
            }),
        }
    }
}

/// One invokable command: identity, name, and typed argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub prefix: u8,
    pub command: u8,
    pub name: String,
    pub help: Option<String>,
    pub response: ResponseKind,
    pub timeout: TimeoutKind,
    pub args: Vec<ArgumentSpec>,
}

impl CommandSpec {
    /// Protocol identity of this command.
    pub fn id(&self) -> (u8, u8) {
        (self.prefix, self.command)
    }

    /// Validate and encode free-text arguments into wire bytes.
    ///
    /// Tokens are whitespace-split and matched positionally; every value is
    /// checked against its constraint and its bit-width envelope before any
    /// byte is produced.
    pub fn encode_args(&self, raw: &str) -> Result<Vec<u8>> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() != self.args.len() {
            return Err(SchemaError::ArgumentCount {
                expected: self.args.len(),
                given: tokens.len(),
            });
        }

        let mut out = Vec::new();
        for (i, (arg, token)) in self.args.iter().zip(&tokens).enumerate() {
            let index = i + 1;
            let value = arg.resolve(index, token)?;
            let bytes = arg
                .ty
                .encode(value)
                .map_err(|_| SchemaError::ValueOutOfBounds {
                    index,
                    value,
                    ty: arg.ty,
                })?;
            out.extend_from_slice(&bytes);
        }
        Ok(out)
    }

    /// The full wire payload: `[prefix][command][encoded arguments…]`.
    pub fn command_bytes(&self, raw_args: &str) -> Result<Vec<u8>> {
        let mut out = vec![self.prefix, self.command];
        out.extend(self.encode_args(raw_args)?);
        Ok(out)
    }

    /// Printable usage text with per-argument constraints.
    pub fn usage(&self) -> String {
        if self.args.is_empty() {
            return format!("Usage: {}", self.name);
        }
        let mut lines = vec![format!("Usage: {}", self.name)];
        for arg in &self.args {
            lines.push(format!(
                "  <{}: {}>",
                arg.help.as_deref().unwrap_or("not documented"),
                arg.constraint()
            ));
        }
        lines.join("\n")
    }
}
