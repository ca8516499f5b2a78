use std::collections::HashSet;
use std::path::Path;

use adcp_wire::{parse_number, ScalarType};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::spec::{ArgKind, ArgumentSpec, CommandSpec, ResponseKind, TimeoutKind};

/// Raw schema entry as it appears in the protocol JSON.
#[derive(Debug, Deserialize)]
struct RawEntry {
    command: String,
    #[serde(default)]
    help: Option<String>,
    #[serde(default = "default_show")]
    show: bool,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    timeout: Option<String>,
    #[serde(default)]
    args: Vec<RawArg>,
}

#[derive(Debug, Deserialize)]
struct RawArg {
    #[serde(default)]
    help: Option<String>,
    #[serde(rename = "type", default)]
    ty: Option<String>,
    #[serde(default)]
    range: Option<RawRange>,
    #[serde(rename = "in", default)]
    choices: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawRange {
    from: i64,
    to: i64,
}

fn default_show() -> bool {
    true
}

/// The in-memory catalog of invokable commands.
///
/// Built once from a protocol schema; resolution and encoding are pure
/// functions of the catalog and the input text.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
}

impl CommandRegistry {
    /// Build a registry from a schema document.
    ///
    /// Fails fast on anything the catalog cannot represent: bad byte
    /// literals, unknown argument types, unknown response/timeout tags,
    /// inverted ranges, duplicate names.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let groups: Map<String, Value> = serde_json::from_str(json)?;

        let mut commands = Vec::new();
        let mut names = HashSet::new();

        for (prefix_literal, group) in &groups {
            let prefix = parse_byte_literal(prefix_literal)?;
            let group = group.as_object().ok_or_else(|| {
                SchemaError::LoadFailed(format!(
                    "prefix {prefix_literal}: expected an object of commands"
                ))
            })?;

            for (command_literal, entry) in group {
                let command = parse_byte_literal(command_literal)?;
                let raw: RawEntry = serde_json::from_value(entry.clone())?;

                if !raw.show {
                    debug!(name = %raw.command, "skipping hidden schema entry");
                    continue;
                }
                if !names.insert(raw.command.clone()) {
                    return Err(SchemaError::DuplicateCommand(raw.command));
                }

                commands.push(build_spec(prefix, command, raw)?);
            }
        }

        debug!(count = commands.len(), "command registry built");
        Ok(Self { commands })
    }

    /// Load a schema from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// All commands in registration order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Look up a command by its exact name.
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|spec| spec.name == name)
    }

    /// Resolve free-text input to a command and its raw argument text.
    ///
    /// Iterates in registration order and takes the first command whose
    /// name is a string prefix of the input. This deliberately favors
    /// registration order over longest-match; schema ordering is part of
    /// the contract.
    pub fn resolve<'a>(&self, input: &'a str) -> Option<(&CommandSpec, &'a str)> {
        self.commands
            .iter()
            .find(|spec| input.starts_with(&spec.name))
            .map(|spec| (spec, input[spec.name.len()..].trim()))
    }

    /// Resolve input and encode it to the full wire payload.
    pub fn encode_line(&self, input: &str) -> Result<(&CommandSpec, Vec<u8>)> {
        let (spec, raw_args) = self
            .resolve(input)
            .ok_or_else(|| SchemaError::UnknownCommand(input.to_string()))?;
        let bytes = spec.command_bytes(raw_args)?;
        Ok((spec, bytes))
    }

    /// Commands whose name starts with `prefix`, plus the common name
    /// continuation shared by all of them.
    ///
    /// Uses the same registration ordering as [`resolve`](Self::resolve),
    /// so completion and resolution can never disagree on ties.
    pub fn completions(&self, prefix: &str) -> (Vec<&CommandSpec>, String) {
        let matches: Vec<&CommandSpec> = self
            .commands
            .iter()
            .filter(|spec| spec.name.starts_with(prefix))
            .collect();

        let Some(first) = matches.first() else {
            return (matches, String::new());
        };

        let mut common = first.name[prefix.len()..].to_string();
        for spec in &matches[1..] {
            let rest = &spec.name[prefix.len()..];
            let shared = common
                .bytes()
                .zip(rest.bytes())
                .take_while(|(a, b)| a == b)
                .count();
            common.truncate(shared);
        }

        (matches, common)
    }
}

fn parse_byte_literal(literal: &str) -> Result<u8> {
    let value = parse_number(literal)
        .map_err(|_| SchemaError::InvalidByteLiteral(literal.to_string()))?;
    u8::try_from(value).map_err(|_| SchemaError::InvalidByteLiteral(literal.to_string()))
}

fn build_spec(prefix: u8, command: u8, raw: RawEntry) -> Result<CommandSpec> {
    let name = raw.command;

    let response = ResponseKind::parse(&name, raw.response.as_deref())?;
    let timeout = TimeoutKind::parse(&name, raw.timeout.as_deref())?;

    let mut args = Vec::with_capacity(raw.args.len());
    for arg in raw.args {
        let ty = ScalarType::parse(arg.ty.as_deref().unwrap_or("u8")).map_err(|source| {
            SchemaError::BadArgumentType {
                name: name.clone(),
                source,
            }
        })?;

        let kind = if let Some(range) = arg.range {
            let (lo, hi) = (i128::from(range.from), i128::from(range.to));
            if lo > hi {
                return Err(SchemaError::InvalidRange {
                    name,
                    from: lo,
                    to: hi,
                });
            }
            ArgKind::Range { lo, hi }
        } else if let Some(choices) = arg.choices {
            let mut mapping = Vec::with_capacity(choices.len());
            for (key, value) in choices {
                let value = value.as_i64().ok_or_else(|| {
                    SchemaError::LoadFailed(format!(
                        "command '{name}': choice '{key}' must map to an integer"
                    ))
                })?;
                mapping.push((key, i128::from(value)));
            }
            ArgKind::Choice(mapping)
        } else {
            ArgKind::Number
        };

        args.push(ArgumentSpec {
            help: arg.help,
            ty,
            kind,
        });
    }

    Ok(CommandSpec {
        prefix,
        command,
        name,
        help: raw.help,
        response,
        timeout,
        args,
    })
}
