use std::time::Duration;

use adcp_client::{connect_with_config, Client, ClientConfig, ConnectionRole};
use adcp_schema::CommandRegistry;
use clap::{Args, Subcommand};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod commands;
pub mod run;
pub mod state;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute one instrument command line.
    Run(RunArgs),
    /// Query and display the instrument state.
    State(StateArgs),
    /// List the registered commands.
    Commands(CommandsArgs),
    /// Stream state snapshots as they arrive.
    Watch(WatchArgs),
}

/// Everything resolved from the global flags.
pub struct Context {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub registry: CommandRegistry,
    pub format: OutputFormat,
}

impl Context {
    pub fn connect(&self, role: ConnectionRole) -> CliResult<Client> {
        let config = ClientConfig {
            connect_timeout: self.timeout,
            response_timeout: self.timeout,
        };
        connect_with_config(
            (self.host.as_str(), self.port),
            role,
            self.registry.clone(),
            config,
        )
        .map_err(|err| client_error("connect failed", err))
    }
}

pub fn run(command: Command, ctx: Context) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, ctx),
        Command::State(args) => state::run(args, ctx),
        Command::Commands(args) => commands::run(args, ctx),
        Command::Watch(args) => watch::run(args, ctx),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The command line to execute, e.g. `adc update state`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub line: Vec<String>,
    /// Skip the initial state query (disables extended timeouts).
    #[arg(long)]
    pub no_state_query: bool,
}

#[derive(Args, Debug, Default)]
pub struct StateArgs {}

#[derive(Args, Debug, Default)]
pub struct CommandsArgs {}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Exit after N snapshots.
    #[arg(long)]
    pub count: Option<usize>,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
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
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
