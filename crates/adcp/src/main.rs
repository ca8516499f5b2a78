mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use adcp_schema::CommandRegistry;
use clap::Parser;

use crate::cmd::{parse_duration, Command, Context};
use crate::exit::{CliError, CliResult, INTERNAL, USAGE};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "adcp", version, about = "ADCP instrument control CLI")]
struct Cli {
    /// Instrument host.
    #[arg(long, env = "ADCP_HOST", default_value = "192.168.2.1", global = true)]
    host: String,

    /// Instrument port.
    #[arg(long, env = "ADCP_PORT", default_value_t = 80, global = true)]
    port: u16,

    /// Connect and response timeout (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION", default_value = "5s", global = true)]
    timeout: String,

    /// Protocol schema file overriding the embedded one.
    #[arg(long, value_name = "FILE", global = true)]
    schema: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    match run_cli(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

fn run_cli(cli: Cli) -> CliResult<i32> {
    let timeout = parse_duration(&cli.timeout)?;

    let registry = match &cli.schema {
        Some(path) => CommandRegistry::from_file(path)
            .map_err(|err| CliError::new(USAGE, format!("schema: {err}")))?,
        None => adcp::default_registry()
            .map_err(|err| CliError::new(INTERNAL, format!("embedded schema: {err}")))?,
    };

    let ctx = Context {
        host: cli.host,
        port: cli.port,
        timeout,
        registry,
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
    };
    cmd::run(cli.command, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "adcp",
            "--host",
            "10.0.0.2",
            "--port",
            "8080",
            "run",
            "adc",
            "update",
            "state",
        ])
        .unwrap();

        assert_eq!(cli.host, "10.0.0.2");
        assert_eq!(cli.port, 8080);
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.line, ["adc", "update", "state"]);
    }

    #[test]
    fn parses_watch_with_count() {
        let cli = Cli::try_parse_from(["adcp", "watch", "--count", "3"]).unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch subcommand");
        };
        assert_eq!(args.count, Some(3));
    }

    #[test]
    fn run_requires_a_command_line() {
        assert!(Cli::try_parse_from(["adcp", "run"]).is_err());
    }
}
