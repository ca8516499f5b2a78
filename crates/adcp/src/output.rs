use std::io::IsTerminal;

use adcp_client::{CommandOutcome, CommandReply};
use adcp_schema::CommandRegistry;
use adcp_state::DeviceState;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde_json::json;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Text,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_outcome(outcome: &CommandOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", outcome_json(outcome)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "STATUS", "RESULT"]);
            table.add_row(vec![
                outcome.command.clone(),
                outcome.status.to_string(),
                reply_summary(&outcome.reply),
            ]);
            println!("{table}");
            if let CommandReply::State(state) = &outcome.reply {
                print_state(state, format);
            }
        }
        OutputFormat::Text => {
            match &outcome.reply {
                CommandReply::Text(text) => println!("{text}"),
                CommandReply::State(state) => print_state(state, format),
                reply if outcome.status.is_ok() => match reply {
                    CommandReply::Value(value) => println!("Result: {}", value.as_i32()),
                    CommandReply::Ack { trailing } if !trailing.is_empty() => {
                        println!("OK ({})", hex(trailing))
                    }
                    _ => println!("OK"),
                },
                _ => println!("Error: {}", outcome.status),
            };
        }
    }
}

pub fn print_state(state: &DeviceState, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", state_json(state)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (field, value) in state_fields(state) {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");

            if state.measurement_count() > 0 {
                let mut table = new_table(vec![
                    "ID", "INPUTS", "ENABLED", "AVERAGING", "FFT", "LENGTH", "WINDOW",
                ]);
                for m in state.measurements() {
                    table.add_row(vec![
                        m.id.to_string(),
                        format!("{} {}", m.positive_pin, m.negative_pin),
                        m.enabled.to_string(),
                        m.averaging.to_string(),
                        m.fft_enabled.to_string(),
                        m.fft_length.to_string(),
                        m.fft_window.to_string(),
                    ]);
                }
                println!("{table}");
            }
        }
        OutputFormat::Text => {
            for (field, value) in state_fields(state) {
                println!("{field}: {value}");
            }
            for m in state.measurements() {
                println!(
                    "measurement {}: inputs {} {}, enabled {}, averaging {}, fft {} (length {}, {})",
                    m.id,
                    m.positive_pin,
                    m.negative_pin,
                    m.enabled,
                    m.averaging,
                    m.fft_enabled,
                    m.fft_length,
                    m.fft_window
                );
            }
        }
    }
}

pub fn print_commands(registry: &CommandRegistry, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let commands: Vec<_> = registry
                .commands()
                .iter()
                .map(|spec| {
                    json!({
                        "name": spec.name,
                        "prefix": spec.prefix,
                        "command": spec.command,
                        "help": spec.help,
                        "usage": spec.usage(),
                    })
                })
                .collect();
            println!("{}", json!({ "commands": commands }));
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "ID", "HELP"]);
            for spec in registry.commands() {
                table.add_row(vec![
                    spec.name.clone(),
                    format!("{:#04x} {:#04x}", spec.prefix, spec.command),
                    spec.help.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Text => {
            for spec in registry.commands() {
                println!("{}", spec.usage());
            }
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn reply_summary(reply: &CommandReply) -> String {
    match reply {
        CommandReply::Ack { trailing } if trailing.is_empty() => String::new(),
        CommandReply::Ack { trailing } => hex(trailing),
        CommandReply::Value(value) => value.as_i32().to_string(),
        CommandReply::State(_) => "<state>".to_string(),
        CommandReply::Text(text) => text.clone(),
    }
}

fn outcome_json(outcome: &CommandOutcome) -> serde_json::Value {
    let mut value = json!({
        "command": outcome.command,
        "status": outcome.status.name(),
        "ok": outcome.status.is_ok(),
    });
    let extra = match &outcome.reply {
        CommandReply::Ack { trailing } if trailing.is_empty() => json!({}),
        CommandReply::Ack { trailing } => json!({ "trailing": hex(trailing) }),
        CommandReply::Value(v) => json!({ "value": v.as_i32(), "value_unsigned": v.as_u32() }),
        CommandReply::State(state) => json!({ "state": state_json(state) }),
        CommandReply::Text(text) => json!({ "text": text }),
    };
    if let (Some(obj), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        for (key, val) in extra {
            obj.insert(key.clone(), val.clone());
        }
    }
    value
}

fn state_fields(state: &DeviceState) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("state", state.started.to_string()),
        ("internal reference", state.internal_reference.to_string()),
        ("samplerate", state.samplerate.to_string()),
        ("filter", state.filter.to_string()),
        ("pga", state.pga.to_string()),
        ("v_ref", format!("{} (10 nV units)", state.v_ref)),
        (
            "v_ref inputs",
            format!("{} {}", state.v_ref_positive_pin, state.v_ref_negative_pin),
        ),
        (
            "cal offset",
            format!(
                "{} (diff: {:.2} nV)",
                state.calibration_offset,
                state.offset_error_nanovolts()
            ),
        ),
        (
            "cal scale",
            format!(
                "{} (diff: {})",
                state.calibration_scale,
                state.format_scale_error()
            ),
        ),
        ("measurements", state.measurement_count().to_string()),
    ];
    if state.slow_connection {
        fields.push(("warning", "measurement stopped: slow connection".to_string()));
    }
    if state.adc_reset {
        fields.push((
            "warning",
            "ADC was reset; reconfigure with \"adc reset\"".to_string(),
        ));
    }
    fields
}

fn state_json(state: &DeviceState) -> serde_json::Value {
    let measurements: Vec<_> = state
        .measurements()
        .map(|m| {
            json!({
                "id": m.id,
                "positive_pin": m.positive_pin,
                "negative_pin": m.negative_pin,
                "enabled": m.enabled,
                "averaging": m.averaging,
                "fft_enabled": m.fft_enabled,
                "fft_length": m.fft_length,
                "fft_window": m.fft_window.name(),
            })
        })
        .collect();

    json!({
        "started": state.started.name(),
        "internal_reference": state.internal_reference,
        "slow_connection": state.slow_connection,
        "adc_reset": state.adc_reset,
        "samplerate_sps": state.samplerate.sps(),
        "filter": state.filter.name(),
        "pga": state.pga.to_string(),
        "v_ref": state.v_ref,
        "v_ref_positive_pin": state.v_ref_positive_pin,
        "v_ref_negative_pin": state.v_ref_negative_pin,
        "calibration_offset": state.calibration_offset,
        "calibration_scale": state.calibration_scale,
        "offset_error_nv": state.offset_error_nanovolts(),
        "scale_error": state.scale_error(),
        "measurements": measurements,
    })
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
