use std::time::Duration;

use adcp_schema::{CommandSpec, TimeoutKind};
use adcp_state::DeviceState;

/// Samples taken by each calibration sequence.
const CALIBRATION_SAMPLES: f64 = 16.0;

/// Compute the response window for one command.
///
/// Long-running commands extend the configured timeout from known device
/// parameters: an averaged one-shot takes `averaging / samplerate` seconds
/// of sampling, a calibration sequence a fixed sample count. Both get a 2x
/// buffer plus one second, and neither ever shrinks below `base`. Without a
/// current snapshot the base timeout stands.
pub fn effective_timeout(
    spec: &CommandSpec,
    command_bytes: &[u8],
    state: Option<&DeviceState>,
    base: Duration,
) -> Duration {
    let Some(state) = state else {
        return base;
    };

    let extended = match spec.timeout {
        TimeoutKind::Fixed => return base,
        TimeoutKind::OneShot => {
            // The measurement id is the first argument byte.
            let Some(&id) = command_bytes.get(2) else {
                return base;
            };
            let Some(measurement) = state.measurement(id) else {
                return base;
            };
            2.0 * f64::from(measurement.averaging) / state.samplerate.sps() + 1.0
        }
        TimeoutKind::Calibration => 2.0 * CALIBRATION_SAMPLES / state.samplerate.sps() + 1.0,
    };

    base.max(Duration::from_secs_f64(extended))
}
