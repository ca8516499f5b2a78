use adcp_client::ConnectionRole;
use tracing::warn;

use crate::cmd::{Context, RunArgs};
use crate::exit::{client_error, CliResult, DEVICE_ERROR, SUCCESS};
use crate::output::print_outcome;

pub fn run(args: RunArgs, ctx: Context) -> CliResult<i32> {
    let line = args.line.join(" ");
    let format = ctx.format;
    let client = ctx.connect(ConnectionRole::STATUS)?;

    // A current snapshot lets long-running commands size their timeout.
    if !args.no_state_query {
        if let Err(err) = client.refresh_state() {
            warn!(%err, "initial state query failed");
        }
    }

    let outcome = client
        .execute(&line)
        .map_err(|err| client_error("command failed", err))?;
    print_outcome(&outcome, format);

    let code = if outcome.status.is_ok() {
        SUCCESS
    } else {
        DEVICE_ERROR
    };
    client.close();
    Ok(code)
}
