use adcp_client::ConnectionRole;

use crate::cmd::{Context, StateArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::print_state;

pub fn run(_args: StateArgs, ctx: Context) -> CliResult<i32> {
    let format = ctx.format;
    let client = ctx.connect(ConnectionRole::STATUS)?;

    let state = client
        .refresh_state()
        .map_err(|err| client_error("state query failed", err))?;
    print_state(&state, format);

    client.close();
    Ok(SUCCESS)
}
