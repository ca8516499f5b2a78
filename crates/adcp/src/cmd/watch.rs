use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

use adcp_client::ConnectionRole;

use crate::cmd::{Context, WatchArgs};
use crate::exit::{CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::print_state;

pub fn run(args: WatchArgs, ctx: Context) -> CliResult<i32> {
    let format = ctx.format;
    let client = ctx.connect(ConnectionRole::STATUS)?;
    let updates = client.subscribe_state();

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .map_err(|err| CliError::new(INTERNAL, format!("signal handler: {err}")))?;
    }

    let mut seen = 0usize;
    while !stop.load(Ordering::SeqCst) {
        match updates.recv_timeout(Duration::from_millis(250)) {
            Ok(state) => {
                print_state(&state, format);
                seen += 1;
                if args.count.is_some_and(|count| seen >= count) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(CliError::new(FAILURE, "connection closed"));
            }
        }
    }

    client.close();
    Ok(SUCCESS)
}
