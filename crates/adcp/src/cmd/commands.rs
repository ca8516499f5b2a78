use crate::cmd::{CommandsArgs, Context};
use crate::exit::{CliResult, SUCCESS};
use crate::output::print_commands;

pub fn run(_args: CommandsArgs, ctx: Context) -> CliResult<i32> {
    print_commands(&ctx.registry, ctx.format);
    Ok(SUCCESS)
}
