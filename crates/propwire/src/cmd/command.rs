use propwire_peer::DeviceCommand;

use crate::cmd::CommandArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: CommandArgs, format: OutputFormat) -> CliResult<i32> {
    let command = DeviceCommand::from(args.command);
    let frame = command.frame(args.min_bytes);
    print_frame(&frame, command.name(), format);
    Ok(SUCCESS)
}
