use propwire_frame::build_command;

use crate::cmd::FrameArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = build_command(&args.tag, &args.payload, args.min_bytes)
        .map_err(|err| frame_error("invalid frame input", err))?;
    tracing::debug!(tag = %args.tag, len = frame.len(), "built frame");
    print_frame(&frame, "raw", format);
    Ok(SUCCESS)
}
