use propwire_frame::{decode, hex};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_fields, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = hex::decode(&hex::strip_whitespace(&args.hex))
        .map_err(|err| frame_error("invalid hex input", err))?;

    let update = decode(&bytes);
    if update.is_empty() {
        tracing::info!("notification carried no known status fields");
    }
    print_fields("field", &update, format);
    Ok(SUCCESS)
}
