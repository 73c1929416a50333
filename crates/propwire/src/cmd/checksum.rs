use propwire_frame::{checksum, hex};
use serde::Serialize;

use crate::cmd::ChecksumArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_fields, print_raw, OutputFormat};

#[derive(Serialize)]
struct ChecksumOutput {
    input: String,
    length: usize,
    checksum: String,
}

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = hex::decode(&hex::strip_whitespace(&args.hex))
        .map_err(|err| frame_error("invalid hex input", err))?;
    let crc = checksum(&bytes);

    match format {
        OutputFormat::Raw => print_raw(&[crc]),
        _ => print_fields(
            "checksum",
            &ChecksumOutput {
                input: hex::encode_upper(&bytes),
                length: bytes.len(),
                checksum: format!("{crc:02X}"),
            },
            format,
        ),
    }
    Ok(SUCCESS)
}
