mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "propwire", version, about = "BLE prop command protocol CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log filter directives, e.g. `propwire_peer=trace`. Overrides --log-level.
    #[arg(long, value_name = "DIRECTIVES", env = "PROPWIRE_LOG", global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.log_filter.as_deref());

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::CatalogCommand;

    #[test]
    fn parses_frame_subcommand() {
        let cli = Cli::try_parse_from(["propwire", "frame", "E5", "--min-bytes", "8"])
            .expect("frame args should parse");

        match cli.command {
            Command::Frame(args) => {
                assert_eq!(args.tag, "E5");
                assert_eq!(args.payload, "");
                assert_eq!(args.min_bytes, 8);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_catalog_command_with_value() {
        let cli = Cli::try_parse_from(["propwire", "command", "set-volume", "50"])
            .expect("command args should parse");

        match cli.command {
            Command::Command(args) => {
                assert!(matches!(args.command, CatalogCommand::SetVolume { value: 50 }));
                assert_eq!(args.min_bytes, propwire_peer::DEFAULT_MIN_PAYLOAD_BYTES);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let err = Cli::try_parse_from(["propwire", "command", "set-volume", "300"])
            .expect_err("volume above 255 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_simulate_subcommand() {
        let cli = Cli::try_parse_from([
            "propwire",
            "--format",
            "json",
            "simulate",
            "--timeout",
            "500ms",
            "--volume",
            "10",
        ])
        .expect("simulate args should parse");
        assert!(matches!(cli.command, Command::Simulate(_)));
    }

    #[test]
    fn parses_log_filter_flag() {
        let cli = Cli::try_parse_from([
            "propwire",
            "--log-filter",
            "propwire_peer=trace",
            "version",
        ])
        .expect("log filter should parse");
        assert_eq!(cli.log_filter.as_deref(), Some("propwire_peer=trace"));
    }
}
