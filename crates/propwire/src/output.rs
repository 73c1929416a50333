use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use propwire_frame::{hex, tag_name};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    command: &'a str,
    tag: String,
    tag_name: &'static str,
    length: usize,
    checksum: String,
    frame: String,
}

/// Print a built command frame.
pub fn print_frame(frame: &[u8], command: &str, format: OutputFormat) {
    let tag = frame.get(1).copied().unwrap_or_default();
    let checksum = frame.last().copied().unwrap_or_default();

    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                command,
                tag: format!("{tag:02X}"),
                tag_name: tag_name(tag),
                length: frame.len(),
                checksum: format!("{checksum:02X}"),
                frame: hex::encode_upper(frame),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "TAG", "LENGTH", "CRC", "FRAME"])
                .add_row(vec![
                    command.to_string(),
                    format!("{tag:02X} ({})", tag_name(tag)),
                    frame.len().to_string(),
                    format!("{checksum:02X}"),
                    hex::encode_upper(frame),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "command={} tag={:02X} ({}) len={} crc={:02X} frame={}",
                command,
                tag,
                tag_name(tag),
                frame.len(),
                checksum,
                hex::encode_upper(frame)
            );
        }
        OutputFormat::Raw => print_raw(frame),
    }
}

/// Print any serializable status view as field/value pairs.
///
/// Used for both sparse decoder updates and full device status.
pub fn print_fields<T: Serialize>(title: &str, value: &T, format: OutputFormat) {
    let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);

    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            println!("{json}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![title.to_uppercase(), "VALUE".to_string()]);
            for (field, value) in field_rows(&json) {
                table.add_row(vec![field, value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let rows: Vec<String> = field_rows(&json)
                .into_iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect();
            println!("{title}: {}", rows.join(" "));
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn field_rows(json: &serde_json::Value) -> Vec<(String, String)> {
    let Some(object) = json.as_object() else {
        return Vec::new();
    };
    object
        .iter()
        .map(|(field, value)| {
            let rendered = match value {
                serde_json::Value::Null => "-".to_string(),
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (field.clone(), rendered)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_rows_render_nulls_and_strings() {
        let rows = field_rows(&serde_json::json!({
            "bluetooth_name": "Bob",
            "volume": null,
            "channels": [1, 2, 3, 4, 5, 6],
        }));
        assert!(rows.contains(&("bluetooth_name".to_string(), "Bob".to_string())));
        assert!(rows.contains(&("volume".to_string(), "-".to_string())));
        assert!(rows.contains(&("channels".to_string(), "[1,2,3,4,5,6]".to_string())));
    }

    #[test]
    fn field_rows_of_non_object_is_empty() {
        assert!(field_rows(&serde_json::json!(5)).is_empty());
    }
}
