#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn propwire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_propwire"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .args(args)
        .env_remove("PROPWIRE_TIMEOUT")
        .output()
        .expect("propwire should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn frame_pads_payload_and_appends_checksum() {
    let json = stdout_json(&propwire(&["frame", "e5", "--min-bytes", "8"]));

    assert_eq!(json["tag"], "E5");
    assert_eq!(json["tag_name"], "VOLUME");
    assert_eq!(json["length"], 11);
    let frame = json["frame"].as_str().expect("frame should be a string");
    assert!(frame.starts_with("AAE50000000000000000"));
    assert_eq!(frame.len(), 22);
}

#[test]
fn frame_rejects_odd_payload() {
    let output = propwire(&["frame", "FA", "ABC"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("odd length"));
}

#[test]
fn checksum_of_frame_with_its_crc_is_zero() {
    let built = stdout_json(&propwire(&["command", "play"]));
    let frame = built["frame"].as_str().unwrap().to_string();

    let json = stdout_json(&propwire(&["checksum", &frame]));
    assert_eq!(json["checksum"], "00");
}

#[test]
fn decode_capacity_notification() {
    let json = stdout_json(&propwire(&["decode", "BB D2 00 00 10 00 05"]));
    assert_eq!(json["capacity"]["kb"], 4096);
    assert_eq!(json["capacity"]["files"], 5);
}

#[test]
fn decode_unknown_tag_is_empty() {
    let json = stdout_json(&propwire(&["decode", "BB4201"]));
    assert_eq!(json, serde_json::json!({}));
}

#[test]
fn simulate_prints_device_status() {
    let json = stdout_json(&propwire(&[
        "simulate",
        "--volume",
        "25",
        "--name",
        "Spooky",
        "--timeout",
        "2s",
    ]));

    assert_eq!(json["volume"], 25);
    assert_eq!(json["bluetooth_name"], "Spooky");
    assert_eq!(json["device_name"], "Skeleton");
}

#[test]
fn simulate_dropped_link_fails() {
    let output = propwire(&["simulate", "--drop-after", "0", "--timeout", "1s"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("disconnected"));
}
