//! Runs the `freemails` binary against a temporary settings file.

use std::path::Path;
use std::process::{Command, Output};

fn freemails(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_freemails"))
        .args(args)
        .env("FREEMAILS_CONFIG", config)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn test_empty_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    let output = freemails(&config, &[]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "No configuration\n");
    assert!(!config.exists());
}

#[test]
fn test_settings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    let output = freemails(
        &config,
        &["server=imap.example.com", "password=pw", "+black_dir=Spam", "config"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "server = imap.example.com\npassword = ...\nblack_dir = {Spam}\n"
    );

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(
        saved,
        serde_json::json!({
            "server": "imap.example.com",
            "password": "pw",
            "black_dir": ["Spam"],
        })
    );
}

#[test]
fn test_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    let output = freemails(&config, &["login=me", "frobnicate"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Unknown command: frobnicate\n");
    assert!(!config.exists());

    let output = freemails(&config, &["colour=blue"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Unknown config item: colour\n");

    let output = freemails(&config, &["+server=x"]);
    assert_eq!(stderr(&output), "server is not a list\n");
}

#[test]
fn test_help_flags_reach_the_grammar() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    for flag in ["-h", "--help", "help"] {
        let output = freemails(&config, &[flag]);
        assert!(output.status.success());
        assert!(stdout(&output).starts_with("Usage: freemails"));
    }
}
