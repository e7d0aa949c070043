//! Integration tests for the `quicklink` CLI binary.
//!
//! Argument parsing, help output, completions, offline commands, config
//! handling and error exit codes. No live Home Assistant is needed.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

const ISOLATED_HOME: &str = "/tmp/quicklink-cli-test-nonexistent";

/// Build a command for the `quicklink` binary with env isolation.
///
/// Clears all `QUICKLINK_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn quicklink_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("quicklink");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("QUICKLINK_PROFILE")
        .env_remove("QUICKLINK_URL")
        .env_remove("QUICKLINK_TOKEN")
        .env_remove("QUICKLINK_OUTPUT")
        .env_remove("QUICKLINK_INSECURE")
        .env_remove("QUICKLINK_TIMEOUT");
    cmd
}

fn quicklink() -> assert_cmd::Command {
    quicklink_in(Path::new(ISOLATED_HOME))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Temp home with a config file holding two profiles.
fn home_with_config() -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("quicklink");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        r#"
default_profile = "home"

[profiles.home]
url = "http://homeassistant.local:8123"
token = "super-secret-token"

[profiles.cabin]
url = "https://cabin.example:8123"
token_env = "CABIN_HA_TOKEN"
insecure = true
"#,
    )
    .unwrap();
    home
}

/// A localhost port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let output = quicklink().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn help_lists_top_level_commands() {
    quicklink().arg("--help").assert().success().stdout(
        predicate::str::contains("quick automation")
            .and(predicate::str::contains("entries"))
            .and(predicate::str::contains("links"))
            .and(predicate::str::contains("status")),
    );
}

#[test]
fn version_flag() {
    quicklink()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quicklink"));
}

#[test]
fn entries_subcommands_exist() {
    quicklink().args(["entries", "--help"]).assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("toggle"))
            .and(predicate::str::contains("remove"))
            .and(predicate::str::contains("create"))
            .and(predicate::str::contains("edit")),
    );
}

#[test]
fn edit_flags_are_documented() {
    quicklink()
        .args(["entries", "edit", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--trigger")
                .and(predicate::str::contains("--extra"))
                .and(predicate::str::contains("--no-reverse"))
                .and(predicate::str::contains("--disable")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn completions_bash() {
    quicklink()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn completions_zsh() {
    quicklink()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn completions_to_directory() {
    let out = tempfile::tempdir().unwrap();
    quicklink()
        .args(["completions", "fish", "--dir"])
        .arg(out.path())
        .assert()
        .success();
    assert!(out.path().join("quicklink.fish").exists());
}

// ── Offline link catalog ────────────────────────────────────────────

#[test]
fn link_types_need_no_connection() {
    quicklink()
        .args(["links", "types"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("on_off")
                .and(predicate::str::contains("Color temperature"))
                .and(predicate::str::contains("Action")),
        );
}

#[test]
fn link_types_plain_output() {
    let output = quicklink()
        .args(["-o", "plain", "links", "types"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "on_off\nbrightness\nleft_right\ntoggle"
    );
}

#[test]
fn link_types_json_output() {
    let output = quicklink()
        .args(["--output", "json", "links", "types"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let types = parsed.as_array().unwrap();
    assert_eq!(types.len(), 4);
    assert_eq!(types[3]["type"], "toggle");
    assert_eq!(types[3]["supports_reverse"], false);
    assert_eq!(types[0]["trigger_label"], serde_json::Value::Null);
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn invalid_subcommand() {
    let output = quicklink().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn invalid_output_format() {
    let output = quicklink()
        .args(["--output", "xml", "links", "types"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("possible values") || text.contains("invalid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn entries_without_config_fail() {
    quicklink()
        .args(["entries", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn url_without_token_is_an_auth_error() {
    quicklink()
        .args(["--url", "http://127.0.0.1:8123", "entries", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("access token"));
}

#[test]
fn non_http_url_is_rejected() {
    quicklink()
        .args(["--url", "ftp://ha.local", "--token", "t", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("http"));
}

#[test]
fn unknown_profile_is_reported() {
    let home = home_with_config();
    quicklink_in(home.path())
        .args(["--profile", "garage", "entries", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("garage").and(predicate::str::contains("cabin")));
}

#[test]
fn malformed_config_is_reported_before_falling_back() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("quicklink");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[profiles.home\nurl = ").unwrap();

    quicklink_in(home.path())
        .args(["entries", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ignoring unreadable config file"));
}

#[test]
fn unreachable_instance_exits_with_connection_code() {
    let url = format!("http://127.0.0.1:{}", closed_port());
    quicklink()
        .args(["--url", &url, "--token", "t", "--timeout", "2", "entries", "list"])
        .assert()
        .code(7);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_show_without_config_file() {
    quicklink().args(["config", "show"]).assert().success();
}

#[test]
fn config_show_redacts_tokens() {
    let home = home_with_config();
    for format in ["table", "json", "yaml"] {
        quicklink_in(home.path())
            .args(["--output", format, "config", "show"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("homeassistant.local")
                    .and(predicate::str::contains("CABIN_HA_TOKEN"))
                    .and(predicate::str::contains("super-secret-token").not()),
            );
    }
}

#[test]
fn config_use_switches_default_profile() {
    let home = home_with_config();
    quicklink_in(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("home *"));

    quicklink_in(home.path())
        .args(["config", "use", "cabin"])
        .assert()
        .success();

    quicklink_in(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cabin *").and(predicate::str::contains("home *").not()));
}

#[test]
fn config_use_unknown_profile_fails() {
    let home = home_with_config();
    quicklink_in(home.path())
        .args(["config", "use", "garage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("garage"));
}
