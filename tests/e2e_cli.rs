//! CLI end-to-end tests
//!
//! Tests for the nutmeg command-line interface. Commands that launch tools
//! run against fake ffprobe/ffmpeg scripts found through a config file.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Get a command for the nutmeg binary
#[allow(deprecated)]
fn nutmeg_cmd() -> Command {
    let mut cmd = Command::cargo_bin("nutmeg").unwrap();
    // Keep a developer's ./nutmeg.toml from leaking into the tests
    cmd.current_dir(std::env::temp_dir());
    cmd
}

/// Write a config whose search path is only `dir`.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let config_file = dir.join("nutmeg.toml");
    fs::write(
        &config_file,
        format!(
            "[resolver]\nsearch_path = [{:?}]\n\n{}",
            dir.to_str().unwrap(),
            extra
        ),
    )
    .unwrap();
    config_file
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = nutmeg_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = nutmeg_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("nutmeg"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = nutmeg_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_clip_help() {
    let mut cmd = nutmeg_cmd();
    cmd.args(["clip", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("without re-encoding"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = nutmeg_cmd();
    cmd.arg("check-tools").assert().success().stdout(
        predicate::str::contains("ffmpeg").and(predicate::str::contains("ffprobe")),
    );
}

#[test]
fn test_cli_check_tools_reports_missing() {
    let temp = tempdir().unwrap();
    let config_file = write_config(temp.path(), "");

    let mut cmd = nutmeg_cmd();
    cmd.args(["--config", config_file.to_str().unwrap(), "check-tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✗ ffprobe"))
        .stdout(predicate::str::contains("Some tools are missing"));
}

#[test]
fn test_cli_resolve_missing_tool() {
    let mut cmd = nutmeg_cmd();
    cmd.args(["resolve", "nonexistent_tool_12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_validate_config() {
    let temp = tempdir().unwrap();
    let config_file = write_config(temp.path(), "[supervisor]\ntimeout_secs = 30\n");

    let mut cmd = nutmeg_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Timeout: 30s"));
}

#[test]
fn test_cli_validate_rejects_zero_timeout() {
    let temp = tempdir().unwrap();
    let config_file = write_config(temp.path(), "[supervisor]\ntimeout_secs = 0\n");

    let mut cmd = nutmeg_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
}

#[test]
fn test_cli_validate_defaults() {
    let mut cmd = nutmeg_cmd();
    cmd.arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"));
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use serial_test::serial;
    use std::os::unix::fs::PermissionsExt;

    const PROBE_JSON: &str = r#"{"format":{"duration":"65.25","format_name":"mov,mp4,m4a,3gp,3g2,mj2"},"streams":[{"index":"0","codec_type":"video","codec_name":"h264","width":"1280"}]}"#;

    fn write_tool(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Temp dir with fake tools, a config pointing at it and `input.mp4`.
    fn setup(extra_config: &str) -> (TempDir, PathBuf, PathBuf) {
        let temp = tempdir().unwrap();
        write_tool(
            temp.path(),
            "ffprobe",
            &format!("cat <<'JSON'\n{PROBE_JSON}\nJSON"),
        );
        write_tool(
            temp.path(),
            "ffmpeg",
            "for last; do :; done\nprintf 'frame=1\\rframe=2\\r' >&2\n: > \"$last\"",
        );
        let config_file = write_config(temp.path(), extra_config);
        let input = temp.path().join("input.mp4");
        fs::write(&input, b"fake").unwrap();
        (temp, config_file, input)
    }

    #[test]
    #[serial]
    fn test_cli_resolve_configured_search_path() {
        let (temp, config_file, _) = setup("");

        let mut cmd = nutmeg_cmd();
        cmd.args(["--config", config_file.to_str().unwrap(), "resolve", "ffprobe"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                temp.path().join("ffprobe").to_str().unwrap(),
            ));
    }

    #[test]
    #[serial]
    fn test_cli_probe_text() {
        let (_temp, config_file, input) = setup("");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "probe",
            input.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duration: 00:01:05.25"))
        .stdout(predicate::str::contains("Number of streams: 1"))
        .stdout(predicate::str::contains("codec_name: h264"));
    }

    #[test]
    #[serial]
    fn test_cli_probe_json_coerces_numbers() {
        let (_temp, config_file, input) = setup("");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "probe",
            "--json",
            input.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""duration": 65.25"#))
        .stdout(predicate::str::contains(r#""width": 1280"#));
    }

    #[test]
    #[serial]
    fn test_cli_probe_nonexistent_file() {
        let (_temp, config_file, _) = setup("");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "probe",
            "/nonexistent/path/movie.mkv",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    }

    #[test]
    #[serial]
    fn test_cli_clip_with_duration() {
        let (temp, config_file, input) = setup("");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "clip",
            input.to_str().unwrap(),
            "--start",
            "1",
            "--duration",
            "2.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("input.clip-1.00-3.50.mp4"));

        assert!(temp.path().join("input.clip-1.00-3.50.mp4").is_file());
    }

    #[test]
    #[serial]
    fn test_cli_clip_requires_stop_or_duration() {
        let (_temp, config_file, input) = setup("");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "clip",
            input.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("time_stop"));
    }

    #[test]
    #[serial]
    fn test_cli_intra_with_inspection_from_config() {
        let (temp, config_file, input) = setup("[supervisor]\ninspect_outputs = true\n");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "intra",
            "--json",
            input.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("input.intra.mp4"))
        .stdout(predicate::str::contains("output_probe"));

        assert!(temp.path().join("input.intra.mp4").is_file());
    }

    #[test]
    #[serial]
    fn test_cli_inspection_uses_configured_ffprobe_path() {
        let (temp, _, input) = setup("");
        fs::remove_file(temp.path().join("ffprobe")).unwrap();

        let elsewhere = tempdir().unwrap();
        write_tool(
            elsewhere.path(),
            "ffprobe",
            &format!("cat <<'JSON'\n{PROBE_JSON}\nJSON"),
        );
        let ffprobe = elsewhere.path().join("ffprobe");
        let config_file = write_config(
            temp.path(),
            &format!(
                "[tools]\nffprobe_path = {:?}\n",
                ffprobe.to_str().unwrap()
            ),
        );

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "clip",
            "--inspect",
            "--json",
            input.to_str().unwrap(),
            "--stop",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("input_probe"))
        .stdout(predicate::str::contains(r#""duration": 65.25"#));
    }

    #[test]
    #[serial]
    fn test_cli_failing_tool_reports_stderr() {
        let (temp, config_file, input) = setup("");
        write_tool(temp.path(), "ffmpeg", "echo 'Invalid data found' >&2\nexit 1");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "intra",
            input.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ffmpeg failed"))
        .stderr(predicate::str::contains("Invalid data found"));
    }

    #[test]
    #[serial]
    fn test_cli_timeout_stops_tool() {
        let (temp, config_file, input) = setup("[supervisor]\npoll_interval_ms = 10\n");
        write_tool(temp.path(), "ffmpeg", "exec sleep 30");

        let mut cmd = nutmeg_cmd();
        cmd.args([
            "--config",
            config_file.to_str().unwrap(),
            "--timeout",
            "1",
            "intra",
            input.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out"));
    }
}
