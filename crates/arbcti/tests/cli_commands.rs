#![cfg(feature = "cli")]

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Output, Stdio};

struct Spoofer {
    child: Child,
    port: u16,
}

impl Spoofer {
    fn start(channels: usize) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_arbcti"))
            .args(["--log-level", "error", "--format", "json", "spoof", "--port", "0"])
            .args(["--channels", &channels.to_string()])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spoof command should start");

        let stdout = child.stdout.take().expect("stdout should be piped");
        let mut line = String::new();
        BufReader::new(stdout)
            .read_line(&mut line)
            .expect("spoof should print its address");
        let started: serde_json::Value =
            serde_json::from_str(&line).expect("spoof should emit json");
        let port = started
            .get("port")
            .and_then(|p| p.as_u64())
            .and_then(|p| u16::try_from(p).ok())
            .expect("spoof output should carry the port");
        assert_eq!(
            started.get("num_channels").and_then(|n| n.as_u64()),
            Some(channels as u64)
        );

        Self { child, port }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_arbcti"))
            .args(["--log-level", "error", "--format", "json"])
            .args(args)
            .args(["--host", "127.0.0.1", "--port", &self.port.to_string()])
            .env("ARBIN_CTI_USERNAME", "operator")
            .env("ARBIN_CTI_PASSWORD", "secret")
            .output()
            .expect("command should run")
    }
}

impl Drop for Spoofer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn status_reads_requested_channels() {
    let spoofer = Spoofer::start(8);
    let output = spoofer.run(&["status", "2,5"]);
    assert!(output.status.success(), "{output:?}");

    let statuses: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status should emit json");
    let channels: Vec<u64> = statuses
        .as_array()
        .expect("status output should be an array")
        .iter()
        .filter_map(|s| s.get("channel").and_then(|c| c.as_u64()))
        .collect();
    assert_eq!(channels, vec![2, 5]);
    assert_eq!(statuses[0].get("status").and_then(|s| s.as_str()), Some("Idle"));
}

#[test]
fn status_defaults_to_every_channel() {
    let spoofer = Spoofer::start(3);
    let output = spoofer.run(&["status"]);
    assert!(output.status.success(), "{output:?}");
    let statuses: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(statuses.as_array().map(Vec::len), Some(3));
}

#[test]
fn channel_commands_report_success() {
    let spoofer = Spoofer::start(4);
    for args in [
        vec!["assign", "3", "--schedule", "form.sdx"],
        vec!["start", "3", "--schedule", "form.sdx", "--test-name", "formation"],
        vec!["set-mv", "3", "--mv", "2", "--value", "-1.5"],
        vec!["jump", "3", "--step", "4"],
        vec!["stop", "3"],
    ] {
        let output = spoofer.run(&args);
        assert!(output.status.success(), "{args:?}: {output:?}");
        let feedback: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("feedback should be json");
        assert_eq!(feedback.get("success"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(feedback.get("channel").and_then(|c| c.as_u64()), Some(3));
    }
}

#[test]
fn channel_beyond_cycler_is_usage_error() {
    let spoofer = Spoofer::start(2);
    let output = spoofer.run(&["status", "3"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn missing_credentials_is_config_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_arbcti"))
        .args(["status", "1", "--port", "1"])
        .env_remove("ARBIN_CTI_USERNAME")
        .env_remove("ARBIN_CTI_PASSWORD")
        .output()
        .expect("status should run");
    assert_eq!(output.status.code(), Some(78));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ARBIN_CTI_USERNAME"));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_arbcti"))
        .arg("version")
        .output()
        .expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
