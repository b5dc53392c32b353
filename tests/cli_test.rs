#![allow(missing_docs)]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

#[cfg(unix)]
use nightshade::log::read_records;

fn nightshade(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nightshade"))
        .current_dir(dir)
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run nightshade binary")
}

#[test]
fn test_version_prints_banner_and_exits_zero() {
    let tmp = TempDir::new().unwrap();

    for flag in ["-v", "--version"] {
        let output = nightshade(tmp.path(), &[flag]);
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with(&format!(
            "Nightshade Pomedoro {}",
            env!("CARGO_PKG_VERSION")
        )));
        assert!(stdout.contains("GPLv3+"));
    }

    // Version exits before any file is touched
    assert!(!tmp.path().join("pomedoro_times.csv").exists());
}

#[test]
fn test_help_lists_flags() {
    let tmp = TempDir::new().unwrap();
    let output = nightshade(tmp.path(), &["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--topic", "--schedule", "--output-path", "--alarm-path", "--version"] {
        assert!(stdout.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn test_malformed_schedule_fails_without_writing_log() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("bell.wav"), b"RIFF").unwrap();

    for schedule in ["25", "abc,5", "-25,5", "25,-5", "25;5", "0,5"] {
        let output = nightshade(
            tmp.path(),
            &["-s", schedule, "-a", "bell.wav", "-o", "times.csv"],
        );
        assert!(!output.status.success(), "schedule {schedule:?} was accepted");

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("--schedule"), "unexpected error: {stderr}");
    }

    assert!(!tmp.path().join("times.csv").exists());
}

#[test]
fn test_missing_alarm_sound_fails_without_writing_log() {
    let tmp = TempDir::new().unwrap();

    let output = nightshade(
        tmp.path(),
        &["-a", "no-such-bell.mp3", "-o", "times.csv"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-such-bell.mp3"), "unexpected error: {stderr}");
    assert!(!tmp.path().join("times.csv").exists());
}

#[test]
fn test_topic_with_line_break_fails_without_writing_log() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("bell.wav"), b"RIFF").unwrap();

    let output = nightshade(
        tmp.path(),
        &["-t", "line1\nline2", "-a", "bell.wav", "-o", "times.csv"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--topic"), "unexpected error: {stderr}");
    assert!(!tmp.path().join("times.csv").exists());
}

#[test]
fn test_bad_config_file_fails() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("nightshade.toml"), "schedule = 25\n").unwrap();

    let output = nightshade(tmp.path(), &["-c", "nightshade.toml"]);

    assert!(!output.status.success());
    assert!(!tmp.path().join("pomedoro_times.csv").exists());
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let output = nightshade(tmp.path(), &["--minutes", "25"]);
    assert_eq!(output.status.code(), Some(2));
}

/// Wait for a child to exit, killing it if it takes longer than `limit`.
#[cfg(unix)]
fn wait_with_limit(
    child: &mut std::process::Child,
    limit: std::time::Duration,
) -> std::process::ExitStatus {
    let deadline = std::time::Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if std::time::Instant::now() > deadline {
            child.kill().unwrap();
            panic!("nightshade did not exit within {limit:?}");
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}

#[cfg(unix)]
fn interrupt_after(signal: &str, secs: u64) {
    use std::os::unix::process::CommandExt;
    use std::process::Stdio;
    use std::time::Duration;

    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("bell.wav"), b"RIFF").unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_nightshade"))
        .current_dir(tmp.path())
        .args(["-t", "Signals", "-a", "bell.wav", "-p", "true", "-o", "times.csv"])
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        // Its own process group, so only the signal sent below reaches it
        .process_group(0)
        .spawn()
        .unwrap();

    std::thread::sleep(Duration::from_secs(secs));
    let sent = Command::new("kill")
        .args([format!("-{signal}"), child.id().to_string()])
        .status()
        .unwrap();
    assert!(sent.success());

    let status = wait_with_limit(&mut child, Duration::from_secs(10));
    assert_eq!(status.code(), Some(0), "{signal} gave {status:?}");

    let records = read_records(tmp.path().join("times.csv")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, "Signals");
    assert!(
        records[0].completed_work_seconds.abs_diff(secs) <= 1,
        "expected ~{secs}s of work, got {}",
        records[0].completed_work_seconds
    );
    assert_eq!(records[0].completed_rest_seconds, 0);
}

#[cfg(unix)]
#[test]
fn test_sigint_saves_partial_work_and_exits_zero() {
    interrupt_after("INT", 3);
}

#[cfg(unix)]
#[test]
fn test_sigterm_saves_partial_work_and_exits_zero() {
    interrupt_after("TERM", 3);
}
