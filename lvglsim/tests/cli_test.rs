//! Process-level tests for the `lvglsim` binary.
//!
//! Each test runs the built binary with a clean simulator environment so a
//! developer's own `LV_SIM_*` settings cannot leak in.

use std::process::{Command, Output};

const SIM_ENV: [&str; 6] = [
    "LV_SIM_CONFIG",
    "LV_SIM_WINDOW_WIDTH",
    "LV_SIM_WINDOW_HEIGHT",
    "LV_SIM_LOG_FORMAT",
    "LV_LINUX_FBDEV_DEVICE",
    "LV_LINUX_EVDEV_POINTER_DEVICE",
];

fn lvglsim() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lvglsim"));
    for key in SIM_ENV {
        cmd.env_remove(key);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run lvglsim")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_version_flag() {
    let output = run(lvglsim().arg("-V"));
    assert!(output.status.success());

    let text = stdout(&output);
    let version = text.trim_end();
    assert_eq!(text.lines().count(), 1);
    let (numbers, suffix) = version.split_once('-').unwrap();
    assert_eq!(suffix, "dev");
    assert_eq!(numbers.split('.').count(), 3);
    assert!(numbers.split('.').all(|n| n.parse::<u32>().is_ok()));
}

#[test]
fn test_list_backends() {
    let output = run(lvglsim().arg("-B"));
    assert!(output.status.success());

    let text = stdout(&output);
    let names: Vec<&str> = text.lines().collect();
    assert_eq!(names.first(), Some(&"Terminal"));
    assert!(names.contains(&"Headless"));
}

#[test]
fn test_list_backends_ignores_config_file() {
    let output = run(lvglsim()
        .arg("-B")
        .env("LV_SIM_CONFIG", "/nonexistent/lvglsim.yaml"));
    assert!(output.status.success());
    assert!(stdout(&output).lines().any(|name| name == "Headless"));
}

#[test]
fn test_help_flag() {
    let output = run(lvglsim().arg("-h"));
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage"));
}

#[test]
fn test_unknown_backend_exits_with_one_error_line() {
    let output = run(lvglsim().args(["-b", "Nonexistent"]).env("RUST_LOG", "off"));
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "error: no such backend: Nonexistent\n");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_settings_warning_is_logged() {
    let output = run(lvglsim()
        .args(["-b", "Nonexistent"])
        .env("LV_SIM_WINDOW_WIDTH", "wide"));
    assert_eq!(output.status.code(), Some(1));

    let text = stderr(&output);
    assert!(text.contains("Ignoring non-numeric window dimension"));
    assert_eq!(
        text.lines().last(),
        Some("error: no such backend: Nonexistent")
    );
}

#[test]
fn test_unknown_flag_prints_usage() {
    let output = run(lvglsim().arg("--bogus"));
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage"));
}
