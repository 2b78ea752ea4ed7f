//! ---
//! nd_section: "15-testing"
//! nd_subsection: "integration"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "End-to-end checks of the dominoes-run binary."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
#![cfg(unix)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dominoes-run").unwrap();
    cmd.current_dir(dir)
        .env_remove("NOISY_DOMINOES_CONFIG")
        .env("NOISY_DOMINOES_LOG", "warn");
    cmd
}

fn fake_simulation(dir: &Path, body: &str) {
    fs::write(dir.join("fake.sh"), body).unwrap();
}

#[test]
fn args_lists_default_flags_only() {
    let temp = TempDir::new().unwrap();
    cmd(temp.path())
        .arg("args")
        .assert()
        .success()
        .stdout(contains("--dir\ntmp_h\n"))
        .stdout(contains("--mrot\n[0,0]\n"))
        .stdout(contains("--save_passes").not())
        .stdout(contains("--save_movies").not());
}

#[test]
fn args_json_includes_optional_flags_when_set() {
    let temp = TempDir::new().unwrap();
    let output = cmd(temp.path())
        .args(["args", "--json", "--save-passes", "_img", "--save-movies"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 11);
    assert!(entries
        .iter()
        .any(|e| e["flag"] == "--save_passes" && e["value"] == "_img"));
    assert!(entries
        .iter()
        .any(|e| e["flag"] == "--save_movies" && e["value"].is_null()));
}

#[test]
fn dry_run_prints_the_command() {
    let temp = TempDir::new().unwrap();
    cmd(temp.path())
        .args(["run", "--dry-run", "--dir", "tmp_l", "--noise", "noise_low.json"])
        .assert()
        .success()
        .stdout(contains("python noisy_dominoes.py --dir tmp_l --num 100"))
        .stdout(contains("--noise noise_low.json"));
}

#[test]
fn successful_child_exits_zero() {
    let temp = TempDir::new().unwrap();
    fake_simulation(temp.path(), "exit 0\n");
    cmd(temp.path())
        .args(["run", "--python", "sh", "--script", "fake.sh"])
        .assert()
        .success();
}

#[test]
fn failing_child_exit_code_is_mirrored() {
    let temp = TempDir::new().unwrap();
    fake_simulation(temp.path(), "exit 5\n");
    cmd(temp.path())
        .args(["run", "--python", "sh", "--script", "fake.sh"])
        .assert()
        .code(5);
}

#[test]
fn missing_interpreter_is_a_launch_failure() {
    let temp = TempDir::new().unwrap();
    fake_simulation(temp.path(), "exit 0\n");
    cmd(temp.path())
        .args(["run", "--python", "no-such-python-7f3e", "--script", "fake.sh"])
        .assert()
        .code(127)
        .stderr(contains("unable to launch"));
}

#[test]
fn missing_script_is_a_launch_failure() {
    let temp = TempDir::new().unwrap();
    cmd(temp.path())
        .args(["run", "--python", "sh"])
        .assert()
        .code(127);
}

#[test]
fn invalid_override_is_rejected_before_launch() {
    let temp = TempDir::new().unwrap();
    fake_simulation(temp.path(), "touch launched\n");
    cmd(temp.path())
        .args(["run", "--python", "sh", "--script", "fake.sh", "--num", "0"])
        .assert()
        .code(2);
    assert!(!temp.path().join("launched").exists());
}

#[test]
fn settings_file_feeds_the_invocation() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("dominoes.toml"),
        "[invocation]\ndir = \"tmp_f\"\nnum = 7\nmrot = [-45, 45]\n",
    )
    .unwrap();
    cmd(temp.path())
        .args(["args", "--num", "8"])
        .assert()
        .success()
        .stdout(contains("--dir\ntmp_f\n"))
        .stdout(contains("--num\n8\n"))
        .stdout(contains("--mrot\n[-45,45]\n"));
}

#[test]
fn explicit_missing_settings_file_fails() {
    let temp = TempDir::new().unwrap();
    cmd(temp.path())
        .args(["--config", "absent.toml", "args"])
        .assert()
        .code(2)
        .stderr(contains("absent.toml"));
}

#[test]
fn check_validates_the_noise_profile() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("noise_high.json"), r#"{"mass": 0.2}"#).unwrap();
    cmd(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("noise profile ok: noise_high.json"));

    fs::write(temp.path().join("noise_bad.json"), r#"{"mass": -1}"#).unwrap();
    cmd(temp.path())
        .args(["check", "--noise", "noise_bad.json"])
        .assert()
        .code(2)
        .stderr(contains("mass"));
}

#[test]
fn command_line_overrides_repair_settings_file_values() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("dominoes.toml"), "[invocation]\nnum = 0\n").unwrap();
    cmd(temp.path())
        .args(["args", "--num", "5"])
        .assert()
        .success()
        .stdout(contains("--num\n5\n"));
    cmd(temp.path()).arg("args").assert().code(2).stderr(contains("num"));
}
