//! ---
//! nd_section: "15-testing"
//! nd_subsection: "integration"
//! nd_type: "source"
//! nd_scope: "code"
//! nd_description: "Launches real child processes through the harness."
//! nd_version: "v0.1.0"
//! nd_owner: "tbd"
//! ---
#![cfg(unix)]

use std::fs;
use std::future::pending;
use std::path::Path;

use dominoes_harness::{HarnessError, HarnessInvoker, InvocationConfig, LauncherConfig};
use tempfile::tempdir;

fn sh_launcher(dir: &Path, body: &str) -> LauncherConfig {
    fs::write(dir.join("noisy_dominoes.sh"), body).expect("write fake simulation");
    LauncherConfig {
        interpreter: Some("sh".into()),
        script: "noisy_dominoes.sh".into(),
        working_dir: Some(dir.to_path_buf()),
        ..LauncherConfig::default()
    }
}

#[tokio::test]
async fn child_receives_generated_arguments() {
    let temp = tempdir().expect("tempdir");
    let launcher = sh_launcher(temp.path(), "printf '%s\\n' \"$@\" > argv.txt\n");
    let invoker = HarnessInvoker::new(launcher);

    let report = invoker
        .run_until(&InvocationConfig::default(), pending())
        .await
        .expect("run succeeds");
    assert!(report.exit.success());

    let argv = fs::read_to_string(temp.path().join("argv.txt")).expect("argv written");
    let tokens: Vec<&str> = argv.lines().collect();
    assert_eq!(
        tokens,
        vec![
            "--dir",
            "tmp_h",
            "--num",
            "100",
            "--height",
            "512",
            "--width",
            "512",
            "--framerate",
            "60",
            "--noise",
            "noise_high.json",
            "--spacing_jitter",
            "0.0",
            "--lateral_jitter",
            "0.0",
            "--mrot",
            "[0,0]",
        ]
    );
}

#[tokio::test]
async fn non_zero_child_exit_propagates() {
    let temp = tempdir().expect("tempdir");
    let invoker = HarnessInvoker::new(sh_launcher(temp.path(), "exit 3\n"));
    let err = invoker
        .run_until(&InvocationConfig::default(), pending())
        .await
        .expect_err("child failure");
    assert!(matches!(err, HarnessError::ChildProcess { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn absent_script_fails_to_launch() {
    let temp = tempdir().expect("tempdir");
    let launcher = LauncherConfig {
        interpreter: Some("sh".into()),
        script: "missing.sh".into(),
        working_dir: Some(temp.path().to_path_buf()),
        ..LauncherConfig::default()
    };
    let err = HarnessInvoker::new(launcher)
        .run_until(&InvocationConfig::default(), pending())
        .await
        .expect_err("launch failure");
    assert!(matches!(err, HarnessError::Launch { .. }));
    assert_eq!(err.exit_code(), 127);
}

#[tokio::test]
async fn interrupt_stops_a_long_run() {
    let temp = tempdir().expect("tempdir");
    let invoker = HarnessInvoker::new(sh_launcher(temp.path(), "sleep 30\n"));
    let shutdown = async {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        "SIGTERM"
    };
    let started = std::time::Instant::now();
    let err = invoker
        .run_until(&InvocationConfig::default(), shutdown)
        .await
        .expect_err("interrupted");
    assert!(matches!(err, HarnessError::Interrupted { signal: "SIGTERM" }));
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[tokio::test]
async fn interrupt_reaches_the_child_before_it_exits() {
    let temp = tempdir().expect("tempdir");
    let invoker = HarnessInvoker::new(sh_launcher(
        temp.path(),
        "trap 'echo stopped > signalled.txt; exit 130' INT TERM\nsleep 30 &\nwait\n",
    ));
    let shutdown = async {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        "SIGTERM"
    };
    let err = invoker
        .run_until(&InvocationConfig::default(), shutdown)
        .await
        .expect_err("interrupted");
    assert!(matches!(err, HarnessError::Interrupted { signal: "SIGTERM" }));
    let marker = fs::read_to_string(temp.path().join("signalled.txt")).expect("trap ran");
    assert_eq!(marker.trim(), "stopped");
}
