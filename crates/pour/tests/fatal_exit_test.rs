// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Exit-code scenarios. Each test re-runs itself in a child process selected
//! by an environment variable, because the code under test ends the process.

#![cfg(unix)]

use pour::{emit, emit_fatal, PersistFailurePolicy, Pour, PourOptions, RemoteConfig, RunIdentity};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tempfile::TempDir;

const CHILD_DIR_ENV: &str = "POUR_TEST_CHILD_DIR";

fn child_dir() -> Option<PathBuf> {
    env::var_os(CHILD_DIR_ENV).map(PathBuf::from)
}

fn run_child(test_name: &str, dir: &Path) -> ExitStatus {
    Command::new(env::current_exe().expect("test binary path"))
        .args(["--exact", test_name, "--nocapture", "--test-threads=1"])
        .env(CHILD_DIR_ENV, dir)
        .status()
        .expect("child test process ran")
}

fn options_in(dir: &Path) -> PourOptions {
    PourOptions {
        log_path: dir.to_path_buf(),
        persist_failure_policy: PersistFailurePolicy::Abort,
        ..Default::default()
    }
}

fn single_log_file(dir: &Path) -> String {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir.join("logs"))
        .expect("logs directory exists")
        .map(|entry| entry.expect("readable entry").path())
        .collect();
    assert_eq!(entries.len(), 1);
    fs::read_to_string(entries.remove(0)).expect("log file readable")
}

#[tokio::test]
async fn fatal_exits_with_code_after_writing_local_file() {
    if let Some(dir) = child_dir() {
        let pour = Pour::new(options_in(&dir)).expect("inside runtime");
        pour.start(RemoteConfig::default());
        pour.settle().await;
        emit_fatal!(pour, 3, "boom").await;
        unreachable!("emit_fatal returned");
    }

    let dir = TempDir::new().expect("temp dir");
    let status = run_child("fatal_exits_with_code_after_writing_local_file", dir.path());

    assert_eq!(status.code(), Some(3));
    let content = single_log_file(dir.path());
    let last = content.lines().last().expect("at least one line");
    assert!(last.ends_with(":PANIC: boom "), "unexpected last line: {last}");
}

#[tokio::test]
async fn fatal_before_run_exits_without_touching_disk() {
    if let Some(dir) = child_dir() {
        let pour = Pour::new(options_in(&dir)).expect("inside runtime");
        emit_fatal!(pour, 7, "early", "failure").await;
        unreachable!("emit_fatal returned");
    }

    let dir = TempDir::new().expect("temp dir");
    let status = run_child("fatal_before_run_exits_without_touching_disk", dir.path());

    assert_eq!(status.code(), Some(7));
    assert!(!dir.path().join("logs").exists());
}

#[tokio::test]
async fn local_write_failure_exits_with_code_one() {
    if let Some(dir) = child_dir() {
        // A regular file where the log directory should be.
        let blocker = dir.join("blocker");
        fs::write(&blocker, b"").expect("blocker written");
        let pour = Pour::new(options_in(&blocker)).expect("inside runtime");
        pour.persister().start_run(RunIdentity::from_timestamp("abort"));
        emit!(pour, "cannot land");
        pour.settle().await;
        unreachable!("local write failure did not terminate");
    }

    let dir = TempDir::new().expect("temp dir");
    let status = run_child("local_write_failure_exits_with_code_one", dir.path());

    assert_eq!(status.code(), Some(1));
}

#[tokio::test]
async fn setup_bootstraps_missing_config_and_exits() {
    if let Some(dir) = child_dir() {
        let _ = Pour::setup(options_in(&dir)).await;
        unreachable!("setup returned without a config file");
    }

    let dir = TempDir::new().expect("temp dir");
    let status = run_child("setup_bootstraps_missing_config_and_exits", dir.path());

    // Exit code -1 is reported as 255 on unix.
    assert_eq!(status.code(), Some(255));
    let written = fs::read_to_string(dir.path().join("config_pour.json")).expect("config created");
    let config: RemoteConfig = serde_json::from_str(&written).expect("template is valid JSON");
    assert_eq!(config.host, "127.0.0.1");
}

#[tokio::test]
async fn setup_exits_on_unreadable_config() {
    if let Some(dir) = child_dir() {
        let _ = Pour::setup(options_in(&dir)).await;
        unreachable!("setup returned with a broken config file");
    }

    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("config_pour.json"), "{ broken").expect("config written");
    let status = run_child("setup_exits_on_unreadable_config", dir.path());

    assert_eq!(status.code(), Some(255));
}

#[tokio::test]
async fn setup_with_valid_config_starts_run() {
    let dir = TempDir::new().expect("temp dir");
    let config = RemoteConfig {
        remote_logs: false,
        project_key: "pk".to_string(),
        host: "127.0.0.1".to_string(),
        port: 12555,
        client: "client".to_string(),
        client_key: "key".to_string(),
    };
    fs::write(
        dir.path().join("config_pour.json"),
        serde_json::to_string(&config).expect("serializable"),
    )
    .expect("config written");

    let pour = Pour::setup(options_in(dir.path()))
        .await
        .expect("inside runtime");
    pour.settle().await;

    assert!(pour.persister().run().is_some());
    let content = single_log_file(dir.path());
    assert!(content.contains("Log-Server configured at 127.0.0.1:12555 "));
    assert!(content.contains("Pour up and running.. "));
    assert!(!content.contains("falling back to local"));
}
