//! End-to-end smoke test for collector mode (spec §8 scenario 1).
//!
//! Requires `/proc/sys/kernel/perf_event_paranoid` to permit opening
//! hardware counters for the test user, so it's `#[ignore]`d by default —
//! run explicitly with `cargo test -- --ignored` on a host with perf access.

use std::fs;
use std::time::Duration;

use assert_cmd::Command;
use tempfile::tempdir;

#[test]
#[ignore]
fn collector_mode_produces_csv_and_time_file() {
    let dir = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("supervisor").unwrap();
    cmd.current_dir(dir.path())
        .env("SCHED_MODE", "collect")
        .arg("sleep")
        .arg("0.1")
        .timeout(Duration::from_secs(5));

    cmd.assert().success();

    let csv_files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|ext| ext == "csv").unwrap_or(false))
        .collect();
    assert_eq!(csv_files.len(), 1, "expected exactly one scheduler_<pid>.csv");

    let csv = fs::read_to_string(csv_files[0].path()).unwrap();
    let rows: Vec<_> = csv.lines().collect();
    assert!(
        rows.len() >= 3,
        "expected several ticks over a 100ms workload, got {}",
        rows.len()
    );

    let time_files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|ext| ext == "time").unwrap_or(false))
        .collect();
    assert_eq!(time_files.len(), 1, "expected exactly one scheduler_<pid>.time");

    let elapsed: u64 = fs::read_to_string(time_files[0].path())
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!((50..500).contains(&elapsed), "elapsed_ms out of range: {elapsed}");
}

#[test]
fn usage_error_without_workload_argv() {
    let mut cmd = Command::cargo_bin("supervisor").unwrap();
    cmd.assert().failure().code(1);
}
