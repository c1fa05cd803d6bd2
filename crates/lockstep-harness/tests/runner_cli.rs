//! Drives the standalone `lockstep` binary end to end: argument handling,
//! the seeded run loop, and the exit-time CSV contract of measurement mode.

#![cfg(target_arch = "x86_64")]

use std::process::Command;

fn lockstep() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lockstep"))
}

fn avx2() -> bool {
    std::arch::is_x86_feature_detected!("avx2")
}

#[test]
fn measurement_mode_emits_one_csv_row_per_invocation() {
    if !avx2() {
        return;
    }
    let output = lockstep()
        .args(["-runs=3", "-max_len=224", "-measure_cycles", "ADD64rr"])
        .output()
        .expect("spawn lockstep");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );

    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first().copied(), Some("orig,transformed"));
    assert_eq!(lines.len(), 1 + 3, "header plus one row per invocation");
    for line in &lines[1..] {
        let (orig, trans) = line.split_once(',').expect("two columns");
        orig.parse::<u64>().expect("decimal original cycles");
        trans.parse::<u64>().expect("decimal transformed cycles");
    }
}

#[test]
fn equivalence_mode_is_silent_on_success() {
    if !avx2() {
        return;
    }
    let output = lockstep()
        .args(["-runs=5", "-max_len=224"])
        .output()
        .expect("spawn lockstep");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));
}

#[test]
fn missing_required_arguments_are_fatal() {
    let output = lockstep().args(["-runs=10"]).output().expect("spawn lockstep");
    assert!(!output.status.success());

    let output = lockstep()
        .args(["-runs=10", "-max_len=64"])
        .output()
        .expect("spawn lockstep");
    assert!(!output.status.success());
}

#[test]
fn unknown_filter_is_fatal() {
    let output = lockstep()
        .args(["-runs=1", "-max_len=224", "NOSUCHOP"])
        .output()
        .expect("spawn lockstep");
    assert!(!output.status.success());
}
