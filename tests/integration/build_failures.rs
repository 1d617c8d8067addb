//! Build failures abort the scenario before any check runs

use super::harness::Fixtures;
use ecverify::scenario::{self, Check, Scenario};
use ecverify::{build, BuildError, StderrPolicy};
use std::time::{Duration, Instant};

#[test]
fn non_zero_exit_is_a_build_error() {
    let fixtures = Fixtures::copy();
    let err = build(&fixtures.descriptor("build-fails")).unwrap_err();

    match err {
        BuildError::Failed { stdout, .. } => {
            assert!(stdout.contains("Cannot find integration"), "{}", stdout)
        }
        other => panic!("Expected failed build, got: {}", other),
    }
}

#[test]
fn stderr_output_fails_by_default() {
    let fixtures = Fixtures::copy();
    let err = build(&fixtures.descriptor("build-warns")).unwrap_err();

    assert!(
        matches!(err, BuildError::Stderr { ref stderr, .. } if stderr.contains("deprecated")),
        "Expected stderr failure, got: {}",
        err
    );
}

#[test]
fn stderr_output_can_be_allowed() {
    let fixtures = Fixtures::copy();
    let descriptor = fixtures
        .descriptor("build-warns")
        .with_stderr_policy(StderrPolicy::Allow);

    let site = build(&descriptor).expect("Build with allowed stderr failed");
    assert!(site.read_file("index.html").is_ok());
}

#[test]
fn slow_build_times_out() {
    let fixtures = Fixtures::copy();
    let descriptor = fixtures
        .descriptor("build-slow")
        .with_timeout(Duration::from_millis(500));

    let started = Instant::now();
    let err = build(&descriptor).unwrap_err();

    assert!(matches!(err, BuildError::TimedOut { .. }), "got: {}", err);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn failed_build_fails_all_checks() {
    let fixtures = Fixtures::copy();
    let scenario = Scenario::new("fails", fixtures.descriptor("build-fails"))
        .with_check(Check::page("index.html"))
        .with_check(Check::assets());

    let report = scenario::run(&scenario);

    assert!(!report.passed());
    assert!(!report.build.ok);
    assert_eq!(report.failed_checks(), 2);
    assert!(report
        .build
        .error
        .as_deref()
        .unwrap()
        .contains("exited with"));
}
