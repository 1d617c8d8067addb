//! End-to-end runs of the ecverify binary

use super::harness::{ecverify, Fixtures, RunAssertions};
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn run_passes_every_fixture_scenario() {
    let fixtures = Fixtures::copy();
    let config = fixtures.path("ecverify.toml");

    let result = ecverify(config.parent().unwrap(), &["run"]);

    result.assert_success();
    assert!(result.stdout_contains("3 passed, 0 failed"), "{}", result.stdout);
}

#[test]
fn run_json_reports_each_check() {
    let fixtures = Fixtures::copy();
    let config = fixtures.path("ecverify.toml");
    let config = config.to_str().unwrap();

    let result = ecverify(
        &std::env::temp_dir(),
        &["run", "--config", config, "--scenario", "custom-paths", "--json"],
    );
    result.assert_success();

    let json = result.json();
    assert_eq!(json["passed"], 1);
    assert_eq!(json["failed"], 0);
    let scenario = &json["scenarios"][0];
    assert_eq!(scenario["name"], "custom-paths");
    assert_eq!(scenario["build"]["ok"], true);
    assert_eq!(scenario["checks"].as_array().unwrap().len(), 3);
}

#[test]
fn run_reports_broken_builds() {
    let fixtures = Fixtures::copy();
    let config = fixtures.path("broken.toml");
    let config = config.to_str().unwrap();

    let result = ecverify(&std::env::temp_dir(), &["run", "--config", config, "--json"]);
    result.assert_failure();

    let json = result.json();
    let by_name = |name: &str| {
        json["scenarios"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["name"] == name)
            .cloned()
            .unwrap_or_else(|| panic!("scenario {} missing", name))
    };

    assert_eq!(by_name("fails")["build"]["ok"], false);
    assert_eq!(by_name("warns")["build"]["ok"], false);
    assert_eq!(by_name("warns-allowed")["build"]["ok"], true);
    assert!(by_name("slow")["build"]["error"]
        .as_str()
        .unwrap()
        .contains("timed out"));
    assert_eq!(json["passed"], 1);
    assert_eq!(json["failed"], 3);
}

#[test]
fn fail_fast_stops_after_first_failure() {
    let fixtures = Fixtures::copy();
    let config = fixtures.path("broken.toml");
    let config = config.to_str().unwrap();

    let result = ecverify(
        &std::env::temp_dir(),
        &["run", "--config", config, "--json", "--fail-fast"],
    );
    result.assert_failure();
    assert_eq!(result.json()["scenarios"].as_array().unwrap().len(), 1);
}

#[test]
fn unknown_scenario_is_an_error() {
    let fixtures = Fixtures::copy();
    let config = fixtures.path("ecverify.toml");
    let config = config.to_str().unwrap();

    let result = ecverify(
        &std::env::temp_dir(),
        &["run", "--config", config, "--scenario", "astro-2"],
    );
    result.assert_error_contains("Unknown scenario: astro-2");
}

#[test]
fn missing_config_is_an_error() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = ecverify(temp.path(), &["run"]);
    result.assert_error_contains("Config file not found");
}

#[test]
fn list_shows_scenarios() {
    let fixtures = Fixtures::copy();
    let config = fixtures.path("ecverify.toml");

    Command::cargo_bin("ecverify")
        .unwrap()
        .args(["list", "--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("default"))
        .stdout(predicate::str::contains("inline-styles"))
        .stdout(predicate::str::contains("custom-paths"))
        .stdout(predicate::str::contains("inline styles"));
}

#[test]
fn check_validates_a_built_page() {
    let fixtures = Fixtures::copy();
    ecverify::build(&fixtures.descriptor("site-custom-paths")).unwrap();
    let page = fixtures.path("site-custom-paths/dist/index.html");

    Command::cargo_bin("ecverify")
        .unwrap()
        .args(["check", page.to_str().unwrap()])
        .args(["--base", "/subpath", "--assets-dir", "_custom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/subpath/_custom/"));

    Command::cargo_bin("ecverify")
        .unwrap()
        .args(["check", page.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unexpected styles markup"));
}

#[test]
fn check_many_components_first_block_only() {
    let fixtures = Fixtures::copy();
    ecverify::build(&fixtures.descriptor("site-default")).unwrap();
    let page = fixtures.path("site-default/dist/mdx-many-code-components/index.html");

    Command::cargo_bin("ecverify")
        .unwrap()
        .args(["check", page.to_str().unwrap()])
        .args(["--pattern", "many-blocks", "--code-blocks", "3", "--first-block-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("only the first code block"));
}

#[test]
fn base_path_collapses_slashes() {
    Command::cargo_bin("ecverify")
        .unwrap()
        .args(["base-path", "--base", "/subpath/", "--assets-dir", "_custom"])
        .assert()
        .success()
        .stdout("/subpath/_custom/\n");
}
