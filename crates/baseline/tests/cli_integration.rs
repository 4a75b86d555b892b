//! Integration tests that run the baseline binary

mod common;

use std::process::Command;

fn baseline_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_baseline"))
}

/// Run with an isolated config so a developer's own config never leaks in
fn baseline_with_config(config: &std::path::Path) -> Command {
    let mut cmd = baseline_bin();
    cmd.arg("-c").arg(config);
    cmd
}

#[test]
fn test_analyze_text() {
    let temp = tempfile::tempdir().unwrap();
    let output = baseline_with_config(&temp.path().join("missing.yaml"))
        .arg("analyze")
        .arg(common::source_fixtures_dir().join("layout.css"))
        .output()
        .expect("Failed to run baseline");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Command should succeed: {}", stderr);

    assert!(stdout.contains("layout.css"));
    assert!(stdout.contains("85"), "Should report score 85: {}", stdout);
    assert!(stdout.contains("display: grid"));
    assert!(stdout.contains("word-break: auto-phrase"));
}

#[test]
fn test_analyze_json_with_explicit_language() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("snippet.txt");
    std::fs::write(&source, "const x = arr.at(-1);\n").unwrap();

    let output = baseline_with_config(&temp.path().join("missing.yaml"))
        .arg("analyze")
        .arg(&source)
        .arg("--language")
        .arg("js")
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to run baseline");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["score"], 60);
    assert_eq!(json["issues"][0]["feature"], "Array.prototype.at");
}

#[test]
fn test_analyze_uses_configured_weights() {
    let output = baseline_with_config(&common::fixtures_dir().join("config.yaml"))
        .arg("analyze")
        .arg(common::source_fixtures_dir().join("layout.css"))
        .arg("-f")
        .arg("json")
        .output()
        .expect("Failed to run baseline");

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // (6 * 1.0 + 0.7 + 0.0) / 8 = 0.8375
    assert_eq!(json["score"], 84);
}

#[test]
fn test_analyze_parse_error_warns() {
    let output = baseline_bin()
        .arg("-c")
        .arg("/nonexistent/config.yaml")
        .arg("analyze")
        .arg(common::source_fixtures_dir().join("broken.js"))
        .output()
        .expect("Failed to run baseline");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not be parsed"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_fails() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.yaml");
    std::fs::write(&config, "weights:\n  limited: 0.9\n").unwrap();

    let output = baseline_with_config(&config)
        .arg("analyze")
        .arg(common::source_fixtures_dir().join("layout.css"))
        .output()
        .expect("Failed to run baseline");

    assert!(!output.status.success());
}

#[test]
fn test_scan_requires_owner_and_repo() {
    let temp = tempfile::tempdir().unwrap();
    let output = baseline_with_config(&temp.path().join("missing.yaml"))
        .arg("scan")
        .arg("just-a-name")
        .output()
        .expect("Failed to run baseline");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("owner/repo"), "stderr: {}", stderr);
}

#[test]
fn test_scan_without_token_fails() {
    let output = baseline_with_config(&common::fixtures_dir().join("config.yaml"))
        .arg("scan")
        .arg("octo/site")
        .env_remove("BASELINE_TEST_TOKEN_UNSET")
        .output()
        .expect("Failed to run baseline");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("requires authentication"),
        "stderr: {}",
        stderr
    );
}
