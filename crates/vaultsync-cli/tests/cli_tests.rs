//! Integration tests for the `vaultsync` CLI binary.
//!
//! These tests exercise the CLI as a subprocess, verifying exit codes,
//! output, and file-system side effects. None of them need a reachable
//! vault: vault commands are only checked for their failure paths.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const ORG: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";
const PROJECT: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

/// Helper: locate the `vaultsync` binary built by `cargo test`.
fn vaultsync_bin() -> String {
    let path = env!("CARGO_BIN_EXE_vaultsync");
    assert!(
        Path::new(path).exists(),
        "vaultsync binary not found at {path}"
    );
    path.to_owned()
}

/// Helper: a command with every vault variable cleared, run inside `dir`.
fn command(dir: &Path) -> Command {
    let mut cmd = Command::new(vaultsync_bin());
    cmd.current_dir(dir)
        .env_remove("BW_ACCESS_TOKEN")
        .env_remove("ORGANIZATION_ID")
        .env_remove("BW_PROJECT_ID")
        .env_remove("BW_API_URL")
        .env_remove("BW_IDENTITY_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: run vaultsync with args and return (`exit_code`, stdout, stderr).
fn run_in(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output: Output = command(dir)
        .args(args)
        .output()
        .expect("failed to execute vaultsync");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn run(args: &[&str]) -> (i32, String, String) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    run_in(dir.path(), args)
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0, "vaultsync --version should exit 0");
    assert!(stdout.contains("vaultsync"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0, "vaultsync --help should exit 0");
    for sub in [
        "get-secret",
        "create-secret",
        "sync-secrets",
        "list-secrets",
        "local-secrets",
        "push-secrets",
        "convert-to-env",
        "convert-to-json",
        "convert-to-json-formatted",
    ] {
        assert!(stdout.contains(sub), "help should list '{sub}': {stdout}");
    }
}

#[test]
fn test_formatted_conversion_requires_project_and_env() {
    let (code, _, stderr) = run(&["convert-to-json-formatted"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--project"), "should name missing arg: {stderr}");
}

// ── Conversions (offline) ────────────────────────────────────────────

#[test]
fn test_convert_to_env_writes_metadata_comments() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("secrets.json");
    let env = dir.path().join("out").join("secrets.env");
    fs::write(
        &json,
        r#"[
  {"id": "id-1", "key": "API_KEY", "value": "sk=1", "note": "line one\nline two"},
  {"id": "id-2", "key": "EMPTY_NOTE", "value": "x", "note": null}
]"#,
    )
    .unwrap();

    let (code, stdout, stderr) = run_in(
        dir.path(),
        &[
            "convert-to-env",
            "--json-file",
            json.to_str().unwrap(),
            "--env-file",
            env.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Converted"), "stdout: {stdout}");

    let text = fs::read_to_string(&env).unwrap();
    assert_eq!(
        text,
        "API_KEY=sk=1\n# ID: id-1\n# Note: line one\n# Note: line two\n\n\
         EMPTY_NOTE=x\n# ID: id-2\n\n"
    );
}

#[test]
fn test_env_round_trip_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    let env = dir.path().join("secrets.env");
    let json = dir.path().join("secrets.json");
    fs::write(
        &env,
        "DB_URL=postgres://u:p@h/db?a=b\n# ID: id-9\n# Note: primary\n# Note: rotate monthly\n\nPLAIN=1\n",
    )
    .unwrap();

    let (code, _, stderr) = run_in(
        dir.path(),
        &[
            "convert-to-json",
            "--env-file",
            env.to_str().unwrap(),
            "--json-file",
            json.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {stderr}");

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(records[0]["id"], "id-9");
    assert_eq!(records[0]["value"], "postgres://u:p@h/db?a=b");
    assert_eq!(records[0]["note"], "primary\nrotate monthly");
    assert_eq!(records[1]["key"], "PLAIN");
    assert!(records[1]["id"].as_str().unwrap().starts_with("local-"));
}

#[test]
fn test_convert_to_json_formatted_namespaces_keys() {
    let dir = tempfile::tempdir().unwrap();
    let env = dir.path().join(".env");
    let json = dir.path().join("formatted.json");
    fs::write(&env, "# Stripe key\nAPI_KEY=abc\n// skip me\nDEBUG=true\n").unwrap();

    let (code, _, stderr) = run_in(
        dir.path(),
        &[
            "convert-to-json-formatted",
            "--project",
            "myapp",
            "--env",
            "dev",
            "--env-file",
            env.to_str().unwrap(),
            "--json-file",
            json.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {stderr}");

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["key"], "MYAPP/DEV/API_KEY");
    assert_eq!(records[0]["value"], "abc");
    let note = records[0]["note"].as_str().unwrap();
    assert!(note.contains("PROJECT: MYAPP"));
    assert!(note.contains("ENV: DEV"));
    assert!(note.ends_with("Stripe key"));
    assert!(records[0].get("id").is_none());
    assert_eq!(records[1]["key"], "MYAPP/DEV/DEBUG");
}

#[test]
fn test_missing_source_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_in(dir.path(), &["convert-to-env"]);
    assert_eq!(code, 0, "missing source should not fail");
    assert!(stdout.contains("nothing converted"), "stdout: {stdout}");
    assert!(!dir.path().join("data").join("secrets.env").exists());
}

#[test]
fn test_default_paths_are_under_data() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(
        dir.path().join("data").join("secrets.json"),
        r#"[{"id": "1", "key": "K", "value": "v", "note": ""}]"#,
    )
    .unwrap();

    let (code, _, stderr) = run_in(dir.path(), &["convert-to-env"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(
        fs::read_to_string(dir.path().join("data").join("secrets.env")).unwrap(),
        "K=v\n# ID: 1\n\n"
    );
}

#[test]
fn test_malformed_json_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("bad.json");
    fs::write(&json, "{ nope").unwrap();

    let (code, _, stderr) = run_in(
        dir.path(),
        &["convert-to-env", "--json-file", json.to_str().unwrap()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("Error"), "stderr: {stderr}");
}

// ── Local cache (offline) ────────────────────────────────────────────

#[test]
fn test_local_secrets_before_sync_fails() {
    let (code, _, stderr) = run(&["local-secrets"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn test_local_secrets_lists_cached_keys() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache.json");
    fs::write(
        &cache,
        r#"[{"id": "1", "key": "ALPHA", "value": "a"}, {"id": "2", "key": "BETA", "value": "b"}]"#,
    )
    .unwrap();

    let (code, stdout, stderr) = run_in(
        dir.path(),
        &["local-secrets", "--json-file", cache.to_str().unwrap()],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("ALPHA"));
    assert!(stdout.contains("BETA"));
}

// ── Vault commands (failure paths) ───────────────────────────────────

#[test]
fn test_vault_command_without_token_fails() {
    let (code, _, stderr) = run(&["get-secret", "API_KEY"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("BW_ACCESS_TOKEN"), "stderr: {stderr}");
}

#[test]
fn test_vault_command_with_malformed_organization_fails() {
    let (code, _, stderr) = run(&[
        "list-secrets",
        "--access-token",
        "t",
        "--organization-id",
        "not-a-uuid",
        "--project-id",
        PROJECT,
    ]);
    assert_eq!(code, 1);
    assert!(stderr.contains("UUID"), "stderr: {stderr}");
}

#[test]
fn test_failed_sync_leaves_no_cache() {
    let dir = tempfile::tempdir().unwrap();
    let output = command(dir.path())
        .args(["sync-secrets"])
        .env("BW_ACCESS_TOKEN", "test-token")
        .env("ORGANIZATION_ID", ORG)
        .env("BW_PROJECT_ID", PROJECT)
        .env("BW_API_URL", "http://127.0.0.1:9")
        .output()
        .expect("failed to execute vaultsync");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to sync"), "stderr: {stderr}");
    assert!(!dir.path().join("data").join("secrets.json").exists());
}

#[test]
fn test_push_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = command(dir.path())
        .args(["push-secrets", "--json-file", "missing.json"])
        .env("BW_ACCESS_TOKEN", "test-token")
        .env("ORGANIZATION_ID", ORG)
        .env("BW_PROJECT_ID", PROJECT)
        .output()
        .expect("failed to execute vaultsync");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file not found"), "stderr: {stderr}");
}

#[test]
fn test_push_defaults_to_formatted_file_not_cache() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(
        dir.path().join("data").join("secrets.json"),
        r#"[{"id": "1", "key": "K", "value": "v", "note": ""}]"#,
    )
    .unwrap();

    let output = command(dir.path())
        .args(["push-secrets"])
        .env("BW_ACCESS_TOKEN", "test-token")
        .env("ORGANIZATION_ID", ORG)
        .env("BW_PROJECT_ID", PROJECT)
        .env("BW_API_URL", "http://127.0.0.1:9")
        .output()
        .expect("failed to execute vaultsync");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file not found"), "stderr: {stderr}");
    assert!(stderr.contains("formatted.json"), "stderr: {stderr}");
}
