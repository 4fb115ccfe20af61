use assert_cmd::Command;
use predicates::prelude::*;
use tracing::info;

fn craftsman() -> Command {
    let mut cmd = Command::cargo_bin("craftsman").unwrap();
    // Keep a developer's local config out of the tests.
    cmd.env_remove("CRAFTSMAN_CONFIG").env_remove("CRAFTSMAN_SOLC_VERSION");
    cmd
}

#[test]
fn test_help_command() {
    craftsman_common::logging::ensure_test_logging(None);
    info!("Testing CLI help command");

    craftsman().arg("--help").assert().success().stdout(predicate::str::contains("Craftsman"));
}

#[test]
fn test_version_command() {
    craftsman_common::logging::ensure_test_logging(None);
    craftsman().arg("--version").assert().success().stdout(predicate::str::contains("craftsman"));
}

#[test]
fn test_compile_subcommand_help() {
    craftsman_common::logging::ensure_test_logging(None);
    craftsman()
        .arg("compile")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Compile Solidity files located under a directory"));
}

#[test]
fn test_missing_subcommand() {
    craftsman_common::logging::ensure_test_logging(None);
    craftsman().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_compile_requires_files() {
    craftsman_common::logging::ensure_test_logging(None);
    craftsman().arg("compile").arg("contracts").assert().failure();
}

#[test]
fn test_invalid_solc_version() {
    craftsman_common::logging::ensure_test_logging(None);
    craftsman()
        .args(["--solc-version", "not-a-version", "compile-source", "A.sol"])
        .assert()
        .failure();
}

#[test]
fn test_missing_file_exits_cleanly() {
    craftsman_common::logging::ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();
    info!("Compiling a missing file under {}", dir.path().display());

    craftsman()
        .current_dir(dir.path())
        .arg("compile")
        .arg(dir.path().to_str().unwrap())
        .arg("Missing.sol")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unreadable_source_exits_cleanly() {
    craftsman_common::logging::ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();

    craftsman()
        .current_dir(dir.path())
        .arg("compile-source")
        .arg("Missing.sol")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_malformed_config_fails() {
    craftsman_common::logging::ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("craftsman.toml"), "[compiler\n").unwrap();

    craftsman()
        .current_dir(dir.path())
        .args(["compile-source", "Missing.sol"])
        .assert()
        .failure();
}
