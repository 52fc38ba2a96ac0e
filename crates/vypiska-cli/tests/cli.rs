//! Command-line behaviour of the `vypiska` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn vypiska() -> Command {
    Command::cargo_bin("vypiska").unwrap()
}

#[test]
fn test_help_lists_commands() {
    vypiska()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_parse_missing_file() {
    vypiska()
        .args(["parse", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_parse_rejects_non_pdf() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("statement.txt");
    std::fs::write(&path, "01.03.2024 100,00 ₽").unwrap();

    vypiska()
        .arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("only PDF statements"));
}

#[test]
fn test_parse_rejects_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.pdf");
    std::fs::write(&path, b"").unwrap();

    vypiska()
        .arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file is empty"));
}

#[test]
fn test_parse_unreadable_pdf() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"%PDF-1.4 this is not really a pdf").unwrap();

    vypiska()
        .arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("PDF error"));
}

#[test]
fn test_batch_without_matches() {
    let dir = tempdir().unwrap();
    let pattern = dir.path().join("*.pdf");

    vypiska()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn test_batch_continue_on_error_writes_summary() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"garbage").unwrap();
    std::fs::write(dir.path().join("b.pdf"), b"").unwrap();
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.pdf");

    vypiska()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .arg("--continue-on-error")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 successful, 2 failed"));

    let summary = std::fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,bank_name"));
    assert!(summary.contains("a.pdf,error"));
    assert!(summary.contains("b.pdf,error"));
}

#[test]
fn test_config_init_and_get() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");

    vypiska()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    vypiska()
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.fallback_page_limit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("99"));

    vypiska()
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
