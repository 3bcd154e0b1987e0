// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 quillflow contributors

//! End-to-end tests of the quillflow binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn quillflow(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quillflow").unwrap();
    cmd.arg("-C")
        .arg(root)
        .env("NO_COLOR", "1")
        .env_remove("QUILLFLOW_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

fn run_logs(root: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(root.join("workroom"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with("run_log_") && n.ends_with(".md"))
        })
        .collect()
}

#[test]
fn dry_run_delivers_article_mentioning_topic() {
    let temp_dir = TempDir::new().unwrap();

    quillflow(temp_dir.path())
        .args(["example topic", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FINAL_ARTICLE.md"));

    let delivered = temp_dir.path().join("workroom/05_review/FINAL_ARTICLE.md");
    let content = std::fs::read_to_string(delivered).unwrap();
    assert!(content.contains("example topic"));

    let logs = run_logs(temp_dir.path());
    assert_eq!(logs.len(), 1);
    let log = std::fs::read_to_string(&logs[0]).unwrap();
    assert!(log.starts_with("# Run record — \"example topic\""));
    assert!(log.contains("Run result: success | stages completed: 14"));
}

#[test]
fn live_run_without_credentials_aborts_at_first_stage() {
    let temp_dir = TempDir::new().unwrap();
    let instructions = temp_dir.path().join("instructions");
    std::fs::create_dir_all(&instructions).unwrap();
    std::fs::write(instructions.join("01_persona.md"), "Design the reader persona.").unwrap();

    quillflow(temp_dir.path())
        .arg("example topic")
        .env_remove("ANTHROPIC_API_KEY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Stage 'persona' failed"))
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));

    assert!(!temp_dir.path().join("workroom/01_strategy/persona.md").exists());

    let logs = run_logs(temp_dir.path());
    assert_eq!(logs.len(), 1);
    let log = std::fs::read_to_string(&logs[0]).unwrap();
    assert_eq!(log.matches("[failed: ").count(), 1);
    assert!(log.contains("Run result: aborted | stages completed: 0"));
}

#[test]
fn missing_topic_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();

    quillflow(temp_dir.path())
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TOPIC>"));
}

#[test]
fn blank_topic_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    quillflow(temp_dir.path())
        .args(["   ", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-empty"));
}

#[test]
fn plan_prints_stage_graph_without_topic() {
    let temp_dir = TempDir::new().unwrap();

    quillflow(temp_dir.path())
        .args(["--plan", "mermaid"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph TD"))
        .stdout(predicate::str::contains("visuals -->|draft_v4_visuals.md| gatekeeper"));

    assert!(!temp_dir.path().join("workroom").exists());
}

#[test]
fn quiet_run_still_writes_record() {
    let temp_dir = TempDir::new().unwrap();

    quillflow(temp_dir.path())
        .args(["quiet topic", "--dry-run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strategist").not());

    assert_eq!(run_logs(temp_dir.path()).len(), 1);
}
