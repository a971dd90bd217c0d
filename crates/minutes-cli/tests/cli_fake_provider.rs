use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SUMMARY: &str =
    "**Meeting Notes**\n- Ship on Friday.\n\n**Action Items**\n- [ ] Speaker 2: release notes";

fn verdict() -> String {
    json!({
        "accuracy": {"score": 9, "reasoning": "Release notes attributed to Speaker 2."},
        "completeness": {"score": 8, "reasoning": "Ship date captured."},
        "coverage": {"score": 8, "reasoning": "Both threads covered."},
        "structure": {"score": 10, "reasoning": "Both section headers present."},
        "overallScore": 9,
        "overallComment": "Faithful summary."
    })
    .to_string()
}

/// Workspace with a fake-provider config. YAML accepts JSON, so the config
/// is written as JSON to keep the embedded payload readable.
fn workspace(summary: Option<&str>, evaluation: Option<&str>) -> TempDir {
    let dir = tempdir().unwrap();
    let cfg = json!({
        "provider": {
            "kind": "fake",
            "fake": { "summary": summary, "evaluation": evaluation }
        }
    });
    fs::write(dir.path().join("minutes.yaml"), cfg.to_string()).unwrap();
    fs::write(
        dir.path().join("transcript.txt"),
        "Speaker 1: We will ship on Friday. Speaker 2: I will write the release notes.",
    )
    .unwrap();
    fs::write(dir.path().join("summary.md"), SUMMARY).unwrap();
    dir
}

fn minutes(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("minutes").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("MINUTES_CONFIG");
    cmd
}

#[test]
fn sample_prints_builtin_transcript() {
    let dir = tempdir().unwrap();
    minutes(dir.path())
        .arg("sample")
        .assert()
        .success()
        .stdout(predicate::str::contains("October 15th"));
}

#[test]
fn run_json_contains_summary_and_evaluation() {
    let dir = workspace(Some(SUMMARY), Some(&verdict()));
    let out = minutes(dir.path())
        .args(["run", "--transcript", "transcript.txt", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["summary"], SUMMARY);
    assert_eq!(doc["evaluation"]["accuracy"]["score"], 9);
    assert_eq!(doc["evaluation"]["overallComment"], "Faithful summary.");
    assert_eq!(doc["edited"], false);
}

#[test]
fn set_overrides_are_committed_unclamped() {
    let dir = workspace(Some(SUMMARY), Some(&verdict()));
    let out = minutes(dir.path())
        .args([
            "evaluate",
            "-t",
            "transcript.txt",
            "-s",
            "summary.md",
            "--json",
            "--set",
            "coverage.score=12",
            "--set",
            "overall.comment=Checked by hand.",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["edited"], true);
    assert_eq!(doc["evaluation"]["coverage"]["score"], 12);
    assert_eq!(doc["evaluation"]["coverage"]["reasoning"], "Both threads covered.");
    assert_eq!(doc["evaluation"]["overallComment"], "Checked by hand.");
    assert_eq!(doc["evaluation"]["overallScore"], 9);
}

#[test]
fn text_scorecard_and_summary_file() {
    let dir = workspace(Some(SUMMARY), Some(&verdict()));
    minutes(dir.path())
        .args(["run", "--sample", "--summary-out", "out.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Judge's Scorecard"))
        .stdout(predicate::str::contains("Structure"))
        .stdout(predicate::str::contains("Verdict: Faithful summary."));
    assert_eq!(fs::read_to_string(dir.path().join("out.md")).unwrap(), SUMMARY);
}

#[test]
fn summarize_reads_stdin() {
    let dir = workspace(Some(SUMMARY), None);
    minutes(dir.path())
        .args(["summarize", "--transcript", "-"])
        .write_stdin("Speaker 1: hello")
        .assert()
        .success()
        .stdout(predicate::str::contains("**Action Items**"));
}

#[test]
fn invalid_judge_payload_is_a_stage_failure() {
    let dir = workspace(Some(SUMMARY), Some("{\"accuracy\": {\"score\": 9}}"));
    minutes(dir.path())
        .args(["evaluate", "-t", "transcript.txt", "-s", "summary.md"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to evaluate the summary"));
}

#[test]
fn missing_generation_response_is_a_stage_failure() {
    let dir = workspace(None, Some(&verdict()));
    minutes(dir.path())
        .args(["run", "-t", "transcript.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to generate summary"));
}

#[test]
fn blank_transcript_is_rejected() {
    let dir = workspace(Some(SUMMARY), Some(&verdict()));
    fs::write(dir.path().join("blank.txt"), "   \n").unwrap();
    minutes(dir.path())
        .args(["summarize", "-t", "blank.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("transcript is blank"));
}

#[test]
fn unknown_config_key_is_a_config_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.yaml"), "provdier:\n  kind: fake\n").unwrap();
    fs::write(dir.path().join("t.txt"), "Speaker 1: hi").unwrap();
    minutes(dir.path())
        .args(["--config", "bad.yaml", "summarize", "-t", "t.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn openai_without_api_key_is_a_config_error() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("minutes.yaml"),
        "provider:\n  api_key_env: MINUTES_CLI_TEST_NO_KEY\n",
    )
    .unwrap();
    fs::write(dir.path().join("t.txt"), "Speaker 1: hi").unwrap();
    minutes(dir.path())
        .env_remove("MINUTES_CLI_TEST_NO_KEY")
        .args(["summarize", "-t", "t.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MINUTES_CLI_TEST_NO_KEY"));
}

#[test]
fn bad_set_syntax_is_a_usage_error() {
    let dir = workspace(Some(SUMMARY), Some(&verdict()));
    minutes(dir.path())
        .args(["evaluate", "-t", "transcript.txt", "-s", "summary.md", "--set", "tone=3"])
        .assert()
        .code(2);
}

#[test]
fn transcript_and_summary_cannot_both_come_from_stdin() {
    let dir = workspace(Some(SUMMARY), Some(&verdict()));
    minutes(dir.path())
        .args(["evaluate", "-t", "-", "-s", "-"])
        .write_stdin("Speaker 1: hi")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot both read stdin"));
}
