//! CLI command integration tests.
//! Each test writes its Narsese inputs into a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn nar_cmd() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("nar").unwrap()
}

#[test]
fn run_answers_question_from_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("birds.nars");
    std::fs::write(
        &input,
        "// beliefs, then a question\n\
         <bird --> fly>. %0.9;0.9%\n\
         <bird --> fly>?\n",
    )
    .unwrap();

    nar_cmd()
        .args(["run", "--seed", "42"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer: <bird --> fly>."))
        .stdout(predicate::str::contains("2 inputs"));
}

#[test]
fn run_with_cycles_reports_derivations() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("chain.nars");
    std::fs::write(&input, "<bird --> fly>.\n<fly --> animal>.\n").unwrap();

    nar_cmd()
        .args(["run", "--seed", "42", "--cycles", "20"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("ran 20 cycles"))
        .stdout(predicate::str::contains("concepts:"));
}

#[test]
fn run_skips_malformed_lines() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("mixed.nars");
    std::fs::write(&input, "<bird --> fly>.\nthis is not narsese at all!\n").unwrap();

    nar_cmd()
        .args(["run", "--seed", "42"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 inputs"));
}

#[test]
fn run_snapshot_emits_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("one.nars");
    std::fs::write(&input, "<bird --> fly>.\n").unwrap();

    nar_cmd()
        .args(["run", "--seed", "42", "--snapshot"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"<bird --> fly>\""))
        .stdout(predicate::str::contains("\"beliefs\": 1"));
}

#[test]
fn run_missing_file_fails() {
    nar_cmd()
        .args(["run", "does-not-exist.nars"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn rules_lists_default_blocks() {
    nar_cmd()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("[immediate]"))
        .stdout(predicate::str::contains("[nal1]"))
        .stdout(predicate::str::contains("deduction"));
}

#[test]
fn rules_from_custom_table() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("custom.rules");
    std::fs::write(&table, "[mine]\n<S --> P> |- <P --> S> .conversion\n").unwrap();

    nar_cmd()
        .arg("rules")
        .arg("--rules")
        .arg(&table)
        .assert()
        .success()
        .stdout(predicate::str::contains("[mine]"))
        .stdout(predicate::str::contains("conversion"));
}

#[test]
fn malformed_rule_table_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("broken.rules");
    std::fs::write(&table, "rule outside any block |- x .oops\n").unwrap();

    nar_cmd()
        .arg("rules")
        .arg("--rules")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rule table"));
}

#[test]
fn repl_session_over_stdin() {
    nar_cmd()
        .args(["repl", "--seed", "42"])
        .write_stdin("<bird --> fly>. %0.9;0.9%\n<bird --> fly>?\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Answer: <bird --> fly>."));
}

#[test]
fn repl_reports_parse_errors() {
    nar_cmd()
        .args(["repl", "--seed", "42"])
        .write_stdin("<bird fly>.\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("error:"));
}
