// ABOUTME: End-to-end tests driving the compiled `lox` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn lox_script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp script file");
    write!(file, "{contents}").expect("failed to write temp script file");
    file
}

#[test]
fn runs_a_script_and_exits_zero() {
    let script = lox_script("print 1 + 2 * 3;");

    Command::cargo_bin("lox")
        .unwrap()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("7\n"));
}

#[test]
fn runtime_error_exits_70_with_empty_stdout() {
    let script = lox_script(r#"print "a" - 1;"#);

    Command::cargo_bin("lox")
        .unwrap()
        .arg(script.path())
        .assert()
        .code(70)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("operands must be"));
}

#[test]
fn compile_error_exits_64() {
    let script = lox_script("print 1 +;");

    Command::cargo_bin("lox")
        .unwrap()
        .arg(script.path())
        .assert()
        .code(64);
}

#[test]
fn missing_file_exits_65() {
    Command::cargo_bin("lox")
        .unwrap()
        .arg("/nonexistent/path/to/script.lox")
        .assert()
        .code(65);
}

#[test]
fn class_and_inheritance_scenario_end_to_end() {
    let script = lox_script(
        r#"
        class A { speak() { print "A"; } }
        class B < A { speak() { super.speak(); print "B"; } }
        B().speak();
        "#,
    );

    Command::cargo_bin("lox")
        .unwrap()
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::diff("A\nB\n"));
}

#[test]
fn version_flag_reports_a_version() {
    Command::cargo_bin("lox")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lox"));
}
