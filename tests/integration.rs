use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_cvforge")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> serde_json::Value {
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

// -- stdin mode --

#[test]
fn stdin_mode_html() {
    let assert = cmd()
        .args(["-f", "html"])
        .write_stdin(fixture("structured.txt"))
        .assert()
        .success();
    let html = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(html.starts_with("<div style=\"width:816px"));
    assert!(html.contains("Grew revenue by <strong>35%</strong>"));
    assert!(html.contains("Shipped X &amp; Y"));
    assert!(!html.contains("**"));
}

#[test]
fn stdin_mode_html_modern_layout() {
    cmd()
        .args(["-f", "html", "--layout", "modern"])
        .write_stdin(fixture("structured.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("<aside"))
        .stdout(predicate::str::contains("Stanford University"));
}

#[test]
fn stdin_mode_docx_is_a_zip() {
    let assert = cmd().write_stdin(fixture("structured.txt")).assert().success();
    assert!(assert.get_output().stdout.starts_with(b"PK"));
}

#[test]
fn stdin_mode_preview_structured() {
    let assert = cmd()
        .args(["-f", "preview"])
        .write_stdin(fixture("structured.txt"))
        .assert()
        .success();
    let value = stdout_json(&assert);
    assert_eq!(value["mode"], "structured");
    assert_eq!(value["root"]["role"], "document");
}

#[test]
fn stdin_mode_model_dump() {
    let assert = cmd()
        .args(["-f", "model"])
        .write_stdin(fixture("structured.txt"))
        .assert()
        .success();
    let value = stdout_json(&assert);
    assert_eq!(value["mode"], "structured");
    assert_eq!(value["document"]["name"], "Jane Doe");
    let dump = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(dump.contains("Grew revenue by 35%"));
    assert!(!dump.contains("**"));
}

#[test]
fn unstructured_input_falls_back_to_raw() {
    let assert = cmd()
        .args(["-f", "preview"])
        .write_stdin(fixture("unstructured.txt"))
        .assert()
        .success();
    assert_eq!(stdout_json(&assert)["mode"], "raw");

    cmd()
        .args(["-f", "html"])
        .write_stdin(fixture("unstructured.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("<li>world</li>"))
        .stdout(predicate::str::contains("some closing remarks"));
}

#[test]
fn mode_override_forces_raw() {
    let assert = cmd()
        .args(["-f", "model", "--mode", "raw"])
        .write_stdin(fixture("structured.txt"))
        .assert()
        .success();
    assert_eq!(stdout_json(&assert)["mode"], "raw");
}

#[test]
fn revised_preview_shows_both_versions() {
    let assert = cmd()
        .args(["-f", "preview", "--revised", &fixture_path("revised.txt")])
        .write_stdin(fixture("structured.txt"))
        .assert()
        .success();
    let value = stdout_json(&assert);
    assert_eq!(value["before"]["mode"], "structured");
    assert_eq!(value["after"]["mode"], "structured");
    let after = value["after"].to_string();
    assert!(after.contains("pricing experiments"));
    assert!(!value["before"].to_string().contains("pricing experiments"));
}

#[test]
fn revised_version_is_exported() {
    cmd()
        .args(["-f", "html", "--revised", &fixture_path("revised.txt")])
        .write_stdin(fixture("structured.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("pricing experiments"));
}

// -- configuration --

#[test]
fn lexicon_file_adds_header_synonyms() {
    let input = "Jane Doe\nBerufserfahrung\nSenior PM\nAcme Corp | 2020 - Present\n• Shipped X\n";

    let assert = cmd()
        .args(["-f", "model"])
        .write_stdin(input)
        .assert()
        .success();
    assert_eq!(stdout_json(&assert)["mode"], "raw");

    let mut lexicon = NamedTempFile::new().unwrap();
    write!(lexicon, r#"{{"experience_headers": ["Berufserfahrung"]}}"#).unwrap();
    let assert = cmd()
        .args(["-f", "model", "--lexicon"])
        .arg(lexicon.path())
        .write_stdin(input)
        .assert()
        .success();
    let value = stdout_json(&assert);
    assert_eq!(value["mode"], "structured");
    assert_eq!(value["document"]["sections"][0]["kind"], "experience");
}

#[test]
fn invalid_lexicon_fails() {
    let mut lexicon = NamedTempFile::new().unwrap();
    write!(lexicon, r#"{{"role_wordz": ["x"]}}"#).unwrap();
    cmd()
        .args(["--lexicon"])
        .arg(lexicon.path())
        .write_stdin("Jane Doe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid lexicon"));
}

#[test]
fn unknown_format_fails() {
    cmd()
        .args(["-f", "pdf"])
        .write_stdin("Jane Doe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: pdf"));
}

#[test]
fn unknown_layout_fails() {
    cmd()
        .args(["--layout", "fancy"])
        .write_stdin("Jane Doe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown layout"));
}

#[test]
fn empty_input_still_renders() {
    cmd()
        .args(["-f", "html"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<div"));
}

// -- file mode --

#[test]
fn file_mode_single_input() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("structured.txt"))
        .assert()
        .success();

    let bytes = std::fs::read(dir.path().join("optimized-resume.docx")).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn file_mode_multiple_inputs_get_directories() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-f", "html", "-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("structured.txt"))
        .arg(fixture_path("unstructured.txt"))
        .assert()
        .success();

    assert!(dir.path().join("structured/optimized-resume.html").exists());
    assert!(dir.path().join("unstructured/optimized-resume.html").exists());
}

#[test]
fn file_mode_requires_output() {
    cmd()
        .arg(fixture_path("structured.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn file_mode_directory_input() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), fixture("structured.txt")).unwrap();
    std::fs::write(dir.path().join("b.md"), fixture("unstructured.txt")).unwrap();
    std::fs::write(dir.path().join("notes.pdf"), "not a résumé").unwrap();

    cmd()
        .args(["-f", "preview", "-o", out.path().to_str().unwrap()])
        .arg(dir.path())
        .assert()
        .success();

    assert!(out.path().join("a/optimized-resume.json").exists());
    assert!(out.path().join("b/optimized-resume.json").exists());
    assert!(!out.path().join("notes").exists());
}

#[test]
fn file_mode_revised_needs_one_input() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "--revised", &fixture_path("revised.txt")])
        .arg(fixture_path("structured.txt"))
        .arg(fixture_path("unstructured.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly one input file"));
}

#[test]
fn file_mode_no_matches_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(format!("{}/nothing-*.txt", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input files found"));
}
