/*
 * cli.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * End-to-end tests for the xmlt binary.
 */

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const COMPACT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?><root id="1"><a>x</a><b><c>y</c></b></root>"#;

const FORMATTED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<root id="1">
    <a>x</a>

    <b>
        <c>y</c>
    </b>
</root>"#;

fn xmlt(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xmlt"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute xmlt")
}

fn write_input(dir: &Path, content: &str) -> String {
    let path = dir.join("input.xml");
    fs::write(&path, content).expect("Failed to write input");
    path.to_str().unwrap().to_string()
}

#[test]
fn test_fmt_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), COMPACT);

    let output = xmlt(&["fmt", &input]);
    assert!(output.status.success(), "Expected fmt to succeed");
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", FORMATTED));
}

#[test]
fn test_fmt_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), COMPACT);
    let target = dir.path().join("out.xml");

    let output = xmlt(&["fmt", &input, "-o", target.to_str().unwrap()]);
    assert!(output.status.success(), "Expected fmt to succeed");
    assert_eq!(fs::read_to_string(&target).unwrap(), FORMATTED);
}

#[test]
fn test_fmt_indent_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "<r><a>1</a></r>");

    let output = xmlt(&["fmt", &input, "--indent", "2"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\n  <a>1</a>\n"));
}

#[test]
fn test_fmt_refuses_non_xml_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), COMPACT);
    let target = dir.path().join("out.txt");

    let output = xmlt(&["fmt", &input, "-o", target.to_str().unwrap()]);
    assert!(!output.status.success(), "Expected fmt to fail");
    assert!(!target.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains(".xml extension"));
}

#[test]
fn test_fmt_keeps_latin1_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.xml");
    fs::write(
        &input,
        b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r><a>\xe9t\xe9</a></r>",
    )
    .unwrap();
    let target = dir.path().join("out.xml");

    let stdout = xmlt(&["fmt", input.to_str().unwrap()]);
    assert!(stdout.status.success(), "Expected fmt to succeed");
    assert!(stdout.stdout.ends_with(b"    <a>\xe9t\xe9</a>\n</r>\n"));

    let output = xmlt(&["fmt", input.to_str().unwrap(), "-o", target.to_str().unwrap()]);
    assert!(output.status.success(), "Expected fmt to succeed");
    let written = fs::read(&target).unwrap();
    assert_eq!(written.as_slice(), &stdout.stdout[..stdout.stdout.len() - 1]);
}

#[test]
fn test_check_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), COMPACT);

    let output = xmlt(&["check", &input, "--json"]);
    assert!(output.status.success(), "Expected check to succeed");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Failed to parse JSON from stdout");
    assert_eq!(json["root"], "root");
    assert_eq!(json["elements"], 4);
    assert_eq!(json["depth"], 3);
    assert_eq!(json["declaration"]["version"], "1.0");
    assert_eq!(json["declaration"]["system_id"], input.as_str());
}

#[test]
fn test_check_malformed_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "<root><a></root>");

    let output = xmlt(&["check", &input]);
    assert!(!output.status.success(), "Expected check to fail");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse"));
}

#[test]
fn test_strict_flag_rejects_mixed_content() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "<p>text<b>bold</b></p>");

    assert!(xmlt(&["check", &input]).status.success());
    assert!(!xmlt(&["check", &input, "--strict"]).status.success());
}
