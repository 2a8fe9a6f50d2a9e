//! End-to-end tests for the `compose` command.
//!
//! These tests invoke the actual CLI binary and validate the behavior of the
//! `compose` subcommand from a user's perspective: YAML in, composed seed
//! documents out.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_input(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("input.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_compose_single_fragment_json_output() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = write_input(
        &temp,
        r##"
instance:
  cloud-init.user-data: "#cloud-config\nhostname: web01\n"
"##,
    );

    Command::cargo_bin("incus-seed")
        .unwrap()
        .arg("compose")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"user-data\""))
        .stdout(predicate::str::contains("hostname: web01"))
        .stdout(predicate::str::contains("\"vendor-data\": null"));
}

#[test]
fn test_compose_multiple_fragments_emit_container() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = write_input(
        &temp,
        r##"
profiles:
  - name: default
    config:
      user.user-data.hardening: "#cloud-config\nssh_pwauth: false\n"
instance:
  cloud-init.user-data: "#cloud-config\nhostname: web01\n"
"##,
    );

    Command::cargo_bin("incus-seed")
        .unwrap()
        .arg("compose")
        .arg(&input)
        .arg("--kind")
        .arg("user")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Content-Type: multipart/mixed; boundary=",
        ))
        .stdout(predicate::str::contains("Merge-Type: dict(recurse_array"))
        .stdout(predicate::str::contains("ssh_pwauth: false"))
        .stdout(predicate::str::contains("hostname: web01"));
}

#[test]
fn test_compose_reads_stdin() {
    Command::cargo_bin("incus-seed")
        .unwrap()
        .arg("compose")
        .write_stdin("instance:\n  user.vendor-data: \"#!/bin/sh\\ntrue\\n\"\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"vendor-data\""))
        .stdout(predicate::str::contains("/bin/sh"));
}

#[test]
fn test_compose_missing_instance_map_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = write_input(
        &temp,
        r#"
profiles:
  - name: default
    config:
      user.user-data: "orphaned"
"#,
    );

    Command::cargo_bin("incus-seed")
        .unwrap()
        .arg("compose")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Instance configuration is missing"));
}

#[test]
fn test_compose_invalid_yaml_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = write_input(&temp, "instance: [unclosed\n");

    Command::cargo_bin("incus-seed")
        .unwrap()
        .arg("compose")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse compose input"));
}

#[test]
fn test_compose_malformed_key_reported_but_succeeds() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = write_input(
        &temp,
        r#"
instance:
  user.user-data.: "dropped"
  user.user-data.kept: "kept"
"#,
    );

    Command::cargo_bin("incus-seed")
        .unwrap()
        .arg("compose")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("malformed-key"))
        .stdout(predicate::str::contains("kept"));
}

#[test]
fn test_compose_writes_output_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = write_input(
        &temp,
        r##"
instance:
  cloud-init.user-data: "#cloud-config\nx: 1\n"
"##,
    );
    let out = temp.path().join("seed.json");

    Command::cargo_bin("incus-seed")
        .unwrap()
        .arg("compose")
        .arg(&input)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"user-data\""));
}

#[test]
fn test_compose_byte_identical_across_runs() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = write_input(
        &temp,
        r##"
profiles:
  - name: base
    config:
      user.user-data.one: "#cloud-config\na: 1\n"
instance:
  cloud-init.user-data: "#cloud-config\nb: 2\n"
"##,
    );

    let run = || {
        Command::cargo_bin("incus-seed")
            .unwrap()
            .arg("compose")
            .arg(&input)
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}
