//! Smoke tests for the runepkg binary.

mod common;

use assert_cmd::Command;
use common::{DebBuilder, TestEnv};
use predicates::prelude::*;

fn runepkg(env: &TestEnv) -> Command {
    let config = env.write_config();
    let mut cmd = Command::cargo_bin("runepkg").expect("binary builds");
    cmd.env("RUNEPKG_CONFIG_PATH", config);
    cmd
}

#[test]
fn list_on_empty_database_succeeds() {
    let env = TestEnv::new();
    runepkg(&env)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("no packages installed"));
}

#[test]
fn install_then_list_and_status() {
    let env = TestEnv::new();
    let deb = DebBuilder::new("hello", "2.12-1")
        .arch("amd64")
        .file("usr/bin/hello", b"#!/bin/sh\n", 0o755)
        .write_to(&env.debs_dir());

    runepkg(&env)
        .args(["install", deb.to_str().unwrap()])
        .assert()
        .success();

    runepkg(&env)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-2.12-1"));

    runepkg(&env)
        .args(["status", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("amd64"));
}

#[test]
fn status_of_unknown_package_exits_2() {
    let env = TestEnv::new();
    runepkg(&env).args(["status", "ghost"]).assert().code(2);
}

#[test]
fn remove_with_ambiguous_prefix_exits_2() {
    let env = TestEnv::new();
    for (name, version) in [("libssl", "1.1.1"), ("libssl3", "3.0")] {
        let deb = DebBuilder::new(name, version)
            .file(&format!("usr/lib/{name}.so"), b"so", 0o644)
            .write_to(&env.debs_dir());
        runepkg(&env)
            .args(["install", deb.to_str().unwrap()])
            .assert()
            .success();
    }

    runepkg(&env)
        .args(["remove", "libssl"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("libssl-1.1.1"))
        .stdout(predicate::str::contains("libssl3-3.0"));
}

#[test]
fn install_from_stdin_list() {
    let env = TestEnv::new();
    let deb = DebBuilder::new("hello", "1.0")
        .file("usr/bin/hello", b"x", 0o755)
        .write_to(&env.debs_dir());

    runepkg(&env)
        .args(["install", "-"])
        .write_stdin(format!("{}\n", deb.display()))
        .assert()
        .success();

    runepkg(&env)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-1.0"));
}

#[test]
fn missing_config_is_fatal() {
    let mut cmd = Command::cargo_bin("runepkg").expect("binary builds");
    cmd.env("RUNEPKG_CONFIG_PATH", "/nonexistent/runepkgconfig")
        .arg("list")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn unsatisfied_dependency_exits_nonzero() {
    let env = TestEnv::new();
    let deb = DebBuilder::new("a", "1.0")
        .depends("b (>= 1.0)")
        .file("usr/share/a/data", b"a", 0o644)
        .write_to(&env.debs_dir());

    runepkg(&env)
        .args(["install", deb.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("b (>= 1.0)"));
}
