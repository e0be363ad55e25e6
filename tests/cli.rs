//! 端到端CLI测试
//!
//! Drives the built binary in a scratch project directory with the
//! registry and analysis credentials cleared from the environment.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const SCRUBBED_ENV: &[&str] = &[
    "SONAR_TOKEN",
    "SONAR_ORGANIZATION",
    "SONAR_HOST_URL",
    "S3_BUCKET_NAME",
    "AWS_BUCKET",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_REGION",
    "S3_ENDPOINT_URL",
    "LAMBDA_BASE_URL",
];

fn mcphub(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mcphub").expect("binary built");
    cmd.current_dir(project.path());
    cmd.env("HOME", project.path());
    cmd.env("RUST_LOG", "off");
    for name in SCRUBBED_ENV {
        cmd.env_remove(name);
    }
    cmd
}

fn init_project(project: &TempDir) {
    fs::write(project.path().join("server.py"), "print('hello')\n").unwrap();
    mcphub(project)
        .args([
            "init",
            "--yes",
            "--name",
            "WeatherMCP",
            "--version",
            "1.0.0",
            "--entrypoint",
            "server.py",
            "--repository",
            "https://github.com/acme-org/weather",
        ])
        .assert()
        .success();
}

#[test]
fn version_flag_prints_package_version() {
    let project = TempDir::new().unwrap();
    mcphub(&project)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_every_command() {
    let project = TempDir::new().unwrap();
    mcphub(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("pull"));
}

#[test]
#[serial]
fn init_with_yes_writes_descriptor() {
    let project = TempDir::new().unwrap();
    init_project(&project);

    let written = fs::read_to_string(project.path().join("mcphub.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["name"], "WeatherMCP");
    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["entrypoint"], "server.py");
    assert_eq!(value["repository"]["url"], "https://github.com/acme-org/weather");
}

#[test]
#[serial]
fn init_without_name_and_no_terminal_fails() {
    let project = TempDir::new().unwrap();
    mcphub(&project)
        .args(["init", "--yes"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--name"));
    assert!(!project.path().join("mcphub.json").exists());
}

#[test]
#[serial]
fn pull_without_invocation_base_is_a_config_error() {
    let project = TempDir::new().unwrap();
    mcphub(&project)
        .args(["pull", "--name", "WeatherMCP"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("LAMBDA_BASE_URL"));
}

#[test]
#[serial]
fn search_without_bucket_is_a_config_error() {
    let project = TempDir::new().unwrap();
    mcphub(&project)
        .args(["search", "--name", "WeatherMCP"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("S3_BUCKET_NAME"));
}

#[test]
#[serial]
fn push_with_unreachable_analysis_service_uploads_nothing() {
    let project = TempDir::new().unwrap();
    init_project(&project);

    let mut s3 = mockito::Server::new();
    let head = s3
        .mock("HEAD", "/registry/servers/WeatherMCP.json")
        .with_status(404)
        .expect(1)
        .create();
    let put = s3
        .mock("PUT", "/registry/servers/WeatherMCP.json")
        .expect(0)
        .create();

    mcphub(&project)
        .arg("push")
        .env("S3_BUCKET_NAME", "registry")
        .env("S3_ENDPOINT_URL", s3.url())
        .env("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE")
        .env("AWS_SECRET_ACCESS_KEY", "secret")
        .env("SONAR_TOKEN", "token")
        .env("SONAR_ORGANIZATION", "acme-org")
        .env("SONAR_HOST_URL", "http://127.0.0.1:9")
        .assert()
        .failure()
        .code(1);

    head.assert();
    put.assert();
}
