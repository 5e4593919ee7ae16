use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const CONFIG_YAML: &str = "name: \"svc-a\"\nruntime:\n  environment: \"prod\"\n";

/// Run the binary from `cwd` with a scrubbed set of override variables.
fn strata(cwd: &Path, args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_strata"));
    command
        .current_dir(cwd)
        .args(args)
        .env_remove("NAME")
        .env_remove("RUNTIME_ENVIRONMENT")
        .env_remove("RUST_LOG");
    for (name, value) in vars {
        command.env(name, value);
    }
    command.output().expect("run strata")
}

fn write_default_config(root: &Path, contents: &str) {
    let dir = root.join("env");
    fs::create_dir_all(&dir).expect("dir");
    fs::write(dir.join("config.yaml"), contents).expect("write");
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn prints_name_from_default_config_path() {
    let temp = TempDir::new().expect("tmp");
    write_default_config(temp.path(), CONFIG_YAML);

    let output = strata(temp.path(), &[], &[]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "Config: svc-a\n");
}

#[test]
fn json_output_reflects_environment_override() {
    let temp = TempDir::new().expect("tmp");
    write_default_config(temp.path(), CONFIG_YAML);

    let output = strata(
        temp.path(),
        &["--json"],
        &[("RUNTIME_ENVIRONMENT", "staging")],
    );
    assert!(output.status.success(), "{output:?}");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(
        value,
        serde_json::json!({ "name": "svc-a", "runtime": { "environment": "staging" } })
    );
}

#[test]
fn unknown_key_fails_startup() {
    let temp = TempDir::new().expect("tmp");
    write_default_config(temp.path(), &format!("{CONFIG_YAML}unexpected: 1\n"));

    let output = strata(temp.path(), &[], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown key `unexpected`"), "{stderr}");
    assert!(stdout(&output).is_empty());
}

#[test]
fn explicit_path_and_format() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("service.conf");
    fs::write(&path, "{ name: 'svc-json5' }").expect("write");

    let output = strata(
        temp.path(),
        &["--config", "service.conf", "--format", "json5"],
        &[],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "Config: svc-json5\n");
}

#[test]
fn lists_prefixed_environment_variables() {
    let temp = TempDir::new().expect("tmp");
    let output = strata(temp.path(), &["--list-env", "--env-prefix", "svc"], &[]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        stdout(&output),
        "SVC_NAME\tname\nSVC_RUNTIME_ENVIRONMENT\truntime.environment\n"
    );
}
