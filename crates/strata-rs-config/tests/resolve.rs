use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use strata_rs_config::{
    ConfigError, ConfigFormat, ConfigResolver, LoadPhase, ServiceConfig, load,
};
use tempfile::TempDir;

fn write_config(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join("env").join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(&path, contents).expect("write");
    path
}

fn env(vars: &[(&str, &str)]) -> BTreeMap<String, String> {
    vars.iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[test]
fn fully_specified_file_round_trips() {
    let temp = TempDir::new().expect("tmp");
    let path = write_config(
        temp.path(),
        "config.yaml",
        "name: \"svc-a\"\nruntime:\n  environment: \"prod\"\n",
    );

    let resolved = ConfigResolver::with_env(env(&[]))
        .load::<ServiceConfig>(&path, ConfigFormat::Yaml)
        .expect("config");
    assert_eq!(
        resolved.config,
        ServiceConfig::builder().name("svc-a").environment("prod").build()
    );
    assert_eq!(resolved.source.as_deref(), Some(path.as_path()));
}

#[test]
fn environment_wins_over_every_file_value() {
    let temp = TempDir::new().expect("tmp");
    let path = write_config(
        temp.path(),
        "config.yaml",
        "name: \"svc-a\"\nruntime:\n  environment: \"prod\"\n",
    );
    let vars = env(&[("NAME", "svc-z"), ("RUNTIME_ENVIRONMENT", "staging")]);

    let resolved = ConfigResolver::with_env(&vars)
        .load::<ServiceConfig>(&path, ConfigFormat::Yaml)
        .expect("config");
    assert_eq!(resolved.config.name, "svc-z");
    assert_eq!(resolved.config.runtime.environment, "staging");
    let keys: Vec<_> = resolved.overrides.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["name", "runtime.environment"]);
}

#[test]
fn unknown_key_in_file_rejects_load() {
    let temp = TempDir::new().expect("tmp");
    let path = write_config(
        temp.path(),
        "config.yaml",
        "name: \"svc-a\"\nruntime:\n  environment: \"prod\"\nunexpected: 1\n",
    );

    let mut config = ServiceConfig::default();
    let err = ConfigResolver::with_env(env(&[]))
        .load_into(&mut config, &path, ConfigFormat::Yaml)
        .unwrap_err();
    match &err {
        ConfigError::SchemaMismatch { key, origin, .. } => {
            assert_eq!(key, "unexpected");
            assert!(origin.ends_with("config.yaml"), "{origin}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(config, ServiceConfig::default());
}

#[test]
fn json_file_resolves_with_overrides() {
    let temp = TempDir::new().expect("tmp");
    let path = write_config(
        temp.path(),
        "config.json",
        r#"{ "name": "svc-json" }"#,
    );
    let format = ConfigFormat::from_path(&path).expect("format");

    let resolved = ConfigResolver::with_env(env(&[("RUNTIME_ENVIRONMENT", "qa")]))
        .load::<ServiceConfig>(&path, format)
        .expect("config");
    assert_eq!(resolved.config.name, "svc-json");
    assert_eq!(resolved.config.runtime.environment, "qa");
}

#[test]
fn unreadable_path_reports_file_read_phase() {
    let temp = TempDir::new().expect("tmp");
    let err = load::<ServiceConfig>(temp.path().join("missing.yaml"), ConfigFormat::Yaml)
        .unwrap_err();
    assert_eq!(err.phase(), Some(LoadPhase::FileRead));
    assert!(format!("{err}").starts_with("file-read"), "{err}");

    // A directory exists but cannot be read as a file.
    let err = load::<ServiceConfig>(temp.path(), ConfigFormat::Yaml).unwrap_err();
    assert!(matches!(err, ConfigError::FileRead { .. }), "{err}");
}

#[test]
fn lists_environment_variables_for_schema() {
    let keys = ConfigResolver::new()
        .env_keys::<ServiceConfig>()
        .expect("keys");
    assert_eq!(
        keys,
        vec![
            ("name".to_string(), "NAME".to_string()),
            (
                "runtime.environment".to_string(),
                "RUNTIME_ENVIRONMENT".to_string()
            ),
        ]
    );
}
