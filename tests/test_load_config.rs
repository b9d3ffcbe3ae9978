use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

/// A static config file plus env override produces a merged ProjectConfig.
#[tokio::test]
#[serial]
async fn test_load_config_env_overrides_file_project_id() {
    let config_yaml = r#"
project_id: "file-project-id"
language: en-US
depth: 5
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("KONTENT_PROJECT_ID", "env-project-id");

    let config =
        kontent_source::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.project_id, "env-project-id");
    assert_eq!(config.language.as_deref(), Some("en-US"));
    assert_eq!(config.depth, 5);

    env::remove_var("KONTENT_PROJECT_ID");
}

/// Without the env var, the file's project_id is used and depth defaults.
#[tokio::test]
#[serial]
async fn test_load_config_falls_back_to_file_and_defaults() {
    let config_yaml = r#"
project_id: "file-project-id"
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::remove_var("KONTENT_PROJECT_ID");

    let config =
        kontent_source::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.project_id, "file-project-id");
    assert_eq!(config.language, None);
    assert_eq!(config.depth, 3);
}

/// A config without any project id source must fail with a clear message.
#[tokio::test]
#[serial]
async fn test_load_config_errors_without_project_id() {
    let config_yaml = r#"
language: en-US
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::remove_var("KONTENT_PROJECT_ID");

    let err = kontent_source::load_config::load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("project_id"),
        "error should name the missing field, got: {msg}"
    );
}
