use repo_digest::load_config::{env_ignore_dirs, load_config, CliConfig, IGNORE_ENV_VAR};
use repo_digest_core::config::DigestFormat;
use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

#[test]
#[serial]
fn test_load_config_full_file() {
    env::remove_var(IGNORE_ENV_VAR);
    let file = config_file(
        r#"
ignore: [build, dist]
format: markdown
fetch:
  reference: main
  timeout_secs: 10
  max_attempts: 4
  initial_backoff_ms: 250
"#,
    );

    let config = load_config(file.path()).expect("Config should load");
    assert_eq!(config.ignore, vec!["build", "dist"]);
    assert_eq!(config.format, Some(DigestFormat::Markdown));
    assert_eq!(config.fetch.reference(), "main");
    assert_eq!(config.fetch.attempts(), 4);

    let options = config.into_options(&["out".to_string()], None);
    assert_eq!(options.ignore_dirs, vec!["build", "dist", "out"]);
    assert_eq!(options.format, DigestFormat::Markdown);
    assert_eq!(options.fetch.timeout_secs, 10);
}

#[test]
#[serial]
fn test_load_config_defaults_for_missing_keys() {
    let file = config_file("ignore: [gen]\n");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.format, None);
    assert_eq!(config.fetch.reference(), "HEAD");
    assert_eq!(config.fetch.max_attempts, 2);

    let empty = config_file("");
    let config = load_config(empty.path()).unwrap();
    assert!(config.ignore.is_empty());
}

#[test]
#[serial]
fn test_load_config_rejects_bad_yaml() {
    let file = config_file("format: [not, a, format]\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"));

    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
#[serial]
fn test_env_ignore_dirs_are_appended() {
    env::set_var(IGNORE_ENV_VAR, " build ,, dist,");
    assert_eq!(env_ignore_dirs(), vec!["build", "dist"]);

    let options = CliConfig {
        ignore: vec!["gen".to_string()],
        ..Default::default()
    }
    .into_options(&["cli".to_string()], Some(DigestFormat::Annotated));
    assert_eq!(options.ignore_dirs, vec!["gen", "build", "dist", "cli"]);
    assert_eq!(options.format, DigestFormat::Annotated);

    env::remove_var(IGNORE_ENV_VAR);
    assert!(env_ignore_dirs().is_empty());
}
