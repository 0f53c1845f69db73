// tests/config_loading.rs

use std::error::Error;
use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use procrunner::config::{load_and_validate, load_optional};
use procrunner::errors::RunnerError;
use procrunner_test_utils::builders::ConfigFileBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn missing_config_uses_defaults() -> TestResult {
    let cfg = load_optional(None)?;

    assert_eq!(cfg.restart_delay(), Duration::from_millis(5000));
    assert_eq!(cfg.grace_period(), Duration::from_millis(2000));
    assert!(!cfg.supervisor.use_shell);
    assert_eq!(cfg.log_level(), None);
    Ok(())
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let file = config_file("");
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.restart_delay(), Duration::from_millis(5000));
    assert_eq!(cfg.grace_period(), Duration::from_millis(2000));
    Ok(())
}

#[test]
fn values_are_read_from_toml() -> TestResult {
    let file = config_file(
        r#"
[supervisor]
restart_delay_ms = 250
grace_period_ms = 4000
use_shell = true

[logging]
level = "debug"
"#,
    );

    let cfg = load_optional(Some(file.path()))?;

    assert_eq!(cfg.restart_delay(), Duration::from_millis(250));
    assert_eq!(cfg.grace_period(), Duration::from_millis(4000));
    assert!(cfg.supervisor.use_shell);
    assert_eq!(cfg.log_level(), Some(tracing::Level::DEBUG));
    Ok(())
}

#[test]
fn zero_grace_period_is_rejected() {
    let file = config_file("[supervisor]\ngrace_period_ms = 0\n");

    match load_and_validate(file.path()) {
        Err(RunnerError::Config(msg)) => assert!(msg.contains("grace_period_ms")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn oversized_restart_delay_is_rejected() {
    let file = config_file("[supervisor]\nrestart_delay_ms = 999999999999\n");

    match load_and_validate(file.path()) {
        Err(RunnerError::Config(msg)) => assert!(msg.contains("restart_delay_ms")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn unknown_log_level_is_rejected() {
    let file = config_file("[logging]\nlevel = \"chatty\"\n");

    match load_and_validate(file.path()) {
        Err(RunnerError::Config(msg)) => assert!(msg.contains("chatty")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn unknown_keys_are_a_toml_error() {
    let file = config_file("[supervisor]\nbackoff_curve = \"exponential\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(RunnerError::Toml(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_optional(Some(std::path::Path::new("/definitely/not/here.toml")));
    assert!(matches!(result, Err(RunnerError::Io(_))));
}

#[test]
fn builder_produces_validated_config() {
    let cfg = ConfigFileBuilder::new()
        .restart_delay_ms(10)
        .grace_period_ms(20)
        .log_level("warn")
        .build();

    assert_eq!(cfg.restart_delay(), Duration::from_millis(10));
    assert_eq!(cfg.grace_period(), Duration::from_millis(20));
    assert_eq!(cfg.log_level(), Some(tracing::Level::WARN));
}
