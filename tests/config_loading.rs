// tests/config_loading.rs
mod common;
use crate::common::init_tracing;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;

use bgrun::config::{load_and_validate, load_or_default, HarnessConfig};
use bgrun::errors::HarnessError;
use bgrun::SignalSpec;
use bgrun_test_utils::builders::HarnessConfigBuilder;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn empty_file_yields_defaults() {
    init_tracing();

    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg, HarnessConfig::default());
    assert_eq!(cfg.output_file(), "background-run-output.txt");
    assert_eq!(cfg.default_timeout(), Duration::from_secs(3));
    assert_eq!(cfg.default_signal(), SignalSpec::TERM);
    assert_eq!(cfg.poll_interval(), Duration::from_millis(20));
    assert_eq!(cfg.shell(), "sh");
    assert_eq!(cfg.scripts_dir(), Path::new("scripts"));
    assert_eq!(cfg.close_fds(), &[3]);
}

#[test]
fn harness_section_overrides_defaults() {
    init_tracing();

    let file = config_file(
        r#"
[harness]
output_file = "server.log"
default_timeout = "10s"
default_signal = "sigint"
poll_interval = "5ms"
shell = "bash"
scripts_dir = "gen/scripts"
close_fds = []
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.output_file(), "server.log");
    assert_eq!(cfg.default_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.default_signal().to_string(), "SIGINT");
    assert!(cfg.default_signal().is_shell_intercepted());
    assert_eq!(cfg.poll_interval(), Duration::from_millis(5));
    assert_eq!(cfg.shell(), "bash");
    assert_eq!(cfg.scripts_dir(), Path::new("gen/scripts"));
    assert!(cfg.close_fds().is_empty());
}

#[test]
fn invalid_values_return_config_errors() {
    init_tracing();

    let cases = [
        HarnessConfigBuilder::new().default_timeout("0s").raw(),
        HarnessConfigBuilder::new().poll_interval("fast").raw(),
        HarnessConfigBuilder::new().default_signal("SIGNOPE").raw(),
        HarnessConfigBuilder::new().output_file("logs/out.txt").raw(),
        HarnessConfigBuilder::new().output_file("").raw(),
        HarnessConfigBuilder::new().shell("  ").raw(),
        HarnessConfigBuilder::new().scripts_dir("../outside").raw(),
        HarnessConfigBuilder::new().close_fds(&[2]).raw(),
    ];

    for raw in cases {
        let debug = format!("{:?}", raw);
        match HarnessConfig::try_from(raw) {
            Err(HarnessError::ConfigError(msg)) => {
                assert!(msg.starts_with("[harness]."), "unexpected message: {msg}");
            }
            other => panic!("expected ConfigError for {debug}, got {:?}", other),
        }
    }
}

#[test]
fn unknown_keys_are_rejected() {
    init_tracing();

    let file = config_file(
        r#"
[harness]
output_fiel = "typo.txt"
"#,
    );
    match load_and_validate(file.path()) {
        Err(HarnessError::TomlError(_)) => {}
        other => panic!("expected TomlError, got {:?}", other),
    }
}

#[test]
fn missing_file_falls_back_to_defaults_only_when_optional() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Bgrun.toml");

    assert_eq!(load_or_default(&missing).unwrap(), HarnessConfig::default());
    assert!(matches!(load_and_validate(&missing), Err(HarnessError::IoError(_))));
}
