// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use crate::config::model::{HarnessConfig, HarnessSection, RawConfigFile};
use crate::errors::{HarnessError, Result};
use crate::types::{parse_duration, SignalSpec};

impl TryFrom<RawConfigFile> for HarnessConfig {
    type Error = crate::errors::HarnessError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let h = raw.harness;

        validate_output_file(&h.output_file)?;
        let default_timeout = non_zero_duration("default_timeout", &h.default_timeout)?;
        let poll_interval = non_zero_duration("poll_interval", &h.poll_interval)?;
        let default_signal = validate_signal(&h)?;
        validate_shell(&h.shell)?;
        let scripts_dir = validate_scripts_dir(&h.scripts_dir)?;
        validate_close_fds(&h.close_fds)?;

        Ok(HarnessConfig::new_unchecked(
            h.output_file,
            default_timeout,
            default_signal,
            poll_interval,
            h.shell,
            scripts_dir,
            h.close_fds,
        ))
    }
}

fn validate_output_file(name: &str) -> Result<()> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(HarnessError::ConfigError(format!(
            "[harness].output_file must be a plain file name (got '{}')",
            name
        ))),
    }
}

fn non_zero_duration(key: &str, value: &str) -> Result<std::time::Duration> {
    let dur = parse_duration(value)
        .map_err(|e| HarnessError::ConfigError(format!("[harness].{}: {}", key, e)))?;
    if dur.is_zero() {
        return Err(HarnessError::ConfigError(format!(
            "[harness].{} must be greater than zero (got '{}')",
            key, value
        )));
    }
    Ok(dur)
}

fn validate_signal(h: &HarnessSection) -> Result<SignalSpec> {
    h.default_signal
        .parse::<SignalSpec>()
        .map_err(|e| HarnessError::ConfigError(format!("[harness].default_signal: {}", e)))
}

fn validate_shell(shell: &str) -> Result<()> {
    if shell.trim().is_empty() {
        return Err(HarnessError::ConfigError(
            "[harness].shell must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_scripts_dir(dir: &str) -> Result<PathBuf> {
    let path = PathBuf::from(dir);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if dir.is_empty() || escapes {
        return Err(HarnessError::ConfigError(format!(
            "[harness].scripts_dir must be a relative path inside the test root (got '{}')",
            dir
        )));
    }
    Ok(path)
}

fn validate_close_fds(fds: &[i32]) -> Result<()> {
    if let Some(fd) = fds.iter().find(|fd| **fd <= 2) {
        return Err(HarnessError::ConfigError(format!(
            "[harness].close_fds must not contain stdin/stdout/stderr (got {})",
            fd
        )));
    }
    Ok(())
}
