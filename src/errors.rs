// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every harness operation reports failure through [`HarnessError`]; test
//! code turns an `Err` into an assertion failure with `?` or `unwrap`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("process not launched")]
    ProcessNotLaunched,

    #[error("pattern not specified")]
    PatternNotSpecified,

    #[error("invalid output pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "no output line matching '{pattern}' within {timeout:?}; output so far:\n{output}"
    )]
    WaitTimeout {
        pattern: String,
        timeout: Duration,
        output: String,
    },

    #[error("a background process is already running (pid {pid}); stop it first")]
    AlreadyLaunched { pid: u32 },

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script name '{0}': must be a plain file name")]
    InvalidScriptName(String),

    #[error("failed to deliver {signal} to pid {pid}: {source}")]
    Signal {
        pid: u32,
        signal: String,
        #[source]
        source: nix::Error,
    },

    #[error("capture buffer {path:?}: {source}")]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    /// True for failures caused by calling an operation in the wrong state or
    /// with missing arguments, as opposed to runtime failures.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            HarnessError::ProcessNotLaunched
                | HarnessError::PatternNotSpecified
                | HarnessError::AlreadyLaunched { .. }
        )
    }

    pub(crate) fn capture(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Capture {
            path: path.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HarnessError>;
