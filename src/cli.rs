// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::types::{parse_duration, SignalSpec};

/// Command-line arguments for `bgrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bgrun",
    version,
    about = "Run a command in the background, wait for its output, then stop it.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Bgrun.toml` in the current directory is used when it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BGRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Directory holding the capture buffer. A temporary directory is used
    /// when omitted.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Utility that must be on PATH; if any is missing the run is skipped.
    #[arg(long = "require", value_name = "UTIL")]
    pub require: Vec<String>,

    /// Regex a line of output must match before the process is stopped.
    #[arg(long, value_name = "REGEX")]
    pub wait_for: Option<String>,

    /// How long to wait for `--wait-for` (e.g. "3s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Keep the process running this long before stopping it.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub hold: Option<Duration>,

    /// Signal used to stop the process (name or number).
    #[arg(long, value_name = "SIGNAL")]
    pub signal: Option<SignalSpec>,

    /// Validate the config and print what would run, without running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Program to run in the background, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl CliArgs {
    /// The program to launch (first element of `command`).
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments passed to [`program`](Self::program).
    pub fn program_args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
