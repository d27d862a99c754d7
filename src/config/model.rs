// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::watcher::DEFAULT_WAIT_TIMEOUT;
use crate::types::SignalSpec;

/// Default capture buffer file name inside the test context root.
pub const DEFAULT_OUTPUT_FILE: &str = "background-run-output.txt";

/// Configuration as read from a TOML file.
///
/// ```toml
/// [harness]
/// output_file = "background-run-output.txt"
/// default_timeout = "3s"
/// default_signal = "TERM"
/// poll_interval = "20ms"
/// shell = "sh"
/// scripts_dir = "scripts"
/// close_fds = [3]
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub harness: HarnessSection,
}

/// `[harness]` section, still in its textual form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSection {
    /// File name of the capture buffer, relative to the test context root.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// How long `wait_for_output` waits when the caller gives no timeout.
    #[serde(default = "default_timeout")]
    pub default_timeout: String,

    /// Signal `stop` sends when the caller gives none.
    #[serde(default = "default_signal")]
    pub default_signal: String,

    /// How long the follow-reader sleeps after hitting the current end of
    /// the capture buffer before looking for new data.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// Interpreter used to run generated scripts.
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Directory (relative to the context root) generated scripts go to.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: String,

    /// Descriptors the surrounding test runner keeps for its own diagnostic
    /// channel. They are closed in every launched child so a long-lived
    /// child cannot keep the runner waiting on them.
    #[serde(default = "default_close_fds")]
    pub close_fds: Vec<i32>,
}

fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

fn default_timeout() -> String {
    "3s".to_string()
}

fn default_signal() -> String {
    "TERM".to_string()
}

fn default_poll_interval() -> String {
    "20ms".to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_scripts_dir() -> String {
    "scripts".to_string()
}

fn default_close_fds() -> Vec<i32> {
    vec![3]
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            default_timeout: default_timeout(),
            default_signal: default_signal(),
            poll_interval: default_poll_interval(),
            shell: default_shell(),
            scripts_dir: default_scripts_dir(),
            close_fds: default_close_fds(),
        }
    }
}

/// Validated harness configuration.
///
/// Only obtainable through `HarnessConfig::try_from(RawConfigFile)` (or
/// [`HarnessConfig::default`]), so every value here has already been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    output_file: String,
    default_timeout: Duration,
    default_signal: SignalSpec,
    poll_interval: Duration,
    shell: String,
    scripts_dir: PathBuf,
    close_fds: Vec<i32>,
}

impl HarnessConfig {
    pub(crate) fn new_unchecked(
        output_file: String,
        default_timeout: Duration,
        default_signal: SignalSpec,
        poll_interval: Duration,
        shell: String,
        scripts_dir: PathBuf,
        close_fds: Vec<i32>,
    ) -> Self {
        Self {
            output_file,
            default_timeout,
            default_signal,
            poll_interval,
            shell,
            scripts_dir,
            close_fds,
        }
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn default_signal(&self) -> SignalSpec {
        self.default_signal
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn scripts_dir(&self) -> &std::path::Path {
        &self.scripts_dir
    }

    pub fn close_fds(&self) -> &[i32] {
        &self.close_fds
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new_unchecked(
            default_output_file(),
            DEFAULT_WAIT_TIMEOUT,
            SignalSpec::TERM,
            Duration::from_millis(20),
            default_shell(),
            PathBuf::from(default_scripts_dir()),
            default_close_fds(),
        )
    }
}
