#![allow(dead_code)]

use bgrun::config::{HarnessConfig, HarnessSection, RawConfigFile};

/// Builder for `HarnessConfig` to simplify test setup.
///
/// Starts from the built-in defaults; `build` runs the same validation as
/// loading a TOML file.
pub struct HarnessConfigBuilder {
    raw: RawConfigFile,
}

impl HarnessConfigBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawConfigFile {
                harness: HarnessSection::default(),
            },
        }
    }

    pub fn output_file(mut self, name: &str) -> Self {
        self.raw.harness.output_file = name.to_string();
        self
    }

    pub fn default_timeout(mut self, dur: &str) -> Self {
        self.raw.harness.default_timeout = dur.to_string();
        self
    }

    pub fn default_signal(mut self, signal: &str) -> Self {
        self.raw.harness.default_signal = signal.to_string();
        self
    }

    pub fn poll_interval(mut self, dur: &str) -> Self {
        self.raw.harness.poll_interval = dur.to_string();
        self
    }

    pub fn shell(mut self, shell: &str) -> Self {
        self.raw.harness.shell = shell.to_string();
        self
    }

    pub fn scripts_dir(mut self, dir: &str) -> Self {
        self.raw.harness.scripts_dir = dir.to_string();
        self
    }

    pub fn close_fds(mut self, fds: &[i32]) -> Self {
        self.raw.harness.close_fds = fds.to_vec();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.raw
    }

    pub fn build(self) -> HarnessConfig {
        HarnessConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
