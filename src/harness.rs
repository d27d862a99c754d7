// src/harness.rs

//! Per-test-context driver for one background process.
//!
//! [`Harness`] owns the test context root (where the capture buffer and
//! generated scripts live), the validated configuration, and at most one
//! [`BackgroundProcess`]. It implements the lifecycle
//! `NotStarted -> Launched -> NotStarted`:
//!
//! - `launch*` moves to `Launched` (and refuses while already there),
//! - `wait_for_output*` requires `Launched` unless given an explicit
//!   capture location,
//! - `stop` moves back to `NotStarted`, and is a no-op when nothing runs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::errors::{HarnessError, Result};
use crate::exec::watcher::wait_for_line;
use crate::exec::{
    launch, BackgroundProcess, LaunchOptions, LaunchSpec, ScriptAuthor, ShellScriptAuthor,
    StopOutcome, WatchMatch,
};
use crate::types::SignalSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    NotStarted,
    Launched,
}

#[derive(Debug)]
pub struct Harness {
    root: PathBuf,
    config: HarnessConfig,
    scripts: Box<dyn ScriptAuthor>,
    active: Option<BackgroundProcess>,
    // Keeps a temporary root alive for as long as the harness.
    _tempdir: Option<TempDir>,
}

impl Harness {
    /// Harness rooted at `root` with the default configuration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, HarnessConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: HarnessConfig) -> Self {
        let root = root.into();
        let scripts = Box::new(ShellScriptAuthor::new(root.join(config.scripts_dir())));
        Self {
            root,
            config,
            scripts,
            active: None,
            _tempdir: None,
        }
    }

    /// Harness rooted in a fresh temporary directory, removed on drop.
    pub fn temporary() -> Result<Self> {
        Self::temporary_with_config(HarnessConfig::default())
    }

    pub fn temporary_with_config(config: HarnessConfig) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("bgrun-").tempdir()?;
        let mut harness = Self::with_config(dir.path(), config);
        harness._tempdir = Some(dir);
        Ok(harness)
    }

    /// Replace the script-authoring collaborator.
    pub fn with_script_author(mut self, author: impl ScriptAuthor + 'static) -> Self {
        self.scripts = Box::new(author);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Default capture buffer location for this context.
    pub fn capture_path(&self) -> PathBuf {
        self.root.join(self.config.output_file())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.active.is_some() {
            Lifecycle::Launched
        } else {
            Lifecycle::NotStarted
        }
    }

    pub fn process(&self) -> Option<&BackgroundProcess> {
        self.active.as_ref()
    }

    pub fn process_mut(&mut self) -> Option<&mut BackgroundProcess> {
        self.active.as_mut()
    }

    /// Hand the running process over to the caller, leaving the context
    /// `NotStarted`.
    pub fn take_process(&mut self) -> Option<BackgroundProcess> {
        self.active.take()
    }

    /// Launch `program` with its output captured at [`capture_path`](Self::capture_path).
    /// Returns the pid.
    pub fn launch<P, I, S>(&mut self, program: P, args: I) -> Result<u32>
    where
        P: Into<OsString>,
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let capture = self.capture_path();
        self.launch_with_capture(capture, program, args)
    }

    /// Launch with the output captured at `capture` instead of the default
    /// location.
    pub fn launch_with_capture<P, I, S>(
        &mut self,
        capture: impl Into<PathBuf>,
        program: P,
        args: I,
    ) -> Result<u32>
    where
        P: Into<OsString>,
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.ensure_not_started()?;
        let spec = LaunchSpec::new(program, args, capture);
        let process = launch(&spec, &LaunchOptions::from(&self.config))?;
        let pid = process.pid();
        self.active = Some(process);
        Ok(pid)
    }

    /// Write `lines` as a script named `name` and launch it through the
    /// configured shell.
    pub fn launch_script<S: AsRef<str>>(&mut self, name: &str, lines: &[S]) -> Result<u32> {
        self.ensure_not_started()?;
        let lines: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
        let script = self.scripts.write_script(name, &lines)?;
        info!(script = %name, path = %script.display(), "launching generated script");
        let shell = self.config.shell().to_string();
        self.launch(shell, [script])
    }

    /// Wait for a line matching `pattern` in the running process's output.
    ///
    /// `limit` defaults to the configured timeout (3s unless configured).
    pub async fn wait_for_output(
        &mut self,
        pattern: &str,
        limit: Option<Duration>,
    ) -> Result<WatchMatch> {
        let limit = limit.unwrap_or(self.config.default_timeout());
        let process = self.active.as_mut().ok_or_else(|| {
            debug!(pattern, "wait_for_output called with no process launched");
            HarnessError::ProcessNotLaunched
        })?;
        process.wait_for_output(pattern, limit).await
    }

    /// Wait for a line matching `pattern` in `capture`, which need not be
    /// the running process's buffer. No process has to be launched.
    pub async fn wait_for_output_at(
        &mut self,
        capture: &Path,
        pattern: &str,
        limit: Option<Duration>,
    ) -> Result<WatchMatch> {
        let limit = limit.unwrap_or(self.config.default_timeout());
        wait_for_line(capture, pattern, limit, self.config.poll_interval()).await
    }

    /// Stop the running process with `signal` (default from config) and
    /// collect its results. Returns `None` when nothing was running.
    pub async fn stop(&mut self, signal: Option<SignalSpec>) -> Result<Option<StopOutcome>> {
        let Some(process) = self.active.take() else {
            debug!("stop called with no background process; nothing to do");
            return Ok(None);
        };
        let signal = signal.unwrap_or(self.config.default_signal());
        process.stop(signal).await.map(Some)
    }

    fn ensure_not_started(&self) -> Result<()> {
        match &self.active {
            Some(process) => Err(HarnessError::AlreadyLaunched { pid: process.pid() }),
            None => Ok(()),
        }
    }
}
