// src/exec/mod.rs

//! Background process lifecycle.
//!
//! A [`BackgroundProcess`] is the handle for one launched command and its
//! capture buffer:
//!
//! - [`launcher`] spawns the command with stdout/stderr appended to the
//!   capture buffer and returns the handle immediately.
//! - [`watcher`] follows the capture buffer until a line matches a pattern,
//!   racing the read loop against a timeout.
//! - [`reaper`] signals the process, waits for it and harvests its exit
//!   status and output.
//! - [`script`] is the seam to the script-authoring collaborator used by
//!   [`Harness::launch_script`](crate::harness::Harness::launch_script).
//!
//! The handle is consumed by [`BackgroundProcess::stop`], and
//! [`BackgroundProcess::wait_for_output`] borrows it mutably, so a process
//! can never be watched by two sessions at once or watched after it was
//! stopped.

pub mod launcher;
pub mod reaper;
pub mod script;
pub mod watcher;

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use tokio::process::Child;
use tracing::warn;

use crate::capture::CaptureBuffer;
use crate::errors::Result;

pub use launcher::{launch, LaunchOptions, LaunchSpec};
pub use reaper::StopOutcome;
pub use script::{ScriptAuthor, ShellScriptAuthor};
pub use watcher::{wait_for_line, WatchMatch};

/// What stands behind a [`BackgroundProcess`] handle.
#[derive(Debug)]
enum ChildState {
    Spawned(Child),
    /// The OS refused to start the program. `status` is what `stop` reports
    /// for it (127 not found, 126 otherwise, as a shell would).
    NeverStarted { status: i32, error: io::Error },
}

/// A launched background command.
///
/// Dropping the handle without calling [`stop`](BackgroundProcess::stop)
/// kills the child and removes its capture buffer.
#[derive(Debug)]
pub struct BackgroundProcess {
    state: ChildState,
    pid: u32,
    program: String,
    capture: CaptureBuffer,
    poll_interval: Duration,
    launched_at: Instant,
}

impl BackgroundProcess {
    /// OS process id recorded at launch, or 0 when the program never
    /// started.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn capture_path(&self) -> &Path {
        self.capture.path()
    }

    /// Time since the process was launched.
    pub fn uptime(&self) -> Duration {
        self.launched_at.elapsed()
    }

    /// Whether the process has not exited yet.
    ///
    /// An exit observed here is remembered, so [`stop`](Self::stop) still
    /// reports the real status afterwards.
    pub fn is_running(&mut self) -> bool {
        let child = match &mut self.state {
            ChildState::Spawned(child) => child,
            ChildState::NeverStarted { .. } => return false,
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) => false,
            Err(e) => {
                warn!(pid = self.pid, error = %e, "failed to poll background process");
                false
            }
        }
    }

    /// Why the program could not be started, if it could not.
    pub fn spawn_error(&self) -> Option<&io::Error> {
        match &self.state {
            ChildState::Spawned(_) => None,
            ChildState::NeverStarted { error, .. } => Some(error),
        }
    }

    /// Everything the process has written so far.
    pub fn output_so_far(&self) -> Result<String> {
        self.capture.read_all()
    }
}
