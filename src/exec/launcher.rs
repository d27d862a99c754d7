// src/exec/launcher.rs

//! Spawning background processes.

use std::ffi::OsString;
use std::io;
use std::os::fd::RawFd;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use tokio::process::Command;
use tracing::{info, warn};

use crate::capture::CaptureBuffer;
use crate::config::HarnessConfig;
use crate::errors::{HarnessError, Result};
use crate::exec::{BackgroundProcess, ChildState};

/// What to run and where its output goes.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Capture buffer location; truncated on launch.
    pub capture: PathBuf,
}

impl LaunchSpec {
    pub fn new<P, I, S>(program: P, args: I, capture: impl Into<PathBuf>) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            capture: capture.into(),
        }
    }
}

/// Knobs shared by every launch in a test context.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Inherited descriptors to close in the child before exec.
    pub close_fds: Vec<RawFd>,
    /// Poll interval handed to watch sessions on the launched process.
    pub poll_interval: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        LaunchOptions::from(&HarnessConfig::default())
    }
}

impl From<&HarnessConfig> for LaunchOptions {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            close_fds: config.close_fds().to_vec(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Start `spec.program` in the background and return without waiting.
///
/// - stdout and stderr are both appended to a freshly truncated capture
///   buffer; stdin is inherited untouched.
/// - the child gets its own process group, so terminal job control aimed
///   at the test runner does not reach it.
/// - every descriptor in `options.close_fds` that the child would inherit
///   (i.e. is open and not close-on-exec) is closed before exec.
///
/// Exit status is never inspected here, and a program the OS cannot start
/// is not an error either: the handle is still returned (with pid 0) and
/// [`BackgroundProcess::stop`] reports 127 when the program was not found
/// or 126 when it could not be executed. Only harness-side failures, such
/// as an unwritable capture buffer, are returned as `Err`.
///
/// Must be called from within a Tokio runtime.
pub fn launch(spec: &LaunchSpec, options: &LaunchOptions) -> Result<BackgroundProcess> {
    let program = spec.program.to_string_lossy().into_owned();
    let capture = CaptureBuffer::create(&spec.capture)?;
    let (stdout, stderr) = capture.child_stdio()?;

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::inherit())
        .stdout(stdout)
        .stderr(stderr)
        .process_group(0)
        .kill_on_drop(true);

    if !options.close_fds.is_empty() {
        let fds = options.close_fds.clone();
        // SAFETY: the closure only issues fcntl/close, both async-signal-safe,
        // and does not allocate (`fds` was built before the fork).
        unsafe {
            cmd.pre_exec(move || {
                for &fd in &fds {
                    close_if_inherited(fd);
                }
                Ok(())
            });
        }
    }

    let (pid, state) = match cmd.spawn() {
        Ok(child) => {
            let pid = child.id().ok_or_else(|| HarnessError::Spawn {
                program: program.clone(),
                source: io::Error::other("child was reaped before its pid was recorded"),
            })?;
            info!(
                pid,
                program = %program,
                args = ?spec.args,
                capture = %capture.path().display(),
                "launched background process"
            );
            (pid, ChildState::Spawned(child))
        }
        Err(error) => {
            let status = spawn_failure_status(&error);
            warn!(
                program = %program,
                error = %error,
                status,
                "program could not be started; stop will report its status"
            );
            (0, ChildState::NeverStarted { status, error })
        }
    };

    Ok(BackgroundProcess {
        state,
        pid,
        program,
        capture,
        poll_interval: options.poll_interval,
        launched_at: Instant::now(),
    })
}

fn spawn_failure_status(error: &io::Error) -> i32 {
    match error.kind() {
        io::ErrorKind::NotFound => 127,
        _ => 126,
    }
}

fn close_if_inherited(fd: RawFd) {
    if let Ok(bits) = fcntl(fd, FcntlArg::F_GETFD) {
        if !FdFlag::from_bits_truncate(bits).contains(FdFlag::FD_CLOEXEC) {
            let _ = nix::unistd::close(fd);
        }
    }
}

