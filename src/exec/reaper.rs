// src/exec/reaper.rs

//! Stopping background processes and collecting their results.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::capture::split_lines;
use crate::errors::{HarnessError, Result};
use crate::exec::{BackgroundProcess, ChildState};
use crate::types::SignalSpec;

/// What a stopped process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    /// Exit code, or `128 + signal number` when the process was killed by a
    /// signal (the shell convention).
    pub status: i32,
    /// Terminating signal, if any.
    pub signal: Option<i32>,
    /// Captured output exactly as the child wrote it.
    pub raw: Vec<u8>,
    /// `raw` decoded as UTF-8, invalid sequences replaced.
    pub output: String,
    /// `output` split into lines with empty lines preserved.
    pub lines: Vec<String>,
}

impl StopOutcome {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

impl BackgroundProcess {
    /// Send `signal`, wait for the process to exit and harvest its output.
    ///
    /// A process that already exited is not signalled; its recorded exit
    /// status is returned as-is. A program that never started reports the
    /// status assigned at launch (127 or 126). The capture buffer is
    /// removed afterwards.
    pub async fn stop(self, signal: SignalSpec) -> Result<StopOutcome> {
        let BackgroundProcess {
            state,
            pid,
            program,
            capture,
            ..
        } = self;

        if signal.is_shell_intercepted() {
            warn!(pid, %signal, "INT/QUIT are often trapped by the hosting shell; prefer TERM or KILL");
        }

        let (status, terminated_by) = match state {
            ChildState::Spawned(mut child) => {
                match child.try_wait()? {
                    Some(status) => {
                        debug!(pid, ?status, "process already exited; not signalling");
                    }
                    None => deliver(pid, signal)?,
                }
                status_code(child.wait().await?)
            }
            ChildState::NeverStarted { status, error } => {
                debug!(program = %program, error = %error, status, "program never started; nothing to signal");
                (status, None)
            }
        };

        let raw = capture.read_bytes()?;
        let output = String::from_utf8_lossy(&raw).into_owned();
        let lines = split_lines(&output);
        capture.release()?;

        info!(
            pid,
            program = %program,
            status,
            signal = ?terminated_by,
            lines = lines.len(),
            "background process stopped"
        );

        Ok(StopOutcome {
            status,
            signal: terminated_by,
            raw,
            output,
            lines,
        })
    }
}

fn deliver(pid: u32, signal: SignalSpec) -> Result<()> {
    debug!(pid, %signal, "signalling background process");
    let target = Pid::from_raw(pid as i32);
    match kill(target, signal.signal()) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => {
            debug!(pid, "process vanished before the signal was delivered");
            Ok(())
        }
        Err(source) => Err(HarnessError::Signal {
            pid,
            signal: signal.to_string(),
            source,
        }),
    }
}

fn status_code(status: ExitStatus) -> (i32, Option<i32>) {
    match (status.code(), status.signal()) {
        (Some(code), _) => (code, None),
        (None, Some(sig)) => (128 + sig, Some(sig)),
        (None, None) => (-1, None),
    }
}
