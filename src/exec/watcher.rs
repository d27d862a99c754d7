// src/exec/watcher.rs

//! Waiting for a line of output.
//!
//! A watch session follows a capture buffer from its first byte: reads that
//! hit the current end of the file sleep for the poll interval and try
//! again instead of treating it as end-of-stream, because the writer is
//! still alive. The whole read loop is raced against a Tokio timer; when
//! the timer wins, the loop future is dropped, which is the cancellation of
//! the follow-read. A match drops the timer the same way, so neither side
//! can outlive the call.
//!
//! Lines are evaluated one at a time in the order they were written. A
//! trailing partial line is held back until its newline arrives.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, trace, warn};

use crate::capture::read_lossy;
use crate::errors::{HarnessError, Result};
use crate::exec::BackgroundProcess;

/// Default time a watch waits for its pattern.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(3);

/// The line that satisfied a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchMatch {
    pub line: String,
    /// 1-based position of the line in the capture buffer.
    pub line_number: usize,
    pub elapsed: Duration,
}

/// Compile a watch pattern, rejecting the empty pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(HarnessError::PatternNotSpecified);
    }
    Regex::new(pattern).map_err(|source| HarnessError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Wait until a line of `path` matches `pattern`, or `limit` elapses.
///
/// On timeout the error carries the pattern and the complete buffer
/// content read so far. The writing process is left alone either way.
pub async fn wait_for_line(
    path: &Path,
    pattern: &str,
    limit: Duration,
    poll_interval: Duration,
) -> Result<WatchMatch> {
    let regex = compile_pattern(pattern)?;
    WatchSession::new(regex, limit, poll_interval).run(path).await
}

/// State of one bounded attempt to observe a pattern.
struct WatchSession {
    pattern: Regex,
    limit: Duration,
    poll_interval: Duration,
    /// Bytes consumed from the buffer so far.
    cursor: u64,
    lines_seen: usize,
}

impl WatchSession {
    fn new(pattern: Regex, limit: Duration, poll_interval: Duration) -> Self {
        Self {
            pattern,
            limit,
            poll_interval,
            cursor: 0,
            lines_seen: 0,
        }
    }

    async fn run(mut self, path: &Path) -> Result<WatchMatch> {
        let started = Instant::now();
        debug!(
            path = %path.display(),
            pattern = %self.pattern,
            timeout = ?self.limit,
            "waiting for output"
        );

        match timeout(self.limit, self.follow(path)).await {
            Ok(Ok((line, line_number))) => {
                let elapsed = started.elapsed();
                info!(
                    pattern = %self.pattern,
                    line = %line,
                    line_number,
                    elapsed = ?elapsed,
                    "output matched"
                );
                Ok(WatchMatch {
                    line,
                    line_number,
                    elapsed,
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                let output = match read_lossy(path) {
                    Ok(output) => output,
                    Err(e) => {
                        debug!(error = %e, "capture buffer unreadable after timeout");
                        String::new()
                    }
                };
                warn!(
                    path = %path.display(),
                    pattern = %self.pattern,
                    timeout = ?self.limit,
                    bytes_read = self.cursor,
                    lines_seen = self.lines_seen,
                    "no matching output before timeout; output so far:\n{}",
                    output
                );
                Err(HarnessError::WaitTimeout {
                    pattern: self.pattern.as_str().to_string(),
                    timeout: self.limit,
                    output,
                })
            }
        }
    }

    /// Follow the buffer until a line matches. Never returns on its own
    /// unless a line matches or the buffer becomes unreadable.
    async fn follow(&mut self, path: &Path) -> Result<(String, usize)> {
        let file = self.open_when_present(path).await?;
        let mut reader = BufReader::new(file);
        let mut pending: Vec<u8> = Vec::new();

        loop {
            let n = reader
                .read_until(b'\n', &mut pending)
                .await
                .map_err(|e| HarnessError::capture(path, e))?;

            if n == 0 {
                sleep(self.poll_interval).await;
                continue;
            }
            self.cursor += n as u64;

            if pending.last() != Some(&b'\n') {
                // Partial line: the rest will be appended on a later read.
                continue;
            }

            pending.pop();
            self.lines_seen += 1;
            let line = String::from_utf8_lossy(&pending).into_owned();
            pending.clear();

            trace!(line_number = self.lines_seen, line = %line, "observed line");
            if self.pattern.is_match(&line) {
                return Ok((line, self.lines_seen));
            }
        }
    }

    /// Open `path`, waiting for it to be created if it does not exist yet.
    async fn open_when_present(&self, path: &Path) -> Result<File> {
        loop {
            match File::open(path).await {
                Ok(file) => return Ok(file),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    trace!(path = %path.display(), "capture buffer not present yet");
                    sleep(self.poll_interval).await;
                }
                Err(e) => return Err(HarnessError::capture(path, e)),
            }
        }
    }
}

impl BackgroundProcess {
    /// Wait until a line of this process's output matches `pattern`.
    ///
    /// Takes `&mut self`: only one watch session can be active on a process
    /// at a time.
    pub async fn wait_for_output(&mut self, pattern: &str, limit: Duration) -> Result<WatchMatch> {
        wait_for_line(self.capture.path(), pattern, limit, self.poll_interval).await
    }

    /// Like [`wait_for_output`](Self::wait_for_output), but follows another
    /// file, e.g. a log the process writes besides its stdout.
    pub async fn wait_for_output_in(
        &mut self,
        path: &Path,
        pattern: &str,
        limit: Duration,
    ) -> Result<WatchMatch> {
        wait_for_line(path, pattern, limit, self.poll_interval).await
    }
}
