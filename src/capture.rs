// src/capture.rs

//! Capture buffer: the file a background process's merged stdout/stderr is
//! appended to.
//!
//! The child is the only writer; the harness reads it either by following
//! it (see [`crate::exec::watcher`]) or in one go when the process is
//! stopped. The file lives exactly as long as the owning
//! [`BackgroundProcess`](crate::exec::BackgroundProcess) is launched.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::{debug, warn};

use crate::errors::{HarnessError, Result};

#[derive(Debug)]
pub struct CaptureBuffer {
    path: PathBuf,
}

impl CaptureBuffer {
    /// Create the buffer at `path`, truncating any leftover content from a
    /// previous run. Missing parent directories are created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HarnessError::capture(parent, e))?;
        }
        File::create(&path).map_err(|e| HarnessError::capture(&path, e))?;
        debug!(path = %path.display(), "capture buffer created");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stdout and stderr handles for a child, both appending to this buffer.
    ///
    /// Append mode keeps writes from the two streams from clobbering each
    /// other: each write lands at the current end of the file.
    pub(crate) fn child_stdio(&self) -> Result<(Stdio, Stdio)> {
        let stdout = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| HarnessError::capture(&self.path, e))?;
        let stderr = stdout
            .try_clone()
            .map_err(|e| HarnessError::capture(&self.path, e))?;
        Ok((Stdio::from(stdout), Stdio::from(stderr)))
    }

    /// Everything written so far, decoded.
    pub fn read_all(&self) -> Result<String> {
        read_lossy(&self.path)
    }

    /// Everything written so far, byte for byte.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| HarnessError::capture(&self.path, e))
    }

    /// Delete the buffer file.
    pub fn release(self) -> Result<()> {
        remove_if_present(&self.path).map_err(|e| HarnessError::capture(&self.path, e))
    }
}

impl Drop for CaptureBuffer {
    fn drop(&mut self) {
        if let Err(e) = remove_if_present(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove capture buffer");
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Read a capture file as text. Invalid UTF-8 is replaced rather than
/// rejected so a misbehaving child cannot hide its output from assertions.
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| HarnessError::capture(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Split captured output into lines, keeping empty lines.
///
/// A single trailing newline terminates the last line rather than starting
/// a new one, so `"a\n\nb\n"` gives `["a", "", "b"]` and `"a\n\n"` gives
/// `["a", ""]`. Carriage returns are kept verbatim.
pub fn split_lines(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    let body = raw.strip_suffix('\n').unwrap_or(raw);
    body.split('\n').map(str::to_string).collect()
}
