use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bgrun::errors::Result;
use bgrun::exec::{ScriptAuthor, ShellScriptAuthor};

/// A script author that:
/// - records every `(name, lines)` it was asked to write
/// - delegates the actual writing to a `ShellScriptAuthor` in `dir`.
#[derive(Debug, Clone)]
pub struct RecordingScriptAuthor {
    inner: ShellScriptAuthor,
    written: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl RecordingScriptAuthor {
    pub fn new(dir: impl Into<PathBuf>, written: Arc<Mutex<Vec<(String, Vec<String>)>>>) -> Self {
        Self {
            inner: ShellScriptAuthor::new(dir),
            written,
        }
    }
}

impl ScriptAuthor for RecordingScriptAuthor {
    fn write_script(&self, name: &str, lines: &[String]) -> Result<PathBuf> {
        {
            let mut guard = self.written.lock().unwrap();
            guard.push((name.to_string(), lines.to_vec()));
        }
        self.inner.write_script(name, lines)
    }
}
