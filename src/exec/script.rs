// src/exec/script.rs

//! Script-authoring seam.
//!
//! [`Harness::launch_script`](crate::harness::Harness::launch_script) turns
//! a list of literal command lines into something launchable through a
//! [`ScriptAuthor`]. Production code uses [`ShellScriptAuthor`]; tests can
//! plug in their own implementation to record or rewrite scripts.

use std::fmt::Debug;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::errors::{HarnessError, Result};

/// Materialises a named script from command lines.
pub trait ScriptAuthor: Send + Sync + Debug {
    /// Write a script called `name` running `lines` in order and return its
    /// path.
    fn write_script(&self, name: &str, lines: &[String]) -> Result<PathBuf>;
}

/// Writes POSIX shell scripts into a directory.
#[derive(Debug, Clone)]
pub struct ShellScriptAuthor {
    dir: PathBuf,
}

impl ShellScriptAuthor {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ScriptAuthor for ShellScriptAuthor {
    fn write_script(&self, name: &str, lines: &[String]) -> Result<PathBuf> {
        validate_script_name(name)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(name);
        fs::write(&path, render_script(lines))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;

        debug!(script = %name, path = %path.display(), lines = lines.len(), "wrote script");
        Ok(path)
    }
}

/// Script names become file names inside the scripts directory.
pub fn validate_script_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains('/') => Ok(()),
        _ => Err(HarnessError::InvalidScriptName(name.to_string())),
    }
}

/// `#!/bin/sh` followed by one command per line.
pub fn render_script(lines: &[String]) -> String {
    let mut script = String::from("#!/bin/sh\n");
    for line in lines {
        script.push_str(line);
        script.push('\n');
    }
    script
}
