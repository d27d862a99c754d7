// src/lib.rs

//! Test harness for long-running background processes.
//!
//! A test launches a server or daemon, waits until its output shows it is
//! ready, exercises it, then stops it and asserts on its exit status and
//! captured output:
//!
//! ```no_run
//! # async fn demo() -> bgrun::errors::Result<()> {
//! use std::time::Duration;
//! use bgrun::Harness;
//!
//! let mut harness = Harness::temporary()?;
//! harness.launch("sh", ["-c", "echo ready; exec sleep 30"])?;
//! harness.wait_for_output("^ready$", Some(Duration::from_secs(2))).await?;
//! let outcome = harness.stop(None).await?.expect("process was running");
//! assert_eq!(outcome.lines, vec!["ready"]);
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod capture;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod harness;
pub mod logging;
pub mod types;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::capability::Capability;
use crate::cli::CliArgs;
use crate::config::{default_config_path, load_and_validate, load_or_default, HarnessConfig};
use crate::errors::HarnessError;

pub use crate::capability::{check as check_utilities, missing_utilities};
pub use crate::exec::{BackgroundProcess, StopOutcome, WatchMatch};
pub use crate::harness::{Harness, Lifecycle};
pub use crate::types::SignalSpec;

/// High-level entry point used by `main.rs`.
///
/// Launches the requested program, optionally waits for a line of output
/// and holds it running, then stops it and prints the captured lines to
/// stdout. Returns the exit code `bgrun` itself should exit with: the
/// child's status, or 1 when `--wait-for` timed out.
pub async fn run(args: CliArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => load_or_default(default_config_path()).context("loading default config")?,
    };

    if let Capability::Missing(missing) = capability::check(&args.require) {
        println!("skipped: missing required utilities {:?}", missing);
        return Ok(0);
    }

    if args.dry_run {
        print_dry_run(&config, &args);
        return Ok(0);
    }

    let mut harness = match &args.root {
        Some(root) => Harness::with_config(root, config),
        None => Harness::temporary_with_config(config)?,
    };

    let pid = harness.launch(args.program(), args.program_args())?;
    info!(pid, program = %args.program(), "background process running");

    let mut timed_out = false;
    if let Some(pattern) = &args.wait_for {
        match harness.wait_for_output(pattern, args.timeout).await {
            Ok(found) => debug!(line = %found.line, "ready line observed"),
            Err(e @ HarnessError::WaitTimeout { .. }) => {
                eprintln!("{e}");
                timed_out = true;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(hold) = args.hold {
        tokio::time::sleep(hold).await;
    }

    let outcome = harness
        .stop(args.signal)
        .await?
        .context("background process disappeared before stop")?;

    for line in &outcome.lines {
        println!("{line}");
    }

    Ok(if timed_out { 1 } else { outcome.status })
}

/// Simple dry-run output: print the resolved config and the command.
fn print_dry_run(cfg: &HarnessConfig, args: &CliArgs) {
    println!("bgrun dry-run");
    println!("  harness.output_file = {}", cfg.output_file());
    println!("  harness.default_timeout = {:?}", cfg.default_timeout());
    println!("  harness.default_signal = {}", cfg.default_signal());
    println!("  harness.poll_interval = {:?}", cfg.poll_interval());
    println!("  harness.shell = {}", cfg.shell());
    println!("  harness.scripts_dir = {}", cfg.scripts_dir().display());
    println!("  harness.close_fds = {:?}", cfg.close_fds());
    println!();

    println!("command: {} {:?}", args.program(), args.program_args());
    if let Some(ref pattern) = args.wait_for {
        println!("  wait_for: {pattern}");
        println!(
            "  timeout: {:?}",
            args.timeout.unwrap_or(cfg.default_timeout())
        );
    }
    if let Some(hold) = args.hold {
        println!("  hold: {hold:?}");
    }
    println!(
        "  signal: {}",
        args.signal.unwrap_or(cfg.default_signal())
    );

    debug!("dry-run complete (no execution)");
}
