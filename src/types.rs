// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use nix::sys::signal::Signal;

/// Signal used to terminate a background process.
///
/// Parsed from a POSIX signal name (with or without the `SIG` prefix, any
/// case) or a signal number: `"TERM"`, `"SIGTERM"`, `"kill"`, `"9"`.
///
/// `INT` and `QUIT` are accepted but flagged by [`SignalSpec::is_shell_intercepted`]:
/// shells running a test suite commonly trap them for their own interrupt
/// handling, so they are a poor choice for stopping a monitored process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSpec(Signal);

impl SignalSpec {
    pub const TERM: SignalSpec = SignalSpec(Signal::SIGTERM);
    pub const KILL: SignalSpec = SignalSpec(Signal::SIGKILL);

    pub fn signal(self) -> Signal {
        self.0
    }

    pub fn number(self) -> i32 {
        self.0 as i32
    }

    pub fn is_shell_intercepted(self) -> bool {
        matches!(self.0, Signal::SIGINT | Signal::SIGQUIT)
    }
}

impl Default for SignalSpec {
    fn default() -> Self {
        SignalSpec::TERM
    }
}

impl From<Signal> for SignalSpec {
    fn from(signal: Signal) -> Self {
        SignalSpec(signal)
    }
}

impl fmt::Display for SignalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for SignalSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty signal specification".to_string());
        }

        if s.chars().all(|c| c.is_ascii_digit()) {
            let number: i32 = s
                .parse()
                .map_err(|e| format!("invalid signal number '{}': {}", s, e))?;
            return Signal::try_from(number)
                .map(SignalSpec)
                .map_err(|_| format!("unknown signal number {}", number));
        }

        let upper = s.to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        Signal::from_str(&format!("SIG{name}"))
            .map(SignalSpec)
            .map_err(|_| format!("unknown signal name '{}'", s))
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ))
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{}'", s))
}
