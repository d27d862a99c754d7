// src/capability.rs

//! Host capability checks.
//!
//! A test that needs external utilities (`nc`, `python3`, ...) should be
//! skipped, not failed, on a host that lacks them: an unsupported host is
//! not a defect in the code under test. Rust's test harness has no native
//! "skipped" outcome, so [`require_utilities!`](crate::require_utilities)
//! logs a skip notice and returns early from the test body.

use tracing::{debug, warn};

/// Result of checking a set of required utilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Available,
    /// Names that could not be resolved, in the order they were requested.
    Missing(Vec<String>),
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }
}

/// Return the subset of `names` that cannot be resolved on this host.
///
/// A name containing a path separator is checked as a path; anything else
/// is looked up on `PATH`.
pub fn missing_utilities<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            match which::which(name) {
                Ok(path) => {
                    debug!(utility = %name, path = %path.display(), "utility available");
                    None
                }
                Err(_) => {
                    debug!(utility = %name, "utility missing");
                    Some(name.to_string())
                }
            }
        })
        .collect()
}

/// Check that every utility in `names` is available.
pub fn check<I, S>(names: I) -> Capability
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let missing = missing_utilities(names);
    if missing.is_empty() {
        Capability::Available
    } else {
        Capability::Missing(missing)
    }
}

/// Log that a test is being skipped because `missing` utilities are absent.
#[doc(hidden)]
pub fn report_skip(missing: &[String]) {
    warn!(?missing, "required utilities not available; skipping test");
    eprintln!("skipped: missing required utilities {:?}", missing);
}

/// Skip the current test unless every listed utility is available.
///
/// The first form is for tests returning `()`; the second returns the given
/// value, e.g. `Ok(())` from a test returning `Result`.
///
/// ```ignore
/// #[tokio::test]
/// async fn talks_to_netcat() -> TestResult {
///     bgrun::require_utilities!(["nc"], Ok(()));
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_utilities {
    ($names:expr) => {
        $crate::require_utilities!($names, ())
    };
    ($names:expr, $skip:expr) => {
        if let $crate::capability::Capability::Missing(missing) =
            $crate::capability::check($names)
        {
            $crate::capability::report_skip(&missing);
            return $skip;
        }
    };
}
