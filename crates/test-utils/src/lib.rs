//! Shared helpers for bgrun's integration tests.

pub mod builders;
pub mod fake_script;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for any single awaited harness call in a test. Comfortably
/// above the longest watch timeout the suite uses, so hitting it means a
/// hang rather than a slow process.
pub const SUITE_TIMEOUT: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Route harness events into libtest's captured output.
///
/// Defaults to `bgrun=debug` so a failing test shows every launch, match
/// and stop; override with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,bgrun=debug"));

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Await `f`, panicking if it takes longer than [`SUITE_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(SUITE_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("harness call did not finish within {SUITE_TIMEOUT:?}"),
    }
}
