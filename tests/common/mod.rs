#![allow(dead_code)]

pub use bgrun_test_utils::builders;
pub use bgrun_test_utils::{init_tracing, with_timeout};

use std::error::Error;
use std::time::Duration;

use bgrun::Harness;
use bgrun_test_utils::builders::HarnessConfigBuilder;

pub type TestResult = Result<(), Box<dyn Error>>;

/// Harness in a temporary root with a short poll interval.
pub fn temp_harness() -> Harness {
    let config = HarnessConfigBuilder::new().poll_interval("10ms").build();
    Harness::temporary_with_config(config).expect("creating temporary harness")
}

/// Arguments for `sh -c <script>`.
pub fn sh(script: &str) -> [String; 2] {
    ["-c".to_string(), script.to_string()]
}

pub fn secs(s: u64) -> Option<Duration> {
    Some(Duration::from_secs(s))
}

pub fn millis(ms: u64) -> Option<Duration> {
    Some(Duration::from_millis(ms))
}
