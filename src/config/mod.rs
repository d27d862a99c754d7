// src/config/mod.rs

//! `Bgrun.toml`: per-project defaults for the harness.
//!
//! Everything lives under a single `[harness]` table and every key is
//! optional, so a missing file and an empty file mean the same thing. Raw
//! strings (durations, signal names) are only turned into typed values by
//! validation; code outside this module only ever sees a [`HarnessConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{HarnessConfig, HarnessSection, RawConfigFile};
