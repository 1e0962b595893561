//! Application configuration shared between the core and the CLI.
//!
//! Loading and saving live in `xivlog-core`; this crate only defines the
//! shape so every consumer agrees on field names and defaults.

use serde::{Deserialize, Serialize};

/// Field delimiter used by ACT network log lines.
pub const DEFAULT_DELIMITER: char = '|';

/// How long the follow reader sleeps at end of file before polling again.
pub const DEFAULT_FOLLOW_POLL_MS: u64 = 100;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory relative log paths are resolved against.
    pub log_directory: String,
    pub delimiter: char,
    pub follow_poll_ms: u64,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_directory: String::new(),
            delimiter: DEFAULT_DELIMITER,
            follow_poll_ms: DEFAULT_FOLLOW_POLL_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
