pub mod config;

pub use config::{AppConfig, DEFAULT_DELIMITER, DEFAULT_FOLLOW_POLL_MS, DEFAULT_LOG_FILTER};
