mod config;

pub use config::{AppConfigExt, ConfigError, resolve_log_path};
pub use xivlog_types::AppConfig;
