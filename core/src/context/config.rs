use std::path::{Path, PathBuf};

use xivlog_types::AppConfig;

const APP_NAME: &str = "xivlog";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Store(#[from] confy::ConfyError),

    #[error("delimiter {0:?} cannot separate fields")]
    InvalidDelimiter(char),
}

/// Persistence and validation for [`AppConfig`], which lives in the
/// dependency-free types crate.
pub trait AppConfigExt: Sized {
    fn load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
    fn validate(&self) -> Result<(), ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = confy::load(APP_NAME, None)?;
        config.validate()?;
        Ok(config)
    }

    fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;
        confy::store(APP_NAME, None, self)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, None)?)
    }

    /// The delimiter must never appear inside a field value. Hex digits,
    /// signs, dots and whitespace other than tab all do.
    fn validate(&self) -> Result<(), ConfigError> {
        let d = self.delimiter;
        let in_field_space = d.is_whitespace() && d != '\t';
        if d.is_ascii_alphanumeric() || in_field_space || matches!(d, '-' | '+' | '.' | ':') {
            return Err(ConfigError::InvalidDelimiter(d));
        }
        Ok(())
    }
}

/// Resolve a log file path, joining with log_directory if relative.
pub fn resolve_log_path(config: &AppConfig, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(&config.log_directory).join(path)
    }
}
