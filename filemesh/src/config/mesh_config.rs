use crate::config::{LoggingConfig, TransferConfig};
use crate::error::{MeshError, Result};
use config_loader::ConfigSearch;
use logging::{LogLevel, Logger};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "filemesh_config.json";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "FILEMESH_CONFIG";

/// FileMesh configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub transfer: TransferConfig,
    pub logging: LoggingConfig,
}

impl MeshConfig {
    /// Parses a whole configuration document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MeshError::Config(e.to_string()))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = config_loader::load_config_file(path)?;
        Self::from_json_str(&content)
    }

    /// Searches `$FILEMESH_CONFIG`, `./config/` and `./` for the configuration file.
    pub fn find_and_load() -> Result<Self> {
        let content = ConfigSearch::new(CONFIG_FILE_NAME)
            .env_var(CONFIG_ENV_VAR)
            .load()?;
        Self::from_json_str(&content)
    }

    /// Parsed log level; unknown names fall back to `info`.
    pub fn log_level(&self) -> LogLevel {
        self.logging.log_level.parse().unwrap_or(LogLevel::Info)
    }

    /// Builds the root logger described by the logging section.
    ///
    /// # Errors
    ///
    /// Returns error if file logging is enabled and the log file cannot be opened.
    pub fn init_logger(&self, component: &str) -> Result<Logger> {
        let level = self.log_level();
        let logging = &self.logging;

        if logging.enable_file {
            Logger::with_component(
                Path::new(&logging.log_file_path),
                level,
                component,
                logging.enable_console,
            )
            .map_err(|e| MeshError::Config(format!("cannot open log file: {}", e)))
        } else if logging.enable_console {
            Ok(Logger::console(level, component))
        } else {
            Ok(Logger::disabled())
        }
    }
}
