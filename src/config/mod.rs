//! Configuration module for flow_request.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use flow_request::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Upload limit: {}", config.upload.max_file_size);
//! ```

mod error;
mod logging;
mod parse;
mod upload;

pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use parse::parse_size;
pub use upload::{UploadConfig, DEFAULT_MAX_UPLOAD_SIZE};

/// Complete configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Upload handling configuration.
    pub upload: UploadConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            upload: UploadConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Upload limit: {} bytes", self.upload.max_file_size);
        info!("  Upload directory: {:?}", self.upload.tmp_dir);
        info!("  Log filter: {}", self.logging.filter);
    }
}
