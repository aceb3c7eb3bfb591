//! Upload handling configuration.

use std::path::PathBuf;

use super::parse::{env_opt, env_size};
use super::ConfigError;

/// Default maximum size of a single uploaded file (10 MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Upload configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Maximum size of a single uploaded file in bytes.
    pub max_file_size: u64,
    /// Directory uploaded files are written to.
    pub tmp_dir: PathBuf,
}

impl UploadConfig {
    /// Load configuration from environment variables.
    ///
    /// - `UPLOAD_MAX_SIZE`: size with optional k/m/g suffix (default 10m)
    /// - `UPLOAD_TMP_DIR`: target directory (default: system temp dir)
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_file_size = env_size("UPLOAD_MAX_SIZE", "10m")?;
        if max_file_size == 0 {
            return Err(ConfigError::Invalid {
                key: "UPLOAD_MAX_SIZE".into(),
                message: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            max_file_size,
            tmp_dir: env_opt("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
        })
    }

    /// Same configuration with a different temp directory.
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    /// Same configuration with a different size limit.
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_UPLOAD_SIZE,
            tmp_dir: std::env::temp_dir(),
        }
    }
}
