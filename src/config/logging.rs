//! Logging configuration.

use super::parse::{env_bool, env_or};
use super::ConfigError;

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: flow_request=debug,multer=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        let filter = Self::resolve_log_filter();
        Ok(Self {
            filter,
            service_name: env_or("SERVICE_NAME", "flow_request"),
            json: env_bool("LOG_JSON", true),
        })
    }

    /// Resolve log filter from environment.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter() -> String {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("flow_request={}", level);
                }
                _ => {
                    // Invalid level, fall through to RUST_LOG
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Ok(filter) = std::env::var("RUST_LOG") {
            return filter;
        }

        "flow_request=info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "flow_request=info".to_string(),
            service_name: "flow_request".to_string(),
            json: true,
        }
    }
}
