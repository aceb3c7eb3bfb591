//! Environment variable parsing utilities.

use super::ConfigError;

/// Get environment variable with default value.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Parse environment variable as boolean.
/// Treats "1", "true" (case-insensitive) as true.
pub fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(default)
}

/// Parse a byte size string (e.g., "512", "64k", "10m", "1g").
///
/// Suffixes are binary multiples and case-insensitive.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = match s.chars().last() {
        Some('k') => (&s[..s.len() - 1], 1024),
        Some('m') => (&s[..s.len() - 1], 1024 * 1024),
        Some('g') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s.as_str(), 1),
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid size: {}", s))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

/// Parse environment variable as byte size.
pub fn env_size(key: &str, default: &str) -> Result<u64, ConfigError> {
    let value = env_or(key, default);
    parse_size(&value).map_err(|e| ConfigError::Parse {
        key: key.into(),
        value,
        error: e,
    })
}
