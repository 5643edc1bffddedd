//! Service configuration parsed from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PORT` | `3000` | TCP port to listen on |
//! | `SHELFMARK_DATA` | `books.json` | Snapshot file the book table is loaded from and flushed to |
//! | `SHELFMARK_FLUSH_SECS` | `1` | Seconds between flushes of a dirty table |

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_PATH: &str = "books.json";
pub const DEFAULT_FLUSH_SECS: u64 = 1;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl ConfigError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub flush_interval: Duration,
}

impl ServerConfig {
    /// Build typed config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a value is present but unparseable,
    /// or the flush interval is zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let data_path = lookup("SHELFMARK_DATA")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_PATH), PathBuf::from);
        let flush_secs = parse_or("SHELFMARK_FLUSH_SECS", lookup("SHELFMARK_FLUSH_SECS"), DEFAULT_FLUSH_SECS)?;
        if flush_secs == 0 {
            return Err(ConfigError::Invalid { var: "SHELFMARK_FLUSH_SECS", value: "0".into() });
        }
        Ok(Self { port, data_path, flush_interval: Duration::from_secs(flush_secs) })
    }
}

fn parse_or<T: std::str::FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}
