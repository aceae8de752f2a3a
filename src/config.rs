//! Bridge configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HANDLINK_PORT` | 8000 | Loopback TCP port the consumer connects to |
//! | `HANDLINK_POLL_TIMEOUT_MS` | 1000 | Driver poll timeout per iteration |
//! | `HANDLINK_RECORD_CAPACITY` | 4096 | Hard cap on one encoded record, bytes |
//! | `HANDLINK_CAPTURE` | - | Capture file played by the replay source (required by the binary) |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::encode::DEFAULT_RECORD_CAPACITY;

/// Default loopback port the consumer connects to.
pub const DEFAULT_PORT: u16 = 8000;

/// Default driver poll timeout in milliseconds.
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 1000;

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable holds an unusable value.
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Bridge configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Loopback TCP port for the single consumer.
    pub port: u16,

    /// How long each driver poll may block.
    pub poll_timeout: Duration,

    /// Hard cap on one encoded record, in bytes.
    pub record_capacity: usize,

    /// Capture file for the replay source.
    pub capture: PathBuf,
}

impl Config {
    /// Parse configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Parse configuration from any variable lookup. Tests inject
    /// closures here instead of mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or_default(&lookup, "HANDLINK_PORT", DEFAULT_PORT)?;
        let poll_timeout_ms =
            parse_or_default(&lookup, "HANDLINK_POLL_TIMEOUT_MS", DEFAULT_POLL_TIMEOUT_MS)?;
        let record_capacity =
            parse_or_default(&lookup, "HANDLINK_RECORD_CAPACITY", DEFAULT_RECORD_CAPACITY)?;
        let capture = lookup("HANDLINK_CAPTURE")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("HANDLINK_CAPTURE".to_string()))?;

        Ok(Self {
            port,
            poll_timeout: Duration::from_millis(poll_timeout_ms),
            record_capacity,
            capture,
        })
    }
}

fn parse_or_default<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var: var.to_string(), value }),
    }
}
