//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

use crate::utils::logger::LogLevel;

/// Environment variable prefix
const ENV_PREFIX: &str = "ATEST";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Log level from ATEST_LOG_LEVEL
    pub log_level: Option<LogLevel>,
    /// Poll interval from ATEST_POLL_US
    pub poll_interval_us: Option<u64>,
    /// Default wait from ATEST_WAIT_MS
    pub default_wait_ms: Option<u64>,
    /// Config file from ATEST_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            log_level: get_env_parse("LOG_LEVEL"),
            poll_interval_us: get_env_parse("POLL_US"),
            default_wait_ms: get_env_parse("WAIT_MS"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.log_level.is_some()
            || self.poll_interval_us.is_some()
            || self.default_wait_ms.is_some()
            || self.config_file.is_some()
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}
