//! Configuration module
//!
//! Optional settings for the layer that drives the harness. The core types
//! never read files or the environment on their own; a runner loads a
//! [`HarnessConfig`] and hands the pieces to the types that need them.

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::utils::logger::LogLevel;

pub use env::EnvConfig;

/// Harness configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Log level for the `atest` target
    #[serde(default)]
    pub log_level: LogLevel,

    /// Guarded run settings
    #[serde(default)]
    pub guard: GuardConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: LogLevel::default(),
            guard: GuardConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = if is_yaml(path.as_ref()) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Defaults, or the file named by `ATEST_CONFIG`, with the remaining
    /// `ATEST_*` variables applied on top.
    pub fn resolve() -> Result<Self> {
        let env = EnvConfig::load();
        let base = match &env.config_file {
            Some(path) => Self::load(path)
                .with_context(|| format!("Failed to load config from {path}"))?,
            None => Self::default(),
        };

        let config = base.with_env(&env);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if !env.has_any() {
            return self;
        }
        debug!("Applying ATEST_* overrides to harness config");

        if let Some(level) = env.log_level {
            self.log_level = level;
        }
        if let Some(poll) = env.poll_interval_us {
            self.guard.poll_interval_us = poll;
        }
        if let Some(wait) = env.default_wait_ms {
            self.guard.default_wait_ms = wait;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        self.guard.validate()
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

/// Settings for [`UnitThread`](crate::executor::UnitThread)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Sleep between polls of the running flag, in microseconds. Zero spins.
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,

    /// Wait used by `run_with_default_wait`, in milliseconds
    #[serde(default = "default_wait_ms")]
    pub default_wait_ms: u64,
}

fn default_poll_interval_us() -> u64 {
    100
}

fn default_wait_ms() -> u64 {
    1_000
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            poll_interval_us: default_poll_interval_us(),
            default_wait_ms: default_wait_ms(),
        }
    }
}

impl GuardConfig {
    /// Busy-waits with no sleep between polls.
    pub fn spinning(default_wait_ms: u64) -> Self {
        Self {
            poll_interval_us: 0,
            default_wait_ms,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_wait_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_wait_ms > 0 && self.poll_interval() > self.default_wait() {
            anyhow::bail!(
                "Poll interval ({}us) is longer than the default wait ({}ms)",
                self.poll_interval_us,
                self.default_wait_ms
            );
        }
        Ok(())
    }
}
