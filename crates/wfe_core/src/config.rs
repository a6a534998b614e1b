//! Harness configuration.

use crate::error::{Result, WfeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "wfe.toml";

/// Comprehensive configuration for the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Namespace all namespaced objects are created in (default: argo).
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// External binaries.
    #[serde(default)]
    pub cli: CliConfig,

    /// Default wait timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Names of the quota objects created by the quota steps.
    #[serde(default)]
    pub quotas: QuotaConfig,
}

fn default_namespace() -> String {
    "argo".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            cli: CliConfig::default(),
            timeouts: TimeoutConfig::default(),
            quotas: QuotaConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults if it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| WfeError::ConfigError(format!("failed to read config: {}", e)))?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| WfeError::ConfigError(format!("failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| WfeError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| WfeError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(WfeError::ConfigError("namespace must not be empty".into()));
        }
        if self.timeouts.start_secs == 0 || self.timeouts.finish_secs == 0 {
            return Err(WfeError::ConfigError("timeouts must be positive".into()));
        }
        Ok(())
    }
}

/// Paths of the external binaries the harness drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// kubectl binary used by the kubectl backend (default: kubectl).
    pub kubectl: String,

    /// argo CLI binary used by `run_cli` steps (default: ../../dist/argo).
    pub argo: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            argo: "../../dist/argo".to_string(),
        }
    }
}

/// Default timeouts used by the CLI and by callers that don't pick their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Seconds to wait for a workflow to start (default: 60).
    pub start_secs: u64,

    /// Seconds to wait for a workflow to finish (default: 60).
    pub finish_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            start_secs: 60,
            finish_secs: 60,
        }
    }
}

impl TimeoutConfig {
    /// Returns the start timeout as a Duration.
    pub fn start(&self) -> Duration {
        Duration::from_secs(self.start_secs)
    }

    /// Returns the finish timeout as a Duration.
    pub fn finish(&self) -> Duration {
        Duration::from_secs(self.finish_secs)
    }
}

/// Names of the hard quotas created by `memory_quota` and `storage_quota`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Memory quota name (default: memory-quota).
    pub memory_name: String,

    /// Storage quota name (default: storage-quota).
    pub storage_name: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            memory_name: "memory-quota".to_string(),
            storage_name: "storage-quota".to_string(),
        }
    }
}
