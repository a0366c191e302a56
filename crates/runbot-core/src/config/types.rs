//! Configuration type definitions for the evaluation service
//!
//! Hierarchical configuration with sensible defaults. Optional sections let
//! a deployment start from an empty file and tighten individual settings as
//! needed.

use crate::errors::CoreError;
use crate::types::Behavior;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunbotConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub eval: EvalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file, created if missing.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hard wall-clock bound on consuming a run's output, in seconds.
    #[serde(default = "default_exec_timeout")]
    pub exec_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exec_timeout_secs: default_exec_timeout(),
        }
    }
}

impl EngineConfig {
    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Behavior persisted on a user's first contact.
    #[serde(default = "default_behavior")]
    pub default_behavior: Behavior,
    /// Lifetime of short conversational notices before disposal, in seconds.
    #[serde(default = "default_notice_ttl")]
    pub notice_ttl_secs: u64,
    /// Lifetime of the transient build/run status message, in seconds.
    #[serde(default = "default_status_ttl")]
    pub status_ttl_secs: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            default_behavior: default_behavior(),
            notice_ttl_secs: default_notice_ttl(),
            status_ttl_secs: default_status_ttl(),
        }
    }
}

impl EvalConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_ttl_secs)
    }

    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }
}

impl RunbotConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::config_error("database.path must not be empty"));
        }
        if self.engine.exec_timeout_secs == 0 {
            return Err(CoreError::config_error(
                "engine.exec_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_database_path() -> String {
    "runbot.db".to_string()
}

fn default_exec_timeout() -> u64 {
    30
}

fn default_behavior() -> Behavior {
    Behavior::Manual
}

fn default_notice_ttl() -> u64 {
    10
}

fn default_status_ttl() -> u64 {
    10
}
