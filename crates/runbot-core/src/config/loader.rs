//! Configuration loader for YAML files

use crate::config::types::RunbotConfig;
use crate::errors::CoreError;
use std::path::Path;
use tokio::fs;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<RunbotConfig, CoreError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            CoreError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<RunbotConfig, CoreError> {
        let config: RunbotConfig = serde_yaml::from_str(content)
            .map_err(|e| CoreError::config_error(format!("Failed to parse YAML config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}
