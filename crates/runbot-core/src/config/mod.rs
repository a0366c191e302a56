//! Configuration module for the evaluation service
//!
//! Supports YAML configuration files with serde defaults so a minimal file
//! (or none at all) yields a working setup, while every knob the pipelines
//! depend on stays overridable.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;

use crate::errors::CoreError;
use std::path::Path;

/// Load a configuration from a YAML file
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<RunbotConfig, CoreError> {
    ConfigLoader::from_file(path).await
}
