//! Error types for failure handling across the evaluation service
//!
//! This module provides the error hierarchy for the core subsystems. User
//! addressable conditions (a missing environment, an unknown name) are not
//! represented here; those are resolved into conversational notices at the
//! gateway and never escape as errors. What remains are infrastructure
//! faults: the container engine, the persistent store, and the message sink,
//! each of which is fatal to the single request that hit it and to nothing
//! else.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Container engine operation failed: {0}")]
    Engine(#[from] EngineError),
    #[error("Store operation failed: {0}")]
    Store(#[from] sqlx::Error),
    #[error("Message sink failed: {0}")]
    Sink(#[from] SinkError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

// Specific error for the Docker engine boundary
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Bollard (Docker client) error: {0}")]
    Bollard(#[from] bollard::errors::Error),
    #[error("I/O error during engine operation: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed engine event: {0}")]
    MalformedEvent(String),
}

/// Errors surfaced by a message sink implementation.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Message no longer exists: {0}")]
    Gone(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

impl SinkError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
