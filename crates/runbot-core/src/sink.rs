//! Message sink boundary for the chat transport.
//!
//! The core never talks to the chat service directly; it posts, edits and
//! disposes of messages through this trait. Each pipeline owns the messages
//! it creates; a handle is never shared between two concurrent relays.

use crate::errors::SinkError;
use async_trait::async_trait;
use std::time::Duration;

/// Opaque reference to a message owned by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub String);

impl MessageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Trait for the externally-owned, updatable message transport.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Post a new message and return a handle for later edits.
    async fn post(&self, text: &str) -> Result<MessageHandle, SinkError>;

    /// Replace the content of an existing message in place.
    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), SinkError>;

    /// Schedule deletion of a message after the given delay. Must not block
    /// the caller for the duration of the delay.
    async fn dispose_after(&self, handle: &MessageHandle, delay: Duration)
        -> Result<(), SinkError>;
}
