//! Console stand-in for the chat transport.
//!
//! Posts and edits render as stdout lines tagged with the message id, and
//! scheduled disposals print a tombstone once their delay elapses. Good
//! enough to watch a build or run stream by hand.

use async_trait::async_trait;
use runbot_core::errors::SinkError;
use runbot_core::sink::{MessageHandle, MessageSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct ConsoleSink {
    next_id: AtomicUsize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn post(&self, text: &str) -> Result<MessageHandle, SinkError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        println!("[#{}] {}", id, text);
        Ok(MessageHandle::new(id.to_string()))
    }

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<(), SinkError> {
        println!("[#{} ~] {}", handle.0, text);
        Ok(())
    }

    async fn dispose_after(
        &self,
        handle: &MessageHandle,
        delay: Duration,
    ) -> Result<(), SinkError> {
        let id = handle.0.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            println!("[#{} x]", id);
        });
        Ok(())
    }
}
