//! Container engine abstraction for sandboxed builds and runs.
//!
//! The engine is an external collaborator: this module only defines the
//! seam the pipelines drive (a streamed image build, a streamed run, an
//! explicit kill) plus the event types crossing it. The Docker
//! implementation lives in [`docker`]; tests substitute scripted mocks.

use crate::errors::EngineError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::path::Path;
use std::pin::Pin;

pub mod docker;

pub use docker::DockerEngine;

/// One structured event from a streamed image build.
///
/// Engines report builds as a sequence of JSON objects; an event carrying
/// an `error` key marks the build failed. The textual rendering used for
/// relaying is the event's values joined by newline.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEvent(pub serde_json::Value);

impl BuildEvent {
    /// Whether this event carries the engine's error indicator.
    pub fn is_error(&self) -> bool {
        self.0.get("error").is_some()
    }

    /// Serialized values of the event, joined by newline.
    pub fn render(&self) -> String {
        match self.0.as_object() {
            Some(map) => map
                .values()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            None => self.0.to_string(),
        }
    }
}

/// Stream of build events as they are emitted by the engine.
pub type BuildEventStream = Pin<Box<dyn Stream<Item = Result<BuildEvent, EngineError>> + Send>>;

/// Stream of raw output chunks from a running container.
pub type OutputStream = Pin<Box<dyn Stream<Item = Result<Bytes, EngineError>> + Send>>;

/// A started container together with its live output.
pub struct RunningContainer {
    /// Engine-side identity, usable with [`ContainerEngine::kill`].
    pub id: String,
    pub output: OutputStream,
}

/// Seam in front of the container engine. Both pipelines depend on this
/// trait, never on bollard directly.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Submit a Dockerfile build targeting `tag` and return its event
    /// stream. The stream ends when the engine finishes or fails the build.
    async fn build(&self, dockerfile: &str, tag: &str) -> Result<BuildEventStream, EngineError>;

    /// Start a container from `image` with `scratch_dir` mounted as the
    /// sandbox working directory, and return its output stream.
    async fn run(&self, image: &str, scratch_dir: &Path) -> Result<RunningContainer, EngineError>;

    /// Terminate a running container. Used when the execution timeout fires;
    /// abandoning the output stream alone would leak the process.
    async fn kill(&self, container_id: &str) -> Result<(), EngineError>;
}
