//! Shared test doubles: a scripted container engine and a recording sink.

use crate::engine::{BuildEvent, BuildEventStream, ContainerEngine, RunningContainer};
use crate::errors::{EngineError, SinkError};
use crate::pipeline::exec::CODE_FILENAME;
use crate::sink::{MessageHandle, MessageSink};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Container engine double scripted with canned build events and run
/// output. Records what the pipelines hand it.
pub struct MockEngine {
    build_events: Vec<serde_json::Value>,
    run_output: Vec<String>,
    hang: bool,
    builds: Mutex<Vec<(String, String)>>,
    kills: Mutex<Vec<String>>,
    staged: Mutex<Vec<String>>,
    run_dirs: Mutex<Vec<PathBuf>>,
    next_id: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            build_events: Vec::new(),
            run_output: Vec::new(),
            hang: false,
            builds: Mutex::new(Vec::new()),
            kills: Mutex::new(Vec::new()),
            staged: Mutex::new(Vec::new()),
            run_dirs: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    pub fn with_build_events(mut self, events: Vec<serde_json::Value>) -> Self {
        self.build_events = events;
        self
    }

    pub fn with_run_output(mut self, chunks: Vec<&str>) -> Self {
        self.run_output = chunks.into_iter().map(str::to_string).collect();
        self
    }

    /// Keep the run's output stream open forever after the scripted chunks,
    /// for exercising the execution deadline.
    pub fn hanging_run(mut self) -> Self {
        self.hang = true;
        self
    }

    /// `(dockerfile, tag)` pairs submitted to [`ContainerEngine::build`].
    pub fn builds(&self) -> Vec<(String, String)> {
        self.builds.lock().unwrap().clone()
    }

    pub fn killed(&self) -> Vec<String> {
        self.kills.lock().unwrap().clone()
    }

    /// Contents of the staged code file observed at each run start.
    pub fn staged_code(&self) -> Vec<String> {
        self.staged.lock().unwrap().clone()
    }

    pub fn run_dirs(&self) -> Vec<PathBuf> {
        self.run_dirs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn build(&self, dockerfile: &str, tag: &str) -> Result<BuildEventStream, EngineError> {
        self.builds
            .lock()
            .unwrap()
            .push((dockerfile.to_string(), tag.to_string()));

        let events = self
            .build_events
            .clone()
            .into_iter()
            .map(|value| Ok(BuildEvent(value)))
            .collect::<Vec<_>>();
        Ok(Box::pin(futures_util::stream::iter(events)))
    }

    async fn run(&self, _image: &str, scratch_dir: &Path) -> Result<RunningContainer, EngineError> {
        let staged = std::fs::read_to_string(scratch_dir.join(CODE_FILENAME))?;
        self.staged.lock().unwrap().push(staged);
        self.run_dirs.lock().unwrap().push(scratch_dir.to_path_buf());

        let id = format!("mock-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let chunks = self
            .run_output
            .clone()
            .into_iter()
            .map(|chunk| Ok(Bytes::from(chunk)))
            .collect::<Vec<_>>();
        let base = futures_util::stream::iter(chunks);

        let output: crate::engine::OutputStream = if self.hang {
            Box::pin(base.chain(futures_util::stream::pending()))
        } else {
            Box::pin(base)
        };

        Ok(RunningContainer { id, output })
    }

    async fn kill(&self, container_id: &str) -> Result<(), EngineError> {
        self.kills.lock().unwrap().push(container_id.to_string());
        Ok(())
    }
}

/// Message sink double recording every post, edit and disposal.
pub struct RecordingSink {
    posts: Mutex<Vec<String>>,
    edits: Mutex<Vec<String>>,
    disposals: Mutex<Vec<(MessageHandle, Duration)>>,
    fail_edits: bool,
    next_id: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            disposals: Mutex::new(Vec::new()),
            fail_edits: false,
            next_id: AtomicUsize::new(0),
        }
    }

    /// Reject every edit, simulating a deleted or unreachable message.
    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn posts(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }

    pub fn last_post(&self) -> Option<String> {
        self.posts.lock().unwrap().last().cloned()
    }

    pub fn edits(&self) -> Vec<String> {
        self.edits.lock().unwrap().clone()
    }

    pub fn disposed_count(&self) -> usize {
        self.disposals.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn post(&self, text: &str) -> Result<MessageHandle, SinkError> {
        self.posts.lock().unwrap().push(text.to_string());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(MessageHandle::new(format!("m{}", id)))
    }

    async fn edit(&self, _handle: &MessageHandle, text: &str) -> Result<(), SinkError> {
        if self.fail_edits {
            return Err(SinkError::transport("edit rejected"));
        }
        self.edits.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn dispose_after(
        &self,
        handle: &MessageHandle,
        delay: Duration,
    ) -> Result<(), SinkError> {
        self.disposals.lock().unwrap().push((handle.clone(), delay));
        Ok(())
    }
}
