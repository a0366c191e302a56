//! Core library for the Runbot sandboxed code-evaluation service.
//!
//! This crate provides the infrastructure for running user-submitted code
//! fragments inside per-user container environments: building environments
//! from Dockerfiles, maintaining the exclusive language-to-environment
//! mapping, and streaming build and run output back to a live-updating
//! message under a hard deadline.
//!
//! # Architecture Overview
//!
//! - **Tag namer**: deterministic image tags scoping environments to their
//!   owner or to the shared library
//! - **Store**: SQLite-backed environment registry and per-user behavior
//! - **Engine**: trait seam over the container engine, implemented with the
//!   Docker API
//! - **Pipelines**: build (streamed classification + registry commit) and
//!   execution (staged fragment, bounded relay, explicit kill on timeout)
//! - **Relay & sink**: incremental in-place republishing of streamed output
//!   to an externally-owned message

pub mod config;
pub mod engine;
pub mod errors;
pub mod pipeline;
pub mod relay;
pub mod sink;
pub mod store;
pub mod tag;
pub mod types;

pub use config::RunbotConfig;
pub use engine::{ContainerEngine, DockerEngine};
pub use errors::{CoreError, EngineError, SinkError};
pub use pipeline::{run_build, run_snippet, BuildOutcome, ExecStatus};
pub use relay::relay;
pub use sink::{MessageHandle, MessageSink};
pub use store::{BehaviorStore, EnvironmentRegistry};
pub use tag::image_tag;
pub use types::{Behavior, BuildRequest, Environment, ExecRequest, Snippet};

#[cfg(test)]
pub mod test_utils;
