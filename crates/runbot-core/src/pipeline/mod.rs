//! Orchestration pipelines over the container engine.
//!
//! A pipeline owns one request from submission to its single terminal
//! notice: [`build`] drives a streamed image build and commits the registry
//! record on success; [`exec`] stages a code fragment, runs it in an
//! ephemeral container and relays its output under the execution deadline.

pub mod build;
pub mod exec;

pub use build::{run_build, BuildOutcome};
pub use exec::{run_snippet, ExecStatus};
