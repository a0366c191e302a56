//! Command-surface gateway for the Runbot evaluation service.
//!
//! Maps raw chat messages onto the core pipelines: a declarative matcher
//! grammar extracts snippet/language/name tokens, an ordered command table
//! turns them into typed commands, and the gateway service executes them
//! against the environment registry, behavior store and container engine.
//! The grammar is independent of the core and swappable for a different
//! command convention.

pub mod commands;
pub mod grammar;
pub mod service;

pub use commands::{parse_command, Command};
pub use grammar::{Captures, Matcher, Pattern};
pub use service::{Caller, EvalGateway};
