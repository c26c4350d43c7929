//! CLI crate: parser, bootstrap and command handlers.
//!
//! `main.rs` is the dispatch shell; everything it needs is re-exported
//! from here so the pieces stay testable.

pub mod bootstrap;
pub mod handlers;
pub mod parser;

pub use bootstrap::{bootstrap, build_tool_registry, shutdown_token, CliContext};
pub use parser::{Cli, Commands, GenerateArgs, JobsCommand, ResumeArgs};
