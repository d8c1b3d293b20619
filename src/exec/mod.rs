// src/exec/mod.rs

//! External processor execution.
//!
//! Validators, the stylesheet compiler and the linter are external programs.
//! The executor talks to them through the [`ToolBackend`] trait:
//!
//! - [`backend`] defines the trait, the tool kinds and the verdict type.
//! - [`command`] is the production backend: it renders a shell command from
//!   the configured template and runs it with `tokio::process`, under a
//!   watchdog timeout.
//! - [`template`] handles `{placeholder}` substitution.
//!
//! Tests swap in a fake backend that records invocations.

pub mod backend;
pub mod command;
pub mod template;

pub use backend::{ToolBackend, ToolInvocation, ToolKind, ToolVerdict};
pub use command::{CommandBackend, run_shell};
