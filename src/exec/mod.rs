// src/exec/mod.rs

//! Script execution layer.
//!
//! - [`backend`] provides the `ScriptRunner` trait the connection handler is
//!   written against.
//! - [`interpreter`] is the production runner: scratch directory, external
//!   interpreter via `tokio::process::Command`, wall-clock timeout.

pub mod backend;
pub mod interpreter;

pub use backend::{RunFuture, ScriptRunner};
pub use interpreter::InterpreterRunner;
