// src/exec/backend.rs

//! Pluggable script runner abstraction.
//!
//! Connection handlers talk to a `ScriptRunner` instead of spawning processes
//! themselves. Production code uses [`super::InterpreterRunner`]; tests can
//! provide a runner that records calls and returns canned outcomes without
//! touching the filesystem.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::RunError;
use crate::types::ExecutionResult;

pub type RunFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ExecutionResult, RunError>> + Send + 'a>>;

/// Executes one script under a wall-clock bound.
///
/// Implementations must produce exactly one terminal outcome per call and
/// must not leave anything behind (processes, directories) once the future
/// resolves or is dropped.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script: String, timeout: Duration) -> RunFuture<'_>;
}
