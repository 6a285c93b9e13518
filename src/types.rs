// src/types.rs

/// Outcome of a script that ran to completion.
///
/// Fields are private so a result cannot be altered once built; `stdout` and
/// `stderr` are exact captures of the interpreter's streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    return_code: i32,
    stdout: String,
    stderr: String,
}

impl ExecutionResult {
    pub fn new(return_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            return_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}
