use std::sync::{Arc, Mutex};
use std::time::Duration;

use codexec::errors::RunError;
use codexec::exec::{RunFuture, ScriptRunner};
use codexec::types::ExecutionResult;

/// What a [`FakeRunner`] does when called.
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    Complete(ExecutionResult),
    TimedOut,
    Internal(String),
    Panic,
    /// Echo the script back as stdout with return code 0.
    Echo,
}

/// A runner that:
/// - records every script it was asked to run
/// - returns a canned outcome without spawning anything.
#[derive(Clone)]
pub struct FakeRunner {
    outcome: FakeOutcome,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeRunner {
    pub fn new(outcome: FakeOutcome) -> Self {
        Self {
            outcome,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(FakeOutcome::Echo)
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared handle to the recorded scripts.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ScriptRunner for FakeRunner {
    fn run(&self, script: String, timeout: Duration) -> RunFuture<'_> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(script.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match &self.outcome {
                FakeOutcome::Complete(result) => Ok(result.clone()),
                FakeOutcome::TimedOut => Err(RunError::TimedOut(timeout)),
                FakeOutcome::Internal(msg) => Err(RunError::Internal(anyhow::anyhow!(msg.clone()))),
                FakeOutcome::Panic => panic!("fake runner panicked on purpose"),
                FakeOutcome::Echo => Ok(ExecutionResult::new(0, script, "")),
            }
        })
    }
}
