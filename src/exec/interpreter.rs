// src/exec/interpreter.rs

//! Runs a script through an external interpreter in a scratch directory.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, anyhow};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::ServerConfig;
use crate::errors::RunError;
use crate::types::ExecutionResult;

use super::backend::{RunFuture, ScriptRunner};

/// Production [`ScriptRunner`].
///
/// Every call gets its own `TempDir`; the guard lives until the end of
/// [`InterpreterRunner::run_in_scratch`], so the directory is removed on
/// every return path, including timeouts and `?` early exits.
///
/// On unix the interpreter leads a fresh process group, and that group is
/// killed before the directory goes away. Processes the script started in
/// the background die with it.
#[derive(Debug, Clone)]
pub struct InterpreterRunner {
    interpreter: Vec<String>,
    script_filename: String,
}

impl InterpreterRunner {
    /// `interpreter` is the program plus leading arguments; the script
    /// filename is appended as the last argument.
    pub fn new(interpreter: Vec<String>, script_filename: impl Into<String>) -> Self {
        Self {
            interpreter,
            script_filename: script_filename.into(),
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self::new(cfg.interpreter.clone(), cfg.script_filename.clone())
    }

    async fn run_in_scratch(
        &self,
        script: String,
        timeout: Duration,
    ) -> Result<ExecutionResult, RunError> {
        let scratch = tempfile::Builder::new()
            .prefix("codexec-")
            .tempdir()
            .context("creating scratch directory")?;
        let exec_dir = scratch.path();
        let span = info_span!("execution", exec_dir = %exec_dir.display());

        self.run_in_dir(exec_dir, script, timeout)
            .instrument(span)
            .await
    }

    async fn run_in_dir(
        &self,
        exec_dir: &Path,
        script: String,
        timeout: Duration,
    ) -> Result<ExecutionResult, RunError> {
        debug!("created isolated execution directory");

        let script_path = exec_dir.join(&self.script_filename);
        tokio::fs::write(&script_path, script.as_bytes())
            .await
            .with_context(|| format!("writing script to {}", script_path.display()))?;

        let (program, args) = self
            .interpreter
            .split_first()
            .ok_or_else(|| anyhow!("no interpreter configured"))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(&self.script_filename)
            .current_dir(exec_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning interpreter '{program}'"))?;
        // Declared after the child so it drops first.
        let group = ProcessGroup::of(&child);

        let mut stdout_pipe = child.stdout.take().context("child stdout not captured")?;
        let mut stderr_pipe = child.stderr.take().context("child stderr not captured")?;

        // The bound covers draining the pipes as well as the exit, so a
        // grandchild holding stdout open cannot outlive the timeout.
        let finished = tokio::time::timeout(timeout, async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let (status, out_read, err_read) = tokio::join!(
                child.wait(),
                stdout_pipe.read_to_end(&mut stdout),
                stderr_pipe.read_to_end(&mut stderr),
            );
            out_read.context("reading interpreter stdout")?;
            err_read.context("reading interpreter stderr")?;
            let status = status.context("waiting for interpreter")?;
            Ok::<_, anyhow::Error>((status, stdout, stderr))
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(collected) => collected?,
            Err(_) => {
                warn!(
                    timeout_secs = timeout.as_secs_f64(),
                    "script timed out; killing process group"
                );
                group.kill();
                // `kill` also reaps the child.
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill timed out interpreter");
                }
                return Err(RunError::TimedOut(timeout));
            }
        };

        let return_code = exit_code(status);
        info!(
            return_code,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "execution finished"
        );

        Ok(ExecutionResult::new(
            return_code,
            String::from_utf8_lossy(&stdout),
            String::from_utf8_lossy(&stderr),
        ))
    }
}

impl ScriptRunner for InterpreterRunner {
    fn run(&self, script: String, timeout: Duration) -> RunFuture<'_> {
        Box::pin(self.run_in_scratch(script, timeout))
    }
}

/// Process group led by a spawned interpreter.
///
/// Dropping it sends `SIGKILL` to the whole group, so nothing the script
/// left running in the background outlives the run.
struct ProcessGroup {
    #[cfg(unix)]
    pgid: Option<nix::unistd::Pid>,
}

impl ProcessGroup {
    fn of(child: &tokio::process::Child) -> Self {
        #[cfg(unix)]
        {
            let pgid = child
                .id()
                .and_then(|id| i32::try_from(id).ok())
                .map(nix::unistd::Pid::from_raw);
            Self { pgid }
        }
        #[cfg(not(unix))]
        {
            let _ = child;
            Self {}
        }
    }

    fn kill(&self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            use nix::errno::Errno;
            use nix::sys::signal::{Signal, killpg};

            match killpg(pgid, Signal::SIGKILL) {
                // Group already gone.
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => warn!(pgid = pgid.as_raw(), error = %e, "failed to kill process group"),
            }
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Exit code, or the negated signal number when the process was killed by a
/// signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
