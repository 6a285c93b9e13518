// tests/interpreter_runner.rs

//! Real-process tests for `InterpreterRunner`, using `sh` as the interpreter.

#![cfg(unix)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use codexec::errors::RunError;
use codexec::exec::{InterpreterRunner, ScriptRunner};
use codexec_test_utils::{init_tracing, with_timeout};

fn sh_runner() -> InterpreterRunner {
    InterpreterRunner::new(vec!["sh".to_string()], "main.sh")
}

const GENEROUS: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_stdout_and_zero_exit() {
    init_tracing();
    let result = with_timeout(sh_runner().run("echo ok".into(), GENEROUS))
        .await
        .unwrap();

    assert_eq!(result.return_code(), 0);
    assert!(result.success());
    assert_eq!(result.stdout(), "ok\n");
    assert_eq!(result.stderr(), "");
}

#[tokio::test]
async fn test_stderr_and_exit_code_42() {
    init_tracing();
    let script = "echo 'This will go to stdout.'\necho 'This is an error message.' >&2\nexit 42\n";
    let result = with_timeout(sh_runner().run(script.into(), GENEROUS))
        .await
        .unwrap();

    assert_eq!(result.return_code(), 42);
    assert!(!result.success());
    assert_eq!(result.stdout(), "This will go to stdout.\n");
    assert!(result.stderr().contains("This is an error message."));
}

#[tokio::test]
async fn test_killed_by_signal_reports_negative_code() {
    init_tracing();
    let result = with_timeout(sh_runner().run("kill -9 $$".into(), GENEROUS))
        .await
        .unwrap();

    assert_eq!(result.return_code(), -9);
}

#[tokio::test]
async fn test_script_file_is_passed_to_interpreter_in_scratch_dir() {
    init_tracing();
    let runner = InterpreterRunner::new(vec!["sh".to_string(), "-e".to_string()], "job.sh");
    let result = with_timeout(runner.run("ls\npwd".into(), GENEROUS))
        .await
        .unwrap();

    let mut lines = result.stdout().lines();
    assert_eq!(lines.next(), Some("job.sh"));
    let cwd = lines.next().unwrap();
    assert!(cwd.contains("codexec-"), "unexpected working dir {cwd}");
}

#[tokio::test]
async fn test_scratch_dir_is_removed_after_run() {
    init_tracing();
    let result = with_timeout(sh_runner().run("pwd".into(), GENEROUS))
        .await
        .unwrap();

    let dir = PathBuf::from(result.stdout().trim_end());
    assert!(!dir.as_os_str().is_empty());
    assert!(!dir.exists(), "scratch dir {dir:?} still exists");
}

/// A killed process can linger as a zombie until its new parent reaps it,
/// and `kill -0` still succeeds on a zombie, so `/proc` is checked first.
fn process_is_running(pid: &str) -> bool {
    let stat = std::path::Path::new("/proc").join(pid).join("stat");
    if let Ok(stat) = std::fs::read_to_string(&stat) {
        let state = stat.rsplit(')').next().and_then(|rest| rest.split_whitespace().next());
        return state != Some("Z");
    }
    if std::path::Path::new("/proc/self").exists() {
        return false;
    }
    std::process::Command::new("kill")
        .args(["-0", pid])
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap()
        .success()
}

async fn wait_until_gone(pid: &str) -> bool {
    for _ in 0..40 {
        if !process_is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_timeout_kills_process_and_cleans_up() {
    init_tracing();
    let marker_dir = tempfile::tempdir().unwrap();
    let pid_file = marker_dir.path().join("pid");
    let dir_file = marker_dir.path().join("dir");
    let script = format!(
        "pwd > '{}'\necho $$ > '{}'\nwhile :; do sleep 1; done\n",
        dir_file.display(),
        pid_file.display()
    );

    let started = Instant::now();
    let err = with_timeout(sh_runner().run(script, Duration::from_millis(500)))
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::TimedOut(_)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));

    let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
    assert!(wait_until_gone(&pid).await, "interpreter pid {pid} survived the timeout");

    let scratch = PathBuf::from(std::fs::read_to_string(&dir_file).unwrap().trim_end());
    assert!(!scratch.exists(), "scratch dir {scratch:?} still exists");
}

#[tokio::test]
async fn test_timeout_kills_background_children() {
    init_tracing();
    let marker_dir = tempfile::tempdir().unwrap();
    let pid_file = marker_dir.path().join("child_pid");
    let script = format!("sleep 30 &\necho $! > '{}'\nwait\n", pid_file.display());

    let err = with_timeout(sh_runner().run(script, Duration::from_millis(500)))
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::TimedOut(_)), "got {err:?}");

    let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
    assert!(!pid.is_empty());
    assert!(wait_until_gone(&pid).await, "background child {pid} survived the timeout");
}

#[tokio::test]
async fn test_detached_children_do_not_outlive_a_finished_run() {
    init_tracing();
    let marker_dir = tempfile::tempdir().unwrap();
    let pid_file = marker_dir.path().join("child_pid");
    let script = format!(
        "sleep 30 > /dev/null 2>&1 &\necho $! > '{}'\necho done\n",
        pid_file.display()
    );

    let result = with_timeout(sh_runner().run(script, GENEROUS))
        .await
        .unwrap();
    assert_eq!(result.return_code(), 0);
    assert_eq!(result.stdout(), "done\n");

    let pid = std::fs::read_to_string(&pid_file).unwrap().trim().to_string();
    assert!(wait_until_gone(&pid).await, "detached child {pid} survived the run");
}

#[tokio::test]
async fn test_concurrent_runs_do_not_share_files() {
    init_tracing();
    let runner = sh_runner();

    let script_a = "echo alpha > shared.txt\nsleep 0.3\ncat shared.txt".to_string();
    let script_b = "echo beta > shared.txt\nsleep 0.3\ncat shared.txt".to_string();

    let (a, b) = with_timeout(async {
        tokio::join!(runner.run(script_a, GENEROUS), runner.run(script_b, GENEROUS))
    })
    .await;

    assert_eq!(a.unwrap().stdout(), "alpha\n");
    assert_eq!(b.unwrap().stdout(), "beta\n");
}

#[tokio::test]
async fn test_missing_interpreter_is_internal_error() {
    init_tracing();
    let runner = InterpreterRunner::new(vec!["codexec-no-such-interpreter".to_string()], "main.sh");
    let err = with_timeout(runner.run("echo hi".into(), GENEROUS))
        .await
        .unwrap_err();

    assert!(matches!(err, RunError::Internal(_)), "got {err:?}");
}
