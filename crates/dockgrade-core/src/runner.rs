//! External command execution with timeouts.

use crate::error::RunnerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// A command to run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandSpec {
    /// Short label used in logs and errors.
    pub name: String,

    /// Command to execute (first element is executable).
    pub command: Vec<String>,

    /// Timeout in seconds. Zero disables the timeout.
    pub timeout_secs: u64,

    /// Working directory, if any.
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            name: name.into(),
            command,
            timeout_secs,
            cwd: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// The command line joined with spaces, for display.
    pub fn display(&self) -> String {
        self.command.join(" ")
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    /// Exit code (-1 when terminated by a signal).
    pub exit_code: i32,

    pub stdout: String,

    pub stderr: String,

    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last `n` non-empty lines of stderr, for failure details.
    pub fn stderr_tail(&self, n: usize) -> String {
        let lines: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

/// Runs a [`CommandSpec`] to completion.
pub struct CommandRunner;

impl CommandRunner {
    /// Execute a command and capture its output.
    ///
    /// The child is killed if the timeout expires.
    pub async fn execute(spec: &CommandSpec) -> Result<CommandOutput, RunnerError> {
        let start = Instant::now();

        let (exe, args) = spec
            .command
            .split_first()
            .ok_or_else(|| RunnerError::EmptyCommand(spec.name.clone()))?;

        debug!(command = %spec.display(), timeout_secs = spec.timeout_secs, "Spawning command");

        let mut command = Command::new(exe);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| RunnerError::Spawn {
            command: spec.display(),
            source,
        })?;

        let wait = child.wait_with_output();
        let output = if spec.timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(spec.timeout_secs), wait)
                .await
                .map_err(|_| RunnerError::Timeout {
                    command: spec.display(),
                    timeout_secs: spec.timeout_secs,
                })?
        } else {
            wait.await
        }
        .map_err(|source| RunnerError::Wait {
            command: spec.display(),
            source,
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        debug!(command = %spec.name, exit_code, duration_ms, "Command finished");

        Ok(CommandOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: i32, stderr: &str) -> CommandOutput {
        CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
            duration_ms: 10,
        }
    }

    #[test]
    fn test_output_success() {
        assert!(output(0, "").success());
        assert!(!output(1, "error").success());
    }

    #[test]
    fn test_stderr_tail() {
        let out = output(1, "step 1\n\nstep 2\nERROR: failed to solve\n");
        assert_eq!(out.stderr_tail(2), "step 2\nERROR: failed to solve");
        assert_eq!(out.stderr_tail(10), "step 1\nstep 2\nERROR: failed to solve");
    }

    #[tokio::test]
    async fn test_execute_simple_command() {
        let spec = CommandSpec::new("echo_test", vec!["echo".to_string(), "hello".to_string()], 60);
        let result = CommandRunner::execute(&spec).await.expect("execute failed");
        assert!(result.success());
        assert!(result.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let spec = CommandSpec::new("false_test", vec!["false".to_string()], 60);
        let result = CommandRunner::execute(&spec).await.expect("execute failed");
        assert!(!result.success());
        assert_ne!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_execute_empty_command() {
        let spec = CommandSpec::new("empty", vec![], 60);
        let err = CommandRunner::execute(&spec).await.unwrap_err();
        assert!(matches!(err, RunnerError::EmptyCommand(_)));
    }

    #[tokio::test]
    async fn test_execute_missing_binary() {
        let spec = CommandSpec::new(
            "missing",
            vec!["dockgrade-no-such-binary-xyz".to_string()],
            5,
        );
        let err = CommandRunner::execute(&spec).await.unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_execute_times_out() {
        let spec = CommandSpec::new("sleep", vec!["sleep".to_string(), "5".to_string()], 1);
        let err = CommandRunner::execute(&spec).await.unwrap_err();
        assert!(matches!(err, RunnerError::Timeout { timeout_secs: 1, .. }));
    }

    #[tokio::test]
    async fn test_execute_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("pwd", vec!["pwd".to_string()], 10).in_dir(dir.path());
        let result = CommandRunner::execute(&spec).await.expect("execute failed");
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
