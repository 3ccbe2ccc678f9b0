//! Subprocess execution with captured output

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Result of a subprocess execution
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit status
    pub status: ExitStatus,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            success: status.success(),
            status,
            stdout,
            stderr,
            duration,
        }
    }
}

/// Extra process settings on top of the inherited environment
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Variables added to (or replacing entries in) the inherited environment
    pub env: Vec<(String, String)>,

    /// Working directory, the current one when unset
    pub current_dir: Option<PathBuf>,
}

/// Run a command to completion, capturing stdout and stderr
///
/// Only a failure to start the process is an `Err`; a non-zero exit is
/// reported through `CommandResult::success`.
pub fn run_command<S: Into<OsString>>(
    program: S,
    args: &[String],
    options: &RunOptions,
) -> Result<CommandResult> {
    let start = Instant::now();
    let program = program.into();

    let mut cmd = Command::new(&program);
    cmd.args(args);
    cmd.envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if let Some(dir) = &options.current_dir {
        cmd.current_dir(dir);
    }

    let output = cmd
        .output()
        .with_context(|| format!("Failed to execute {}", program.to_string_lossy()))?;

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    Ok(CommandResult::from_status(
        output.status,
        stdout,
        stderr,
        duration,
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_captures_output_and_status() {
        let result = run_command("sh", &sh("echo out; echo err >&2; exit 3"), &RunOptions::default())
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.status.code(), Some(3));
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }

    #[test]
    fn test_env_and_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let options = RunOptions {
            env: vec![("GOX_TEST_VALUE".to_string(), "hello".to_string())],
            current_dir: Some(temp_dir.path().to_path_buf()),
        };

        let result = run_command("sh", &sh("echo $GOX_TEST_VALUE; pwd"), &options).unwrap();
        assert!(result.success);

        let lines: Vec<&str> = result.stdout.lines().collect();
        assert_eq!(lines[0], "hello");
        let reported = std::fs::canonicalize(lines[1]).unwrap();
        assert_eq!(reported, std::fs::canonicalize(temp_dir.path()).unwrap());
    }

    #[test]
    fn test_missing_program_is_error() {
        let err = run_command("gox-definitely-missing-binary", &[], &RunOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to execute gox-definitely-missing-binary"));
    }
}
