//! Process execution seam.
//!
//! Everything that talks to the outside world (flutter, ifconfig, open, ...)
//! goes through [`CommandRunner`], so the deployment logic can be exercised
//! against scripted output in tests.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{DeployError, Result};
use crate::utils::command_line;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture both output streams.
    ///
    /// A non-zero exit is not an error here; callers inspect `code`.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run with the terminal attached (stdin, stdout and stderr inherited)
    /// and return only the exit code.
    async fn run_streaming(&self, program: &str, args: &[&str]) -> Result<Option<i32>>;

    /// Like [`run`](Self::run), but a non-zero exit becomes [`DeployError::Toolchain`].
    async fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(program, args).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(DeployError::Toolchain {
                command: command_line(program, args),
                code: output.code,
                stderr: output.stderr,
            })
        }
    }
}

/// Runs real processes via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> DeployError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => DeployError::ToolNotFound {
            program: program.to_string(),
        },
        _ => DeployError::Io(err),
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!("running `{}`", command_line(program, args));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(program, e))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_streaming(&self, program: &str, args: &[&str]) -> Result<Option<i32>> {
        tracing::debug!("running `{}` (attached)", command_line(program, args));

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(program, e))?;

        Ok(status.code())
    }
}
