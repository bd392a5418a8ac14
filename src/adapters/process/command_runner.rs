use std::io::ErrorKind;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::core::errors::{DeviceConfError, Result};

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Stderr as trimmed, lossily decoded text.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Runs an external command with a hard timeout.
///
/// The command line is a program plus fixed leading arguments, taken from
/// configuration; per-call arguments are appended. A child that outlives
/// the timeout is killed.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    base_args: Vec<String>,
    timeout: Duration,
}

impl CommandRunner {
    /// Build a runner from an argv-style list (`["wdiff", "-d"]`).
    pub fn from_argv(argv: &[String], timeout: Duration) -> Result<Self> {
        let Some((program, base_args)) = argv.split_first() else {
            return Err(DeviceConfError::InvalidConfig {
                detail: "external command must not be empty".into(),
            });
        };

        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
            timeout,
        })
    }

    /// The configured command line, for messages.
    pub fn display_name(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.base_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command with `extra_args`, feeding `input` on stdin.
    ///
    /// Returns the captured output whatever the exit status; callers decide
    /// which statuses count as failure.
    pub fn run(&self, extra_args: &[String], input: Option<&[u8]>) -> Result<CommandOutput> {
        let tool = self.display_name();
        tracing::debug!(%tool, ?extra_args, timeout = ?self.timeout, "running external command");

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DeviceConfError::ToolUnavailable {
                tool: tool.clone(),
                reason: format!("failed to start async runtime: {e}"),
            })?;

        rt.block_on(async {
            let mut cmd = Command::new(&self.program);
            cmd.args(&self.base_args)
                .args(extra_args)
                .stdin(if input.is_some() {
                    Stdio::piped()
                } else {
                    Stdio::null()
                })
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let mut child = cmd.spawn().map_err(|e| DeviceConfError::ToolUnavailable {
                tool: tool.clone(),
                reason: e.to_string(),
            })?;

            let stdin = child.stdin.take();
            let feed = async move {
                let (Some(mut pipe), Some(data)) = (stdin, input) else {
                    return Ok::<(), std::io::Error>(());
                };
                pipe.write_all(data).await?;
                pipe.shutdown().await
            };

            let finished = async {
                let (fed, output) = tokio::join!(feed, child.wait_with_output());
                match fed {
                    // The child may exit without reading all of its input.
                    Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
                output
            };

            let output = tokio::time::timeout(self.timeout, finished)
                .await
                .map_err(|_| DeviceConfError::ToolTimedOut {
                    tool: tool.clone(),
                    timeout: self.timeout,
                })?
                .map_err(|e| DeviceConfError::ToolUnavailable {
                    tool: tool.clone(),
                    reason: e.to_string(),
                })?;

            tracing::debug!(%tool, status = %output.status, "external command finished");

            Ok::<_, DeviceConfError>(CommandOutput {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        })
    }
}
