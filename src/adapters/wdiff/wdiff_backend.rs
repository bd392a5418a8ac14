use crate::adapters::process::command_runner::CommandRunner;
use crate::core::errors::{DeviceConfError, Result};
use crate::core::traits::word_differ::WordDiffer;

/// Word differ that shells out to `wdiff -d`.
///
/// `wdiff` exits with 1 when the input shows differences, so both 0 and 1
/// are treated as success; anything else (or death by signal) is a failure.
pub struct WdiffBackend {
    runner: CommandRunner,
}

impl WdiffBackend {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl WordDiffer for WdiffBackend {
    fn word_diff(&self, unified_diff: &str) -> Result<String> {
        let output = self.runner.run(&[], Some(unified_diff.as_bytes()))?;

        match output.status.code() {
            Some(0 | 1) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            _ => Err(DeviceConfError::ToolFailed {
                tool: self.runner.display_name(),
                status: output.status.to_string(),
                stderr: output.stderr_text(),
            }),
        }
    }

    fn name(&self) -> &str {
        "wdiff"
    }
}
