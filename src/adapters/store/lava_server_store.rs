use crate::adapters::process::command_runner::CommandRunner;
use crate::core::errors::{DeviceConfError, Result};
use crate::core::traits::device_store::DeviceStore;

/// Device store backed by the `lava-server manage device-dictionary` command.
///
/// The export is requested with `--hostname=<device> --export` appended to
/// the configured command line; the command prints the resolved device
/// configuration on stdout.
pub struct LavaServerStore {
    runner: CommandRunner,
}

impl LavaServerStore {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    fn export_args(hostname: &str) -> Vec<String> {
        vec![format!("--hostname={hostname}"), "--export".to_string()]
    }
}

impl DeviceStore for LavaServerStore {
    fn export(&self, hostname: &str) -> Result<Vec<u8>> {
        let output = self.runner.run(&Self::export_args(hostname), None)?;

        if !output.status.success() {
            let stderr = output.stderr_text();
            let detail = if stderr.is_empty() {
                format!("'{}' exited with {}", self.runner.display_name(), output.status)
            } else {
                format!(
                    "'{}' exited with {}: {stderr}",
                    self.runner.display_name(),
                    output.status
                )
            };
            return Err(DeviceConfError::DeviceConfigUnavailable {
                device: hostname.to_string(),
                detail,
            });
        }

        tracing::debug!(
            device = hostname,
            bytes = output.stdout.len(),
            "exported stored device config"
        );
        Ok(output.stdout)
    }
}
