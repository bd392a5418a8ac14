use std::path::PathBuf;
use std::time::Duration;

/// All domain errors for device-conf.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum DeviceConfError {
    #[error("{detail}")]
    InvalidArguments { detail: String },

    #[error("File {} does not exist", quoted(.path))]
    FileNotFound { path: PathBuf },

    #[error(
        "Please provide a valid YAML configuration file.\n\n  \
         {} could not be parsed: {detail}",
        quoted(.path)
    )]
    MalformedConfig { path: PathBuf, detail: String },

    #[error(
        "Cannot build a device template from {source_name}: no 'extends' value\n\n  \
         A device dictionary must name the device-type template it extends,\n  \
         e.g. {{% extends 'qemu.jinja2' %}}"
    )]
    MissingExtends { source_name: String },

    #[error("Cannot encode device dictionary: {detail}")]
    EncodeFailed { detail: String },

    #[error(
        "Device-type template '{name}' not found in {}\n\n  \
         Check --dispatcher-config-dir, or the 'extends' line of the device dictionary.",
        .dir.display()
    )]
    TemplateNotFound { name: String, dir: PathBuf },

    #[error(
        "Circular extends detected: {chain}\n\n  \
         A device-type template must not extend itself, one of its children,\n  \
         or the device dictionary being rendered."
    )]
    CircularExtends { chain: String },

    #[error("Template syntax error in '{template}': {detail}")]
    TemplateSyntax { template: String, detail: String },

    #[error("Failed to render '{template}': {detail}")]
    RenderFailed { template: String, detail: String },

    #[error(
        "Device config for '{device}' doesn't exist\n\n  \
         {detail}\n  \
         Check the hostname, and that the export command can reach the server."
    )]
    DeviceConfigUnavailable { device: String, detail: String },

    #[error("Could not run '{tool}': {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("'{tool}' did not finish within {timeout:?} and was killed")]
    ToolTimedOut { tool: String, timeout: Duration },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Render a path the way user-facing messages quote it: `'path'`.
fn quoted(path: &std::path::Path) -> String {
    format!("'{}'", path.display())
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DeviceConfError>;
