use std::io::Write;
use std::path::Path;

use crate::adapters::codec::jinja_codec::JinjaDictionaryCodec;
use crate::cli::DictFormat;
use crate::core::errors::{DeviceConfError, Result};
use crate::core::models::source_kind::SourceKind;
use crate::core::traits::dictionary_codec::DictionaryCodec;

/// Decode the device dictionary template at `path` and print its bindings.
pub fn execute(path: &Path, format: DictFormat, out: &mut dyn Write) -> Result<()> {
    if !path.exists() {
        return Err(DeviceConfError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let first_line = content.lines().next().unwrap_or_default();
    if !SourceKind::classify(first_line).is_template() {
        return Err(DeviceConfError::InvalidArguments {
            detail: format!(
                "'{}' is not a device dictionary\n\n  \
                 Its first line must be an extends directive, e.g. {{% extends 'qemu.jinja2' %}}",
                path.display()
            ),
        });
    }

    let dict = JinjaDictionaryCodec.decode(&content)?;
    tracing::debug!(path = %path.display(), keys = dict.len(), "decoded device dictionary");

    match format {
        DictFormat::Yaml => {
            let text = serde_yaml::to_string(&dict).map_err(|e| DeviceConfError::EncodeFailed {
                detail: e.to_string(),
            })?;
            write!(out, "{text}")?;
        }
        DictFormat::Json => {
            let text =
                serde_json::to_string_pretty(&dict).map_err(|e| DeviceConfError::EncodeFailed {
                    detail: e.to_string(),
                })?;
            writeln!(out, "{text}")?;
        }
    }
    Ok(())
}
