use std::io::Write;
use std::path::Path;

use serde_yaml::Value;

use crate::adapters::codec::jinja_codec::JinjaDictionaryCodec;
use crate::cli::output;
use crate::core::errors::{DeviceConfError, Result};
use crate::core::models::device_dictionary::DeviceDictionary;
use crate::core::traits::dictionary_codec::DictionaryCodec;

/// Convert a YAML key/value device dictionary into its template form.
///
/// `extends` replaces any `extends` key in the file; one of the two must
/// name the device-type template.
pub fn execute(
    path: &Path,
    extends: Option<&str>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    if !path.exists() {
        return Err(DeviceConfError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let document: Value =
        serde_yaml::from_str(&content).map_err(|e| DeviceConfError::MalformedConfig {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    let dict = to_dictionary(&document)?;

    let extends = extends
        .or(dict.extends())
        .ok_or_else(|| DeviceConfError::MissingExtends {
            source_name: path.display().to_string(),
        })?;

    if dict.is_empty() {
        output::warning(err, &format!("{} has no dictionary entries", path.display()));
    }

    // Quotes are stripped when a template is decoded again.
    let quoted: Vec<&str> = dict
        .overrides()
        .filter(|(_, v)| v.contains(['\'', '"']))
        .map(|(k, _)| k)
        .collect();
    if !quoted.is_empty() {
        output::warning(
            err,
            &format!(
                "Values of {} contain quotes, which are dropped when the template is read back",
                quoted.join(", ")
            ),
        );
    }

    let text = JinjaDictionaryCodec.encode(&dict, extends)?;
    write!(out, "{text}")?;
    Ok(())
}

/// Flatten a YAML mapping of scalars into a dictionary.
fn to_dictionary(document: &Value) -> Result<DeviceDictionary> {
    let mapping = document
        .as_mapping()
        .ok_or_else(|| DeviceConfError::EncodeFailed {
            detail: "expected a YAML mapping of dictionary keys to values".into(),
        })?;

    let mut dict = DeviceDictionary::new();
    for (key, value) in mapping {
        let key = key.as_str().ok_or_else(|| DeviceConfError::EncodeFailed {
            detail: format!("dictionary keys must be strings, found {key:?}"),
        })?;
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            _ => {
                return Err(DeviceConfError::EncodeFailed {
                    detail: format!("value of '{key}' is not a scalar"),
                });
            }
        };
        dict.insert(key, value);
    }
    Ok(dict)
}
