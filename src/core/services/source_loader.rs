use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

use crate::core::errors::{DeviceConfError, Result};
use crate::core::models::resolved_config::ResolvedConfig;
use crate::core::models::source_kind::SourceKind;
use crate::core::services::template_resolver::TemplateResolver;
use crate::core::traits::device_store::DeviceStore;
use crate::core::traits::dictionary_codec::DictionaryCodec;

/// A device configuration exported from the server into a temporary file.
///
/// The file is deleted when this value is dropped, so callers keep it alive
/// for as long as `label` is shown to the user.
pub struct StoredSource {
    pub file: TempPath,
    pub label: String,
    pub config: ResolvedConfig,
}

/// Turns input files into resolved configurations.
pub struct SourceLoader<'a> {
    codec: &'a dyn DictionaryCodec,
    resolver: TemplateResolver<'a>,
}

impl<'a> SourceLoader<'a> {
    pub fn new(codec: &'a dyn DictionaryCodec, resolver: TemplateResolver<'a>) -> Self {
        Self { codec, resolver }
    }

    /// Load `path` as either a device dictionary template or a raw config.
    ///
    /// The first line decides: an extends directive marks a template, which
    /// is rendered against its device-type template; anything else must be
    /// a valid YAML document and is returned line by line.
    pub fn load(&self, path: &Path) -> Result<ResolvedConfig> {
        if !path.exists() {
            return Err(DeviceConfError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let first_line = content.lines().next().unwrap_or_default();
        let kind = SourceKind::classify(first_line);
        tracing::debug!(path = %path.display(), ?kind, "classified source");

        match kind {
            SourceKind::Template { extends } => self.load_template(path, &content, &extends),
            SourceKind::RawConfig => Self::load_raw(path, &content),
        }
    }

    /// Export `hostname` from `store` and load it as a raw config.
    ///
    /// The export is written to a temporary file in `working_dir`; the
    /// returned `StoredSource` owns that file.
    pub fn load_from_store(
        &self,
        store: &dyn DeviceStore,
        hostname: &str,
        working_dir: &Path,
    ) -> Result<StoredSource> {
        let exported = store.export(hostname)?;

        let mut file = tempfile::Builder::new()
            .prefix("device-conf-")
            .suffix(".yaml")
            .tempfile_in(working_dir)?;
        file.write_all(&exported)?;
        file.flush()?;

        let file = file.into_temp_path();
        let content = std::fs::read_to_string(&file)?;
        let config = Self::load_raw(&file, &content)?;
        let label = file.display().to_string();
        tracing::debug!(device = hostname, path = %label, "loaded stored device config");

        Ok(StoredSource {
            file,
            label,
            config,
        })
    }

    fn load_template(&self, path: &Path, content: &str, extends: &str) -> Result<ResolvedConfig> {
        let dict = self.codec.decode(content)?;
        let extends = dict.extends().unwrap_or(extends);
        let template = self.codec.encode(&dict, extends)?;
        tracing::debug!(
            path = %path.display(),
            templates = %self.resolver.template_dir().display(),
            "rendering device dictionary"
        );
        self.resolver.render(&template, &path.display().to_string())
    }

    fn load_raw(path: &Path, content: &str) -> Result<ResolvedConfig> {
        if !content.trim().is_empty() {
            serde_yaml::from_str::<serde_yaml::Value>(content).map_err(|e| {
                DeviceConfError::MalformedConfig {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                }
            })?;
        }
        let config = ResolvedConfig::from_file_content(content);
        if config.is_empty() {
            tracing::debug!(path = %path.display(), "config file is empty");
        }
        Ok(config)
    }
}
