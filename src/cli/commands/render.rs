use std::io::Write;
use std::path::Path;

use crate::adapters::codec::jinja_codec::JinjaDictionaryCodec;
use crate::config::app_config::AppConfig;
use crate::core::errors::Result;
use crate::core::services::source_loader::SourceLoader;
use crate::core::services::template_resolver::TemplateResolver;

/// Print the resolved configuration of `path`, one line per resolved line.
pub fn execute(
    path: &Path,
    dispatcher_config_dir: Option<&Path>,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let codec = JinjaDictionaryCodec;
    let dispatcher_dir = config.dispatcher_config_dir(dispatcher_config_dir);
    let loader = SourceLoader::new(&codec, TemplateResolver::new(&dispatcher_dir, &codec));

    let resolved = loader.load(path)?;
    for line in &resolved.lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
