use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

use minijinja::{Environment, ErrorKind, UndefinedBehavior};

use crate::core::errors::{DeviceConfError, Result};
use crate::core::models::resolved_config::ResolvedConfig;
use crate::core::models::source_kind::extends_target;
use crate::core::traits::dictionary_codec::DictionaryCodec;

/// Subdirectory of the dispatcher config dir holding device-type templates.
pub const DEVICE_TYPES_DIR: &str = "device-types";

/// A device-type template read from disk.
#[derive(Debug, Clone)]
struct LoadedTemplate {
    name: String,
    content: String,
}

/// Renders device dictionaries against their device-type templates.
///
/// The dictionary's `set` bindings become template variables; the named
/// device-type template, and every template it extends in turn, is loaded
/// from `<dispatcher-config-dir>/device-types`. Rendering follows the
/// server's Jinja2 setup: block tags swallow the newline after them and
/// undefined variables render empty.
pub struct TemplateResolver<'a> {
    template_dir: PathBuf,
    codec: &'a dyn DictionaryCodec,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(dispatcher_config_dir: &Path, codec: &'a dyn DictionaryCodec) -> Self {
        Self {
            template_dir: dispatcher_config_dir.join(DEVICE_TYPES_DIR),
            codec,
        }
    }

    /// Directory device-type templates are loaded from.
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Render a device dictionary template into resolved config lines.
    ///
    /// `source_name` identifies the dictionary itself; no device-type
    /// template may extend it.
    ///
    /// # Errors
    ///
    /// - `MissingExtends` if the template names no device-type template.
    /// - `TemplateNotFound` if a template in the chain is not on disk.
    /// - `CircularExtends` if the chain loops.
    /// - `TemplateSyntax` / `RenderFailed` from the template engine.
    pub fn render(&self, template_text: &str, source_name: &str) -> Result<ResolvedConfig> {
        let dict = self.codec.decode(template_text)?;
        let extends = dict
            .extends()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DeviceConfError::MissingExtends {
                source_name: source_name.to_string(),
            })?;

        let chain = self.load_chain(extends, source_name)?;

        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        // Includes and imports resolve against the same directory.
        let template_dir = self.template_dir.clone();
        env.set_loader(move |name| {
            read_template(&template_dir, name).map_err(|e| {
                minijinja::Error::new(ErrorKind::InvalidOperation, "could not read template")
                    .with_source(e)
            })
        });

        for template in &chain {
            env.add_template(&template.name, &template.content)
                .map_err(|e| engine_error(&template.name, &e))?;
        }

        let context: BTreeMap<&str, &str> = dict.overrides().collect();
        let rendered = env
            .get_template(extends)
            .and_then(|template| template.render(&context))
            .map_err(|e| engine_error(extends, &e))?;

        let resolved = ResolvedConfig::from_rendered(&rendered);
        tracing::debug!(
            source = source_name,
            template = extends,
            lines = resolved.len(),
            "rendered device dictionary"
        );
        Ok(resolved)
    }

    /// Load `extends` and its ancestors, leaf first.
    fn load_chain(&self, extends: &str, source_name: &str) -> Result<Vec<LoadedTemplate>> {
        let mut chain = Vec::new();
        let mut trail = vec![source_name.to_string()];
        let mut visited: HashSet<String> = HashSet::from([source_name.to_string()]);
        let mut current = extends.to_string();

        loop {
            if visited.contains(&current) {
                trail.push(current);
                return Err(DeviceConfError::CircularExtends {
                    chain: trail.join(" -> "),
                });
            }

            let content = read_template(&self.template_dir, &current)?.ok_or_else(|| {
                DeviceConfError::TemplateNotFound {
                    name: current.clone(),
                    dir: self.template_dir.clone(),
                }
            })?;
            let parent = extends_target(&content);
            tracing::debug!(template = %current, parent = ?parent, "loaded device-type template");

            visited.insert(current.clone());
            trail.push(current.clone());
            chain.push(LoadedTemplate {
                name: current,
                content,
            });

            match parent {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(chain)
    }
}

/// Map an engine error raised while handling `template`.
fn engine_error(template: &str, err: &minijinja::Error) -> DeviceConfError {
    let detail = describe_engine_error(err);
    match err.kind() {
        ErrorKind::SyntaxError => DeviceConfError::TemplateSyntax {
            template: template.to_string(),
            detail,
        },
        _ => DeviceConfError::RenderFailed {
            template: template.to_string(),
            detail,
        },
    }
}

/// Read template `name` from `dir`.
///
/// Names that escape `dir` or do not name a file are reported as missing.
fn read_template(dir: &Path, name: &str) -> std::io::Result<Option<String>> {
    let relative = Path::new(name);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if name.is_empty() || !contained {
        return Ok(None);
    }

    let path = dir.join(relative);
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(path).map(Some)
}

/// Flatten an engine error and its causes into one line.
///
/// A cause whose text is already part of the message so far is skipped.
fn describe_engine_error(err: &minijinja::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
