use std::sync::LazyLock;

use regex::Regex;

/// Matches a device dictionary's extends directive such as
/// `{% extends 'qemu.jinja2' %}`, capturing the quoted template name.
///
/// The directive must fill the whole line in exactly the form the
/// dictionary decoder reads back; trim markers or extra spacing make the
/// line a raw config line.
pub static EXTENDS_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\{% extends ["']([^"']+)["'] %\}$"#)
        .expect("extends directive pattern is valid")
});

/// Extends directive inside a device-type template, trim markers allowed.
static TEMPLATE_EXTENDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%-?\s*extends\s+["']([^"']+)["']\s*-?%\}"#)
        .expect("template extends pattern is valid")
});

/// What an input file holds, decided from its first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A device dictionary in template form, extending the named template.
    Template { extends: String },
    /// A fully resolved configuration, compared as-is.
    RawConfig,
}

impl SourceKind {
    /// Classify a source by its first line.
    ///
    /// Only the first line is consulted: a file is a template source when
    /// that line carries an extends directive, otherwise it is a raw config.
    pub fn classify(first_line: &str) -> Self {
        match EXTENDS_DIRECTIVE
            .captures(first_line)
            .and_then(|caps| caps.get(1))
        {
            Some(m) => Self::Template {
                extends: m.as_str().to_string(),
            },
            None => Self::RawConfig,
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template { .. })
    }
}

/// Find the first extends directive in template `text` and return its target.
pub fn extends_target(text: &str) -> Option<String> {
    TEMPLATE_EXTENDS
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_quoted_extends_is_template() {
        assert_eq!(
            SourceKind::classify("{% extends 'qemu.yaml' %}"),
            SourceKind::Template {
                extends: "qemu.yaml".into()
            }
        );
    }

    #[test]
    fn double_quoted_extends_is_template() {
        let kind = SourceKind::classify(r#"{% extends "beaglebone-black.jinja2" %}"#);
        assert!(kind.is_template());
    }

    #[test]
    fn trim_markers_do_not_make_a_dictionary() {
        assert_eq!(
            SourceKind::classify("{%- extends 'base.jinja2' -%}"),
            SourceKind::RawConfig
        );
    }

    #[test]
    fn base_templates_may_use_trim_markers() {
        assert_eq!(
            extends_target("{%- extends 'base.jinja2' -%}").as_deref(),
            Some("base.jinja2")
        );
    }

    #[test]
    fn yaml_is_raw_config() {
        assert_eq!(SourceKind::classify("device_type: qemu"), SourceKind::RawConfig);
        assert_eq!(SourceKind::classify(""), SourceKind::RawConfig);
    }

    #[test]
    fn set_directive_alone_is_raw_config() {
        assert_eq!(
            SourceKind::classify("{% set memory = '512' %}"),
            SourceKind::RawConfig
        );
    }

    #[test]
    fn unquoted_name_is_not_an_extends_directive() {
        assert_eq!(
            SourceKind::classify("{% extends qemu.yaml %}"),
            SourceKind::RawConfig
        );
    }

    #[test]
    fn extends_target_finds_directive_past_first_line() {
        let text = "{# comment #}\n{% extends \"base.jinja2\" %}\n";
        assert_eq!(extends_target(text).as_deref(), Some("base.jinja2"));
    }
}
