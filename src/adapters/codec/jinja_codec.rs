use crate::core::errors::{DeviceConfError, Result};
use crate::core::models::device_dictionary::{DeviceDictionary, EXTENDS_KEY};
use crate::core::traits::dictionary_codec::DictionaryCodec;

/// Converts device dictionaries to and from jinja2 `extends`/`set` text.
///
/// Decoding is a line scan, not a template parse:
/// - `{% ` and ` %}` markers are removed wherever they appear
/// - `extends ...` lines set the `extends` entry
/// - `set key = value` lines bind `key`
/// - blank and unrecognised lines are skipped
///
/// Quote characters are stripped from decoded values, so a value that
/// itself contains quotes does not survive a round trip.
pub struct JinjaDictionaryCodec;

impl JinjaDictionaryCodec {
    /// Strip all single and double quotes.
    fn unquote(raw: &str) -> String {
        raw.chars().filter(|c| *c != '\'' && *c != '"').collect()
    }

    fn decode_line(line: &str, dict: &mut DeviceDictionary) {
        if line.starts_with(EXTENDS_KEY) {
            let base = line.replace("extends ", "");
            dict.set_extends(Self::unquote(&base));
        } else if let Some(binding) = line.strip_prefix("set ") {
            let Some((key, value)) = binding.split_once(" = ") else {
                tracing::warn!(line, "ignoring set directive without ' = '");
                return;
            };
            dict.insert(key, Self::unquote(value));
        }
    }
}

impl DictionaryCodec for JinjaDictionaryCodec {
    fn encode(&self, dict: &DeviceDictionary, extends: &str) -> Result<String> {
        if extends.trim().is_empty() {
            return Err(DeviceConfError::EncodeFailed {
                detail: "the device-type template to extend is empty".into(),
            });
        }

        let mut output = format!("{{% extends '{extends}' %}}\n");
        for (key, value) in dict.overrides() {
            output.push_str(&format!("{{% set {key} = '{value}' %}}\n"));
        }
        Ok(output)
    }

    fn decode(&self, text: &str) -> Result<DeviceDictionary> {
        let stripped = text.replace("{% ", "").replace(" %}", "");
        let mut dict = DeviceDictionary::new();

        for line in stripped.lines().filter(|l| !l.is_empty()) {
            Self::decode_line(line, &mut dict);
        }

        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qemu_dict() -> DeviceDictionary {
        [
            ("extends", "qemu.jinja2"),
            ("mac_addr", "52:54:00:12:34:59"),
            ("memory", "1024"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn encode_emits_extends_then_sorted_sets() {
        let codec = JinjaDictionaryCodec;
        let text = codec.encode(&qemu_dict(), "qemu.jinja2").unwrap();

        assert_eq!(
            text,
            "{% extends 'qemu.jinja2' %}\n\
             {% set mac_addr = '52:54:00:12:34:59' %}\n\
             {% set memory = '1024' %}\n"
        );
    }

    #[test]
    fn encode_uses_explicit_extends_over_dictionary_entry() {
        let codec = JinjaDictionaryCodec;
        let text = codec.encode(&qemu_dict(), "qemu-aarch64.jinja2").unwrap();

        assert!(text.starts_with("{% extends 'qemu-aarch64.jinja2' %}\n"));
        assert!(!text.contains("set extends"));
    }

    #[test]
    fn encode_without_extends_fails() {
        let codec = JinjaDictionaryCodec;
        assert!(codec.encode(&qemu_dict(), "").is_err());
        assert!(codec.encode(&qemu_dict(), "  ").is_err());
    }

    #[test]
    fn decode_reads_extends_and_sets() {
        let codec = JinjaDictionaryCodec;
        let text = "{% extends 'qemu.jinja2' %}\n{% set memory = '512' %}\n";
        let dict = codec.decode(text).unwrap();

        assert_eq!(dict.extends(), Some("qemu.jinja2"));
        assert_eq!(dict.get("memory"), Some("512"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn decode_normalizes_double_quotes() {
        let codec = JinjaDictionaryCodec;
        let text = "{% extends \"bbb.jinja2\" %}\n{% set connection_command = \"telnet dispatcher 7000\" %}";
        let dict = codec.decode(text).unwrap();

        assert_eq!(dict.extends(), Some("bbb.jinja2"));
        assert_eq!(dict.get("connection_command"), Some("telnet dispatcher 7000"));
    }

    #[test]
    fn decode_splits_on_first_equals() {
        let codec = JinjaDictionaryCodec;
        let dict = codec
            .decode("{% set kernel_args = 'console=ttyS0 = x' %}")
            .unwrap();

        assert_eq!(dict.get("kernel_args"), Some("console=ttyS0 = x"));
    }

    #[test]
    fn decode_repeated_key_keeps_last_value() {
        let codec = JinjaDictionaryCodec;
        let text = "{% set memory = '512' %}\n{% set memory = '2048' %}\n";
        let dict = codec.decode(text).unwrap();

        assert_eq!(dict.get("memory"), Some("2048"));
    }

    // Tolerance policy: anything that is not an extends or set directive is
    // skipped rather than rejected.
    #[test]
    fn decode_ignores_unknown_directives() {
        let codec = JinjaDictionaryCodec;
        let text = "{% extends 'qemu.jinja2' %}\n\
                    {% block body %}\n\
                    {# a comment #}\n\
                    random text\n\
                    {% set memory = '512' %}\n\
                    {% endblock %}\n";
        let dict = codec.decode(text).unwrap();

        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("memory"), Some("512"));
    }

    #[test]
    fn decode_skips_set_without_assignment() {
        let codec = JinjaDictionaryCodec;
        let dict = codec.decode("{% set memory %}").unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn decode_empty_text_is_empty_dictionary() {
        let codec = JinjaDictionaryCodec;
        assert!(codec.decode("").unwrap().is_empty());
        assert!(codec.decode("\n\n").unwrap().is_empty());
    }

    #[test]
    fn round_trip_is_identity_without_quotes() {
        let codec = JinjaDictionaryCodec;
        let dict = qemu_dict();
        let extends = dict.extends().unwrap().to_string();

        let text = codec.encode(&dict, &extends).unwrap();
        assert_eq!(codec.decode(&text).unwrap(), dict);
    }

    #[test]
    fn round_trip_drops_quotes_inside_values() {
        let codec = JinjaDictionaryCodec;
        let mut dict = DeviceDictionary::new();
        dict.set_extends("x86.jinja2");
        dict.insert("prompt", "it's");

        let text = codec.encode(&dict, "x86.jinja2").unwrap();
        assert_eq!(codec.decode(&text).unwrap().get("prompt"), Some("its"));
    }

    #[test]
    fn classified_first_line_decodes_to_same_extends() {
        use crate::core::models::source_kind::SourceKind;

        let codec = JinjaDictionaryCodec;
        let lines = [
            "{% extends 'qemu.jinja2' %}",
            "{% extends \"beaglebone-black.jinja2\" %}",
            "{%- extends 'qemu.jinja2' -%}",
            "{%  extends 'qemu.jinja2'  %}",
            "  {% extends 'qemu.jinja2' %}",
            "{% extends 'qemu.jinja2' %}{% set memory = '512' %}",
        ];

        for line in lines {
            let decoded = codec.decode(&format!("{line}\n")).unwrap();
            match SourceKind::classify(line) {
                SourceKind::Template { extends } => {
                    assert_eq!(decoded.extends(), Some(extends.as_str()), "{line}")
                }
                SourceKind::RawConfig => {}
            }
        }
        assert!(SourceKind::classify(lines[0]).is_template());
        assert!(SourceKind::classify(lines[1]).is_template());
        assert!(!SourceKind::classify(lines[2]).is_template());
    }

    #[test]
    fn crlf_lines_decode_cleanly() {
        let dict = JinjaDictionaryCodec
            .decode("{% extends 'qemu.jinja2' %}\r\n{% set memory = '512' %}\r\n")
            .unwrap();
        assert_eq!(dict.extends(), Some("qemu.jinja2"));
        assert_eq!(dict.get("memory"), Some("512"));
    }
}
