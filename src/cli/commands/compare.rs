use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::adapters::codec::jinja_codec::JinjaDictionaryCodec;
use crate::adapters::process::command_runner::CommandRunner;
use crate::adapters::store::lava_server_store::LavaServerStore;
use crate::adapters::wdiff::wdiff_backend::WdiffBackend;
use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{DeviceConfError, Result};
use crate::core::services::diff_service::DiffService;
use crate::core::services::source_loader::SourceLoader;
use crate::core::services::template_resolver::TemplateResolver;

/// Outcome of a successful comparison, whether or not the files differ.
pub const SUCCESS: i32 = 0;
/// Outcome of any validation, load or tool failure.
pub const FAILURE: i32 = -1;

pub const IDENTICAL_MESSAGE: &str = "Success. The configuration files are identical.";

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// List of device config paths, at least one, max two
    #[arg(value_name = "CONFIGS")]
    pub configs: Vec<PathBuf>,

    /// Use wdiff for parsing output
    #[arg(short, long)]
    pub wdiff: bool,

    /// Use stored device config with specified device
    #[arg(short = 'u', long, value_name = "DEVICE")]
    pub use_stored: Option<String>,

    /// Where to find the device_type templates [default: /etc/lava-server/dispatcher-config/]
    #[arg(long, value_name = "DIR")]
    pub dispatcher_config_dir: Option<PathBuf>,
}

/// What the validated arguments ask to compare.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Sources<'a> {
    Files(&'a Path, &'a Path),
    Stored { path: &'a Path, device: &'a str },
}

/// Run the comparison, writing results to `out` and problems to `err`.
///
/// Returns [`SUCCESS`] or [`FAILURE`]; differences between the files are
/// reported through `out` only.
pub fn execute(
    args: &CompareArgs,
    config_path: Option<&Path>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32 {
    match run(args, config_path, out) {
        Ok(()) => SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "compare failed");
            output::error(err, &e.to_string());
            FAILURE
        }
    }
}

fn run(args: &CompareArgs, config_path: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let sources = validate(args)?;
    let config = AppConfig::load(config_path)?;

    let codec = JinjaDictionaryCodec;
    let dispatcher_dir = config.dispatcher_config_dir(args.dispatcher_config_dir.as_deref());
    let loader = SourceLoader::new(&codec, TemplateResolver::new(&dispatcher_dir, &codec));

    // The stored export lives in a temp file; keep it until output is written.
    let (left_label, left, right_label, right, _stored) = match sources {
        Sources::Files(a, b) => {
            let left = loader.load(a)?;
            let right = loader.load(b)?;
            (label(a), left, label(b), right, None)
        }
        Sources::Stored { path, device } => {
            let left = loader.load(path)?;
            let runner =
                CommandRunner::from_argv(&config.tools.device_dictionary, config.tools.timeout())?;
            let store = LavaServerStore::new(runner);

            let sp = output::spinner(&format!("Exporting device config for {device}..."));
            let stored = loader.load_from_store(&store, device, &config.temp_dir());
            output::finish_spinner(sp);
            let stored = stored?;
            tracing::debug!(path = %stored.file.display(), "exported device config");

            let right = stored.config.clone();
            let right_label = stored.label.clone();
            (label(path), left, right_label, right, Some(stored))
        }
    };

    let service = DiffService;
    let result = service.diff(&left, &left_label, &right, &right_label);
    tracing::debug!(
        left = %result.left_name,
        right = %result.right_name,
        changed = result.changed_lines(),
        "compared configurations"
    );

    if result.is_empty() {
        writeln!(out, "{IDENTICAL_MESSAGE}")?;
        return Ok(());
    }

    if args.wdiff {
        let runner = CommandRunner::from_argv(&config.tools.wdiff, config.tools.timeout())?;
        let differ = WdiffBackend::new(runner);
        let text = service.word_diff(&result, &differ)?;
        if !text.is_empty() {
            writeln!(out, "{text}")?;
        }
    } else {
        for line in &result.lines {
            writeln!(out, "{line}")?;
        }
    }

    Ok(())
}

/// Check argument counts, then that every named file exists.
fn validate(args: &CompareArgs) -> Result<Sources<'_>> {
    let sources = match (&args.use_stored, args.configs.as_slice()) {
        (None, [a, b]) => Sources::Files(a, b),
        (None, _) => {
            return Err(DeviceConfError::InvalidArguments {
                detail: "Please input two arguments with config file paths\n  \
                         You may use --use-stored with one config file path"
                    .into(),
            });
        }
        (Some(device), [path]) => Sources::Stored { path, device },
        (Some(_), _) => {
            return Err(DeviceConfError::InvalidArguments {
                detail: "Please input one argument with config file path\n  \
                         You may omit --use-stored and use two config file paths"
                    .into(),
            });
        }
    };

    let paths = match sources {
        Sources::Files(a, b) => vec![a, b],
        Sources::Stored { path, .. } => vec![path],
    };
    if let Some(missing) = paths.into_iter().find(|p| !p.exists()) {
        return Err(DeviceConfError::FileNotFound {
            path: missing.to_path_buf(),
        });
    }

    Ok(sources)
}

fn label(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(configs: &[&str], use_stored: Option<&str>) -> CompareArgs {
        CompareArgs {
            configs: configs.iter().map(PathBuf::from).collect(),
            wdiff: false,
            use_stored: use_stored.map(String::from),
            dispatcher_config_dir: None,
        }
    }

    #[test]
    fn one_path_without_use_stored_is_rejected() {
        let err = validate(&args(&["a.yaml"], None)).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Please input two arguments with config file paths")
        );
    }

    #[test]
    fn three_paths_are_rejected() {
        assert!(validate(&args(&["a", "b", "c"], None)).is_err());
    }

    #[test]
    fn use_stored_with_two_paths_is_rejected_before_touching_files() {
        // Neither file exists, so a FileNotFound here would mean I/O happened.
        let err = validate(&args(&["missing-a", "missing-b"], Some("qemu01"))).unwrap_err();
        assert!(matches!(err, DeviceConfError::InvalidArguments { .. }));
        assert!(
            err.to_string()
                .starts_with("Please input one argument with config file path")
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.yaml");
        std::fs::write(&present, "a: 1\n").unwrap();
        let present = present.display().to_string();

        let err = validate(&args(&[present.as_str(), "non.existing.yaml"], None)).unwrap_err();
        assert_eq!(err.to_string(), "File 'non.existing.yaml' does not exist");
    }

    #[test]
    fn stored_mode_checks_its_path() {
        let err = validate(&args(&["non.existing.yaml"], Some("qemu01"))).unwrap_err();
        assert!(matches!(err, DeviceConfError::FileNotFound { .. }));
    }

    #[test]
    fn identical_files_write_success_message() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yaml");
        let b = dir.path().join("b.yaml");
        std::fs::write(&a, "device_type: qemu\n").unwrap();
        std::fs::write(&b, "device_type: qemu\n").unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let a = a.display().to_string();
        let b = b.display().to_string();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute(
            &args(&[a.as_str(), b.as_str()], None),
            Some(&config_path),
            &mut out,
            &mut err,
        );

        assert_eq!(code, SUCCESS);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Success. The configuration files are identical.\n"
        );
        assert!(err.is_empty());
    }

    #[test]
    fn differing_files_write_unified_diff() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yaml");
        let b = dir.path().join("b.yaml");
        std::fs::write(&a, "a\nb\nc\n").unwrap();
        std::fs::write(&b, "a\nx\nc\n").unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let a = a.display().to_string();
        let b = b.display().to_string();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute(
            &args(&[a.as_str(), b.as_str()], None),
            Some(&config_path),
            &mut out,
            &mut err,
        );

        assert_eq!(code, SUCCESS);
        let expected = format!("--- {a}\n\n+++ {b}\n\n@@ -1,3 +1,3 @@\n\n a\n-b\n+x\n c\n");
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn failure_goes_to_err_writer() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = execute(&args(&["only-one"], None), None, &mut out, &mut err);

        assert_eq!(code, FAILURE);
        assert!(out.is_empty());
        assert!(
            String::from_utf8(err)
                .unwrap()
                .contains("Please input two arguments")
        );
    }
}
