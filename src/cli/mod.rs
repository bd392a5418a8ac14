pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::compare::CompareArgs;

/// Render, convert and compare LAVA device configurations.
#[derive(Parser, Debug)]
#[command(name = "device-conf", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to alternative config file
    #[arg(long, global = true, env = "DEVICE_CONF_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare device config YAML files
    Compare(CompareArgs),

    /// Print the resolved configuration of a device dictionary or config file
    Render {
        /// Device dictionary template or device config YAML
        path: PathBuf,
        /// Where to find the device_type templates
        #[arg(long)]
        dispatcher_config_dir: Option<PathBuf>,
    },

    /// Print the key/value pairs of a device dictionary template
    Dictionary {
        /// Device dictionary template
        path: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = DictFormat::Yaml)]
        format: DictFormat,
    },

    /// Convert a YAML key/value device dictionary into template form
    Template {
        /// YAML mapping of dictionary keys to values
        path: PathBuf,
        /// Device-type template to extend (overrides the 'extends' key)
        #[arg(long)]
        extends: Option<String>,
    },
}

/// Serialization used by the `dictionary` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DictFormat {
    Yaml,
    Json,
}

/// Install the stderr tracing subscriber.
///
/// A set RUST_LOG replaces the level entirely; otherwise --verbose selects
/// DEBUG and the default shows only warnings.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), level);
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Build the event filter from RUST_LOG directives, falling back to `level`.
fn log_filter(rust_log: Option<&str>, level: Level) -> EnvFilter {
    match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::default().add_directive(level.into()),
    }
}
