use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::errors::{DeviceConfError, Result};

/// Where device-type templates live on a LAVA server.
pub const DEFAULT_DISPATCHER_CONFIG_DIR: &str = "/etc/lava-server/dispatcher-config/";

/// Name of the config file inside the user config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level device-conf configuration, read from a TOML file.
///
/// Every section and key is optional; anything missing falls back to the
/// defaults a stock LAVA server install uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub compare: CompareSection,
    pub tools: ToolsSection,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, the user config file
    /// (`<config dir>/device-conf/config.toml`) is read when present,
    /// otherwise the built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => {
                return Err(DeviceConfError::InvalidConfig {
                    detail: format!("config file {} not found", p.display()),
                });
            }
            Some(p) => p.to_path_buf(),
            None => match user_config_path().filter(|p| p.exists()) {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        tracing::debug!(path = %config_path.display(), "loading config");
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content).map_err(|e| match e {
            DeviceConfError::InvalidConfig { detail } => DeviceConfError::InvalidConfig {
                detail: format!("{}: {detail}", config_path.display()),
            },
            other => other,
        })
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| DeviceConfError::InvalidConfig {
            detail: format!("failed to parse config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tools.device_dictionary.is_empty() {
            return Err(DeviceConfError::InvalidConfig {
                detail: "tools.device_dictionary must name a command".into(),
            });
        }
        if self.tools.wdiff.is_empty() {
            return Err(DeviceConfError::InvalidConfig {
                detail: "tools.wdiff must name a command".into(),
            });
        }
        if self.tools.timeout_secs == 0 {
            return Err(DeviceConfError::InvalidConfig {
                detail: "tools.timeout_secs must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Dispatcher config dir: the CLI flag wins over the config file.
    pub fn dispatcher_config_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .unwrap_or_else(|| self.compare.dispatcher_config_dir.clone())
    }

    /// Directory for temporary files, defaulting to the system temp dir.
    pub fn temp_dir(&self) -> PathBuf {
        self.compare
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// `<config dir>/device-conf/config.toml`, if the platform has a config dir.
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("device-conf").join(CONFIG_FILE_NAME))
}

/// The `[compare]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareSection {
    pub dispatcher_config_dir: PathBuf,
    /// Where exported device configs are written (optional).
    pub temp_dir: Option<PathBuf>,
}

impl Default for CompareSection {
    fn default() -> Self {
        Self {
            dispatcher_config_dir: PathBuf::from(DEFAULT_DISPATCHER_CONFIG_DIR),
            temp_dir: None,
        }
    }
}

/// The `[tools]` section: external commands and their timeout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    /// Export command; `--hostname=<device> --export` is appended.
    pub device_dictionary: Vec<String>,
    pub wdiff: Vec<String>,
    pub timeout_secs: u64,
}

impl ToolsSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            device_dictionary: ["lava-server", "manage", "device-dictionary"]
                .map(String::from)
                .to_vec(),
            wdiff: ["wdiff", "-d"].map(String::from).to_vec(),
            timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();

        assert_eq!(
            config.compare.dispatcher_config_dir,
            PathBuf::from(DEFAULT_DISPATCHER_CONFIG_DIR)
        );
        assert_eq!(
            config.tools.device_dictionary,
            vec!["lava-server", "manage", "device-dictionary"]
        );
        assert_eq!(config.tools.wdiff, vec!["wdiff", "-d"]);
        assert_eq!(config.tools.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn sections_override_defaults() {
        let config = AppConfig::parse(
            r#"
[compare]
dispatcher_config_dir = "/srv/lava/dispatcher-config"
temp_dir = "/var/tmp"

[tools]
device_dictionary = ["ssh", "lava", "lava-server", "manage", "device-dictionary"]
timeout_secs = 5
"#,
        )
        .unwrap();

        assert_eq!(
            config.dispatcher_config_dir(None),
            PathBuf::from("/srv/lava/dispatcher-config")
        );
        assert_eq!(config.temp_dir(), PathBuf::from("/var/tmp"));
        assert_eq!(config.tools.device_dictionary[0], "ssh");
        assert_eq!(config.tools.wdiff, vec!["wdiff", "-d"]);
        assert_eq!(config.tools.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn flag_beats_config_file() {
        let config = AppConfig::parse("[compare]\ndispatcher_config_dir = \"/a\"\n").unwrap();
        assert_eq!(
            config.dispatcher_config_dir(Some(Path::new("/b"))),
            PathBuf::from("/b")
        );
    }

    #[test]
    fn empty_command_is_invalid() {
        let err = AppConfig::parse("[tools]\nwdiff = []\n").unwrap_err();
        assert!(err.to_string().contains("tools.wdiff"));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        assert!(AppConfig::parse("[tools]\ntimeout_secs = 0\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::parse("[compare]\ndispatcher_dir = \"/x\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device-conf.toml");
        std::fs::write(&path, "[tools]\nwdiff = [\"cat\"]\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.tools.wdiff, vec!["cat"]);
    }
}
