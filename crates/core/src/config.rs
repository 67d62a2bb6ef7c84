//! Configuration management
//!
//! Loads optional defaults from a TOML file. The file lives at
//! `$OBJMOVE_CONFIG_DIR/config.toml` when that variable is set, otherwise at
//! `<config dir>/objmove/config.toml`. Command-line flags always win.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "OBJMOVE_CONFIG_DIR";

const DEFAULT_COLOR: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,
}

/// Defaults applied when the matching flag is not given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Region used when `--region` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Suppress non-error output
    #[serde(default)]
    pub quiet: bool,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            region: None,
            color: default_color(),
            quiet: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
        }
    }
}

/// Locates and loads the configuration file
#[derive(Debug)]
pub struct ConfigManager {
    /// `None` when no configuration directory can be determined
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Self {
        Self {
            config_path: locate(std::env::var_os(CONFIG_DIR_ENV), dirs::config_dir()),
        }
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
        }
    }

    /// Get the configuration file path, if there is one
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the default configuration.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.config_path.as_deref() else {
            tracing::debug!("no configuration directory, using defaults");
            return Ok(Config::default());
        };
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade objmove.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// `$OBJMOVE_CONFIG_DIR/config.toml`, else `<config dir>/objmove/config.toml`
fn locate(override_dir: Option<OsString>, config_dir: Option<PathBuf>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => config_dir?.join("objmove"),
    };
    Some(dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = ConfigManager::with_path(config_path);
        (manager, temp_dir)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.defaults.color, "auto");
        assert!(config.defaults.region.is_none());
        assert!(!config.defaults.quiet);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_load_defaults_section() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            manager.config_path().unwrap(),
            r#"
            schema_version = 1

            [defaults]
            region = "eu-west-1"
            color = "never"
            "#,
        )
        .unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.defaults.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.defaults.color, "never");
        assert!(!config.defaults.quiet);
    }

    #[test]
    fn test_schema_version_too_new() {
        let (manager, _temp_dir) = temp_config_manager();

        let content = format!(
            r#"
            schema_version = {}
            "#,
            SCHEMA_VERSION + 1
        );
        std::fs::write(manager.config_path().unwrap(), content).unwrap();

        let result = manager.load();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("newer than supported")
        );
    }

    #[test]
    fn test_malformed_file_is_error() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(manager.config_path().unwrap(), "schema_version = \"one\"").unwrap();
        assert!(matches!(manager.load(), Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_locate_prefers_override() {
        assert_eq!(
            locate(Some("/etc/objmove".into()), Some(PathBuf::from("/home/u/.config"))),
            Some(PathBuf::from("/etc/objmove/config.toml"))
        );
        assert_eq!(
            locate(Some(OsString::new()), Some(PathBuf::from("/home/u/.config"))),
            Some(PathBuf::from("/home/u/.config/objmove/config.toml"))
        );
    }

    #[test]
    fn test_no_config_dir_falls_back_to_defaults() {
        let manager = ConfigManager {
            config_path: locate(None, None),
        };
        assert!(manager.config_path().is_none());

        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert!(config.defaults.region.is_none());
        assert!(!config.defaults.quiet);
    }
}
