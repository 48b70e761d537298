//! Configuration management for simon-smart
//!
//! Settings controlling how drives are addressed and which drives the
//! command-line front end scans, persisted as TOML.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// simon-smart configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Device addressing options
    #[serde(default)]
    pub device: DeviceConfig,
    /// Drive scan options
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Device addressing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Path of a drive, `{index}` and `{letter}` are substituted
    #[serde(default = "default_path_template")]
    pub path_template: String,
    /// Send SMART ENABLE OPERATIONS right after opening a drive
    #[serde(default)]
    pub enable_on_open: bool,
}

/// Drive scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of drive indices probed when no drive is given
    #[serde(default = "default_max_drives")]
    pub max_drives: u8,
}

// Default value functions
fn default_path_template() -> String {
    if cfg!(windows) {
        "\\\\.\\PhysicalDrive{index}".to_string()
    } else {
        "/dev/sd{letter}".to_string()
    }
}

fn default_max_drives() -> u8 {
    16
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path_template: default_path_template(),
            enable_on_open: false,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_drives: default_max_drives(),
        }
    }
}

impl Config {
    /// Get the default configuration directory
    ///
    /// Returns `~/.config/simon-smart` on Unix-like systems,
    /// or `%APPDATA%\simon-smart` on Windows.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(windows) {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from(".config"))
        };

        Ok(config_dir.join("simon-smart"))
    }

    /// Load configuration from the default path, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_file = Self::default_path()?.join("config.toml");

        if !config_file.exists() {
            log::debug!("No config at {}, using defaults", config_file.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::default_path()?;
        std::fs::create_dir_all(&config_dir)?;
        self.save_to(&config_dir.join("config.toml"))
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let template = &self.device.path_template;
        if !template.contains("{index}") && !template.contains("{letter}") {
            return Err(Error::Config(format!(
                "path_template '{}' has no {{index}} or {{letter}} placeholder",
                template
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.max_drives, 16);
        assert!(!config.device.enable_on_open);
        if cfg!(windows) {
            assert_eq!(config.device.path_template, "\\\\.\\PhysicalDrive{index}");
        } else {
            assert_eq!(config.device.path_template, "/dev/sd{letter}");
        }
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized = Config::from_toml(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml("[scan]\nmax_drives = 4\n").unwrap();
        assert_eq!(config.scan.max_drives, 4);
        assert_eq!(config.device, DeviceConfig::default());

        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let err = Config::from_toml("[device]\npath_template = \"/dev/sda\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_toml("[scan]\nmax_drives = \"many\"\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "simon-smart-config-{}.toml",
            std::process::id()
        ));
        let mut config = Config::default();
        config.device.enable_on_open = true;
        config.scan.max_drives = 2;

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
