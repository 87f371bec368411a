//! Runtime configuration.
//!
//! Values come from, in increasing precedence:
//! 1. built-in defaults
//! 2. a TOML file (`--config <path>`, else `$XDG_CONFIG_HOME/oledbonnet/config.toml` if present)
//! 3. environment variables (`OLEDBONNET_I2C_BUS`, `OLEDBONNET_GPIO_CHIP`)
//!
//! ```toml
//! i2c_bus = "/dev/i2c-1"
//! gpio_chip = "/dev/gpiochip0"
//! display_address = 0x3C
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Default I2C bus device.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Default GPIO character device carrying the button lines.
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

/// Default SSD1306 I2C address.
pub const DEFAULT_DISPLAY_ADDRESS: u8 = 0x3C;

/// Environment variable overriding `i2c_bus`.
pub const I2C_BUS_ENV: &str = "OLEDBONNET_I2C_BUS";

/// Environment variable overriding `gpio_chip`.
pub const GPIO_CHIP_ENV: &str = "OLEDBONNET_GPIO_CHIP";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {error}")]
    Read { path: PathBuf, error: String },

    /// Config file is not valid TOML or has unknown keys
    #[error("Failed to parse config {path}: {error}")]
    Parse { path: PathBuf, error: String },

    /// A value is out of range
    #[error("Invalid {field}: {value} (expected {expected})")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Device locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BonnetConfig {
    /// I2C bus the display is attached to
    pub i2c_bus: PathBuf,

    /// GPIO chip whose line offsets are the BCM numbers of the buttons
    pub gpio_chip: PathBuf,

    /// 7-bit I2C address of the display
    pub display_address: u8,
}

impl Default for BonnetConfig {
    fn default() -> Self {
        Self {
            i2c_bus: PathBuf::from(DEFAULT_I2C_BUS),
            gpio_chip: PathBuf::from(DEFAULT_GPIO_CHIP),
            display_address: DEFAULT_DISPLAY_ADDRESS,
        }
    }
}

impl BonnetConfig {
    /// Returns the per-user config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("oledbonnet").join("config.toml"))
    }

    /// Loads the configuration from every source.
    ///
    /// An explicit `path` must exist; the per-user file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default_path) => Self::from_file(&default_path)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Applies overrides found through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bus) = lookup(I2C_BUS_ENV) {
            self.i2c_bus = PathBuf::from(bus);
        }
        if let Some(chip) = lookup(GPIO_CHIP_ENV) {
            self.gpio_chip = PathBuf::from(chip);
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_address > 0x7F {
            return Err(ConfigError::InvalidValue {
                field: "display_address",
                value: format!("{:#04x}", self.display_address),
                expected: "a 7-bit I2C address",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BonnetConfig::default();
        assert_eq!(config.i2c_bus, PathBuf::from("/dev/i2c-1"));
        assert_eq!(config.gpio_chip, PathBuf::from("/dev/gpiochip0"));
        assert_eq!(config.display_address, 0x3C);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gpio_chip = \"/dev/gpiochip4\"").unwrap();

        let config = BonnetConfig::from_file(file.path()).unwrap();
        assert_eq!(config.gpio_chip, PathBuf::from("/dev/gpiochip4"));
        assert_eq!(config.i2c_bus, PathBuf::from(DEFAULT_I2C_BUS));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "edge_timeout_ms = 250").unwrap();

        let result = BonnetConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = BonnetConfig::load(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = BonnetConfig::default();
        config.apply_env_overrides(lookup_from(&[
            (I2C_BUS_ENV, "/dev/i2c-3"),
            (GPIO_CHIP_ENV, "/dev/gpiochip4"),
        ]));
        assert_eq!(config.i2c_bus, PathBuf::from("/dev/i2c-3"));
        assert_eq!(config.gpio_chip, PathBuf::from("/dev/gpiochip4"));
    }

    #[test]
    fn test_validate_address_range() {
        let wide_address = BonnetConfig {
            display_address: 0x80,
            ..BonnetConfig::default()
        };
        let error = wide_address.validate().unwrap_err();
        assert!(error.to_string().contains("0x80"));
    }
}
