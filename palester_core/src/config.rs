//! Configuration file support for Palester.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/palester/config.toml`.

use crate::calendar::TodayStyle;
use crate::proximity::DEFAULT_GYM_RADIUS_M;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "palester.db";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub gym: GymConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Geofence configuration for workout logging
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GymConfig {
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,
}

impl Default for GymConfig {
    fn default() -> Self {
        Self {
            radius_m: default_radius_m(),
        }
    }
}

/// Calendar display configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CalendarConfig {
    #[serde(default)]
    pub today_style: TodayStyle,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("palester")
}

fn default_radius_m() -> f64 {
    DEFAULT_GYM_RADIUS_M
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values that make no sense at runtime
    pub fn validate(&self) -> Result<()> {
        if !self.gym.radius_m.is_finite() || self.gym.radius_m <= 0.0 {
            return Err(Error::Config(format!(
                "gym.radius_m must be a positive number, got {}",
                self.gym.radius_m
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("palester").join("config.toml")
    }

    /// Path of the database file under the configured data directory
    pub fn database_path(&self) -> PathBuf {
        self.data.data_dir.join(DATABASE_FILE)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gym.radius_m, 50.0);
        assert_eq!(config.calendar.today_style, TodayStyle::Ring);
        assert!(config.database_path().ends_with("palester/palester.db"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[calendar]
today_style = "override"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.calendar.today_style, TodayStyle::Override);
        assert_eq!(config.gym.radius_m, 50.0); // default
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.gym.radius_m = 75.0;
        config.data.data_dir = temp_dir.path().join("data");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.gym.radius_m, 75.0);
        assert_eq!(loaded.data.data_dir, temp_dir.path().join("data"));
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[gym]\nradius_m = -3.0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
