//! Configuration management for waitboard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Window, DEFAULT_BUCKET_HOURS, DEFAULT_WINDOW_HOURS, MAX_WINDOW_HOURS};
use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "waitboard";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "wait_times.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "WAITBOARD_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WAITBOARD_`, sections separated
///    by `__`, e.g. `WAITBOARD_REPORT__WINDOW_HOURS=12`)
/// 2. TOML config file at `~/.config/waitboard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Report configuration.
    pub report: ReportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/waitboard/wait_times.db`
    pub database_path: Option<PathBuf>,
}

/// Report-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Length of the trailing window in hours.
    pub window_hours: u32,
    /// Width of each chart bucket in hours.
    pub bucket_hours: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
            bucket_hours: DEFAULT_BUCKET_HOURS,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.report.window_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "window_hours must be greater than 0".to_string(),
            });
        }

        if self.report.window_hours > MAX_WINDOW_HOURS {
            return Err(Error::ConfigValidation {
                message: format!(
                    "window_hours ({}) cannot be greater than {MAX_WINDOW_HOURS}",
                    self.report.window_hours
                ),
            });
        }

        if self.report.bucket_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "bucket_hours must be greater than 0".to_string(),
            });
        }

        if self.report.bucket_hours > self.report.window_hours {
            return Err(Error::ConfigValidation {
                message: format!(
                    "bucket_hours ({}) cannot be greater than window_hours ({})",
                    self.report.bucket_hours, self.report.window_hours
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the configured reporting window.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configured hours are inconsistent.
    pub fn window(&self) -> Result<Window> {
        Window::new(self.report.window_hours, self.report.bucket_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.report.window_hours, 6);
        assert_eq!(config.report.bucket_hours, 1);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_window() {
        let mut config = Config::default();
        config.report.window_hours = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("window_hours"));
    }

    #[test]
    fn test_validate_zero_bucket() {
        let mut config = Config::default();
        config.report.bucket_hours = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bucket_hours"));
    }

    #[test]
    fn test_validate_bucket_wider_than_window() {
        let mut config = Config::default();
        config.report.window_hours = 2;
        config.report.bucket_hours = 3;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cannot be greater"));
    }

    #[test]
    fn test_window_from_config() {
        let mut config = Config::default();
        config.report.window_hours = 12;
        config.report.bucket_hours = 2;

        let window = config.window().unwrap();
        assert_eq!(window.hours, 12);
        assert_eq!(window.bucket_hours, 2);
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("wait_times.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("waitboard"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("waitboard"));
    }

    #[test]
    fn test_validate_window_upper_bound() {
        let mut config = Config::default();
        config.report.window_hours = MAX_WINDOW_HOURS;
        assert!(config.validate().is_ok());

        config.report.window_hours = MAX_WINDOW_HOURS + 1;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        assert!(err.to_string().contains("window_hours"));

        config.report.window_hours = u32::MAX;
        assert!(config.validate().is_err());
    }

    // Loading tests run inside `Jail` so environment overrides set by one
    // test never leak into another.

    #[test]
    fn test_load_nonexistent_config() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[storage]\ndatabase_path = \"/tmp/elsewhere.db\"\n\n[report]\nwindow_hours = 3\n",
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.database_path(), PathBuf::from("/tmp/elsewhere.db"));
            assert_eq!(config.report.window_hours, 3);
            assert_eq!(config.report.bucket_hours, 1);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[report]\nwindow_hours = 3\nbucket_hours = 1\n")?;
            jail.set_env("WAITBOARD_REPORT__WINDOW_HOURS", "12");
            jail.set_env("WAITBOARD_STORAGE__DATABASE_PATH", "/tmp/from_env.db");

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.report.window_hours, 12);
            assert_eq!(config.report.bucket_hours, 1);
            assert_eq!(config.database_path(), PathBuf::from("/tmp/from_env.db"));
            Ok(())
        });
    }

    #[test]
    fn test_env_override_without_file() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WAITBOARD_REPORT__BUCKET_HOURS", "2");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.report.window_hours, 6);
            assert_eq!(config.report.bucket_hours, 2);
            Ok(())
        });
    }

    #[test]
    fn test_env_override_is_validated() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WAITBOARD_REPORT__WINDOW_HOURS", "0");

            let result = Config::load_from(Some(PathBuf::from("missing.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_load_other_file_ignores_broken_default() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[report]\nwindow_hours = 0\n")?;
            jail.create_file("other.toml", "[report]\nwindow_hours = 8\n")?;

            assert!(Config::load_from(Some(PathBuf::from("config.toml"))).is_err());
            let config = Config::load_from(Some(PathBuf::from("other.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.report.window_hours, 8);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_invalid_toml_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[report]\nwindow_hours = 0\n")?;

            let result = Config::load_from(Some(PathBuf::from("config.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }

    #[test]
    fn test_report_config_deserialize() {
        let json = r#"{"window_hours": 24}"#;
        let report: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(report.window_hours, 24);
        assert_eq!(report.bucket_hours, 1);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("window_hours"));
        assert!(json.contains("database_path"));
    }
}
