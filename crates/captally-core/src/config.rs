// Rust guideline compliant 2026-10-17

//! Configuration management for Captally.

use crate::{calendar, Error, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "captally.toml";

/// Configuration for an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Aggregate file, relative paths resolve against the repository root.
    #[serde(default = "default_aggregate_path")]
    pub aggregate_path: PathBuf,

    /// Source file path inside the repository.
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,

    /// Number of days kept as raw entries before compaction.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Fixed UTC offset, in hours, that dates are bucketed in.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

fn default_aggregate_path() -> PathBuf {
    PathBuf::from("aggregated_capacities.json")
}

fn default_source_path() -> PathBuf {
    PathBuf::from("capacities.json")
}

/// Default retention window in days.
fn default_retention_days() -> u32 {
    30
}

/// Default offset: UTC+8.
fn default_utc_offset_hours() -> i32 {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aggregate_path: default_aggregate_path(),
            source_path: default_source_path(),
            retention_days: default_retention_days(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl Config {
    /// Loads configuration for a repository.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file at `<repo_root>/captally.toml`
    /// 3. Environment variables with `CAPTALLY_` prefix
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file exists but cannot be read
    /// - Configuration file contains invalid TOML
    /// - Configuration values fail validation
    pub fn load(repo_root: &Path) -> Result<Self> {
        Self::load_from(&repo_root.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from an explicit file path.
    ///
    /// A missing file is not an error; defaults and environment overrides
    /// still apply.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = Self::default();

        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            config = toml::from_str(&content)
                .map_err(|e| Error::InvalidConfig(format!("Invalid config file: {}", e)))?;
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Applies overrides from a variable lookup.
    ///
    /// Supported variables:
    /// - `CAPTALLY_AGGREGATE_PATH` - Aggregate file path
    /// - `CAPTALLY_SOURCE_PATH` - Source file path inside the repository
    /// - `CAPTALLY_RETENTION_DAYS` - Retention window in days
    /// - `CAPTALLY_UTC_OFFSET_HOURS` - Bucketing offset in hours
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CAPTALLY_AGGREGATE_PATH") {
            self.aggregate_path = PathBuf::from(val);
        }

        if let Some(val) = lookup("CAPTALLY_SOURCE_PATH") {
            self.source_path = PathBuf::from(val);
        }

        if let Some(val) = lookup("CAPTALLY_RETENTION_DAYS") {
            self.retention_days = val.parse().map_err(|_| {
                Error::InvalidConfig("CAPTALLY_RETENTION_DAYS must be a positive number".to_string())
            })?;
        }

        if let Some(val) = lookup("CAPTALLY_UTC_OFFSET_HOURS") {
            self.utc_offset_hours = val.parse().map_err(|_| {
                Error::InvalidConfig("CAPTALLY_UTC_OFFSET_HOURS must be a whole number".to_string())
            })?;
        }

        Ok(())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - retention_days is zero
    /// - utc_offset_hours is outside -12..=14
    /// - either path is empty, or source_path is absolute
    pub fn validate(&self) -> Result<()> {
        if self.retention_days == 0 {
            return Err(Error::InvalidConfig(
                "retention_days must be greater than 0".to_string(),
            ));
        }

        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(Error::InvalidConfig(format!(
                "utc_offset_hours must be -12..=14, got {}",
                self.utc_offset_hours
            )));
        }

        if self.aggregate_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "aggregate_path cannot be empty".to_string(),
            ));
        }

        if self.source_path.as_os_str().is_empty() || self.source_path.is_absolute() {
            return Err(Error::InvalidConfig(
                "source_path must be a non-empty path relative to the repository root".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the bucketing offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is out of range.
    pub fn offset(&self) -> Result<FixedOffset> {
        calendar::fixed_offset(self.utc_offset_hours)
    }

    /// Resolves the aggregate path against the repository root.
    #[must_use]
    pub fn resolve_aggregate_path(&self, repo_root: &Path) -> PathBuf {
        if self.aggregate_path.is_absolute() {
            self.aggregate_path.clone()
        } else {
            repo_root.join(&self.aggregate_path)
        }
    }

    /// Saves the configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be created or written
    /// - Serialization fails
    pub fn save(&self, config_path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.aggregate_path, PathBuf::from("aggregated_capacities.json"));
        assert_eq!(config.source_path, PathBuf::from("capacities.json"));
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.utc_offset_hours, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file_partial() {
        let config: Config = toml::from_str("retention_days = 7").unwrap();
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.utc_offset_hours, 8);
        assert_eq!(config.source_path, PathBuf::from("capacities.json"));
    }

    #[test]
    fn test_config_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "retention_days = \"many\"").unwrap();

        assert!(Config::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_validation_zero_retention() {
        let config = Config {
            retention_days: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_offset_range() {
        let east = Config {
            utc_offset_hours: 15,
            ..Config::default()
        };
        assert!(east.validate().is_err());

        let west = Config {
            utc_offset_hours: -12,
            ..Config::default()
        };
        assert!(west.validate().is_ok());
        assert_eq!(west.offset().unwrap().local_minus_utc(), -12 * 3600);
    }

    #[test]
    fn test_config_validation_absolute_source() {
        let config = Config {
            source_path: std::env::temp_dir().join("capacities.json"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        config
            .apply_overrides(overrides(&[
                ("CAPTALLY_RETENTION_DAYS", "90"),
                ("CAPTALLY_UTC_OFFSET_HOURS", "-5"),
                ("CAPTALLY_SOURCE_PATH", "data/caps.json"),
                ("CAPTALLY_AGGREGATE_PATH", "out/agg.json"),
            ]))
            .unwrap();

        assert_eq!(config.retention_days, 90);
        assert_eq!(config.utc_offset_hours, -5);
        assert_eq!(config.source_path, PathBuf::from("data/caps.json"));
        assert_eq!(config.aggregate_path, PathBuf::from("out/agg.json"));
    }

    #[test]
    fn test_overrides_reject_invalid_numbers() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(overrides(&[("CAPTALLY_RETENTION_DAYS", "soon")]))
            .is_err());
        assert!(config
            .apply_overrides(overrides(&[("CAPTALLY_UTC_OFFSET_HOURS", "+8h")]))
            .is_err());
    }

    #[test]
    fn test_resolve_aggregate_path() {
        let root = Path::new("repo");
        let config = Config::default();
        assert_eq!(
            config.resolve_aggregate_path(root),
            PathBuf::from("repo/aggregated_capacities.json")
        );

        let absolute = std::env::temp_dir().join("agg.json");
        let config = Config {
            aggregate_path: absolute.clone(),
            ..Config::default()
        };
        assert_eq!(config.resolve_aggregate_path(root), absolute);
    }

    #[test]
    fn test_config_save_and_reparse() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);

        let original = Config {
            aggregate_path: PathBuf::from("agg.json"),
            source_path: PathBuf::from("nested/caps.json"),
            retention_days: 45,
            utc_offset_hours: 2,
        };
        original.save(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        let reparsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(original, reparsed);
    }
}
