//! Run configuration, optionally read from a JSON file.

use crate::data::CleaningMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_INPUT: &str = "Flipkart_Mobiles.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    /// Listing CSV to load.
    pub input: PathBuf,
    /// Directory receiving the chart images.
    pub output_dir: PathBuf,
    /// Write one PNG per chart.
    pub persist_output: bool,
    /// Open the chart viewer after rendering.
    pub show_window: bool,
    pub cleaning: CleaningMode,
    pub pie_top_n: usize,
    pub histogram_bins: usize,
    pub bubble_scale: f64,
    pub dpi: u32,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            persist_output: true,
            show_window: true,
            cleaning: CleaningMode::Lenient,
            pie_top_n: 10,
            histogram_bins: 20,
            bubble_scale: 100.0,
            dpi: 300,
        }
    }
}

impl VizConfig {
    /// Read a JSON config; absent keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pie_top_n == 0 {
            return Err(ConfigError::Invalid("pie_top_n must be at least 1".into()));
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid("histogram_bins must be at least 1".into()));
        }
        if !self.bubble_scale.is_finite() || self.bubble_scale <= 0.0 {
            return Err(ConfigError::Invalid("bubble_scale must be positive".into()));
        }
        if !(10..=1200).contains(&self.dpi) {
            return Err(ConfigError::Invalid(format!(
                "dpi must be between 10 and 1200, got {}",
                self.dpi
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: VizConfig =
            serde_json::from_str(r#"{"persist_output": false, "cleaning": "strict"}"#).unwrap();
        assert!(!config.persist_output);
        assert_eq!(config.cleaning, CleaningMode::Strict);
        assert_eq!(config.pie_top_n, 10);
        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = VizConfig::default();
        assert!(config.validate().is_ok());
        config.bubble_scale = 0.0;
        assert!(config.validate().is_err());
        config = VizConfig {
            dpi: 5,
            ..VizConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = VizConfig::from_file(Path::new("no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
