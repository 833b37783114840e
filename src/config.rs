//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.heatdash.toml` files.

use crate::loader::DEFAULT_SENTINEL_THRESHOLD;
use crate::report::EXPORT_FILENAME;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILENAME: &str = ".heatdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "heat_exposure_report.md".to_string()
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the observations CSV.
    #[serde(default = "default_data_path")]
    pub path: String,

    /// Temperatures at or below this value are treated as missing.
    /// May only raise the cutoff above the -900 sentinel.
    #[serde(default = "default_sentinel_threshold")]
    pub sentinel_threshold: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            sentinel_threshold: default_sentinel_threshold(),
        }
    }
}

fn default_data_path() -> String {
    EXPORT_FILENAME.to_string()
}

fn default_sentinel_threshold() -> f64 {
    DEFAULT_SENTINEL_THRESHOLD
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of histogram bins for the selected view.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Include per-city trend tables.
    #[serde(default = "default_true")]
    pub include_trends: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            histogram_bins: default_histogram_bins(),
            include_trends: true,
        }
    }
}

fn default_histogram_bins() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check the settings the loader and report generator rely on.
    pub fn validate(&self) -> Result<()> {
        if self.report.histogram_bins == 0 {
            bail!("report.histogram_bins must be at least 1");
        }

        let threshold = self.data.sentinel_threshold;
        if threshold.is_nan() || threshold < DEFAULT_SENTINEL_THRESHOLD {
            bail!(
                "data.sentinel_threshold must be at least {}, got {}",
                DEFAULT_SENTINEL_THRESHOLD,
                threshold
            );
        }

        Ok(())
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILENAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the config.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.display().to_string();
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(bins) = args.bins {
            self.report.histogram_bins = bins;
        }

        if args.no_trends {
            self.report.include_trends = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
