//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{Metric, Period};
use clap::Parser;
use std::path::PathBuf;

/// heatdash - Global urban heat exposure reports
///
/// Cleans daily city temperatures, derives seasons and the heat exposure
/// index, and renders the dashboard as a Markdown or JSON report.
///
/// Examples:
///   heatdash --data global_urban_heat_daily_temperature_2024_2025.csv
///   heatdash --city Mumbai --period winter --show-index
///   heatdash --format json --output report.json
///   heatdash --export-dir ./downloads
///   heatdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Observations CSV with Area, Date and Temperature_C columns
    ///
    /// Defaults to the path in .heatdash.toml, or the bundled dataset name.
    #[arg(short, long, value_name = "FILE", env = "HEATDASH_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .heatdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// City to show in the selection section
    ///
    /// Defaults to the first city by name.
    #[arg(long, value_name = "CITY")]
    pub city: Option<String>,

    /// Time period for the selection and distribution sections
    #[arg(long, default_value = "full-year", value_name = "PERIOD")]
    pub period: PeriodArg,

    /// Plot trends as the heat exposure index instead of temperature
    #[arg(long)]
    pub show_index: bool,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Also export the enriched dataset as CSV into this directory
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Number of histogram bins
    #[arg(long, value_name = "NUM")]
    pub bins: Option<usize>,

    /// Leave the per-city trend tables out of the report
    #[arg(long)]
    pub no_trends: bool,

    /// Print the selectable cities and exit
    #[arg(long)]
    pub list_cities: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .heatdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Time period accepted by --period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PeriodArg {
    FullYear,
    Summer,
    Winter,
    Transition,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::FullYear => Period::FullYear,
            PeriodArg::Summer => Period::Summer,
            PeriodArg::Winter => Period::Winter,
            PeriodArg::Transition => Period::Transition,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(bins) = self.bins {
            if bins == 0 {
                return Err("Histogram bins must be at least 1".to_string());
            }
        }

        if let Some(ref data) = self.data {
            if !data.is_file() {
                return Err(format!("Data file does not exist: {}", data.display()));
            }
        }

        if let Some(ref dir) = self.export_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Export path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Returns the metric plotted by trend series.
    pub fn metric(&self) -> Metric {
        if self.show_index {
            Metric::HeatExposureIndex
        } else {
            Metric::Temperature
        }
    }
}
