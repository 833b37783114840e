//! heatdash - Global Urban Heat Exposure reports
//!
//! A CLI tool that cleans daily city temperature observations, derives
//! seasons and the heat exposure index, and renders the dashboard views
//! as a Markdown or JSON report with an optional CSV export.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, unreadable or malformed dataset, write failure)

use anyhow::{Context, Result};
use heatdash::analysis;
use heatdash::cache::DatasetCache;
use heatdash::cli::{Args, OutputFormat};
use heatdash::config::{Config, CONFIG_FILENAME};
use heatdash::loader::LoadConfig;
use heatdash::models::Period;
use heatdash::report::{self, ReportRequest};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("heatdash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_report(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .heatdash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILENAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILENAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILENAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILENAME);
    println!("   Edit it to change the data path, sentinel threshold, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset, build the report and write it. Returns the exit code.
fn run_report(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    // Step 1: Load and enrich the dataset
    let source = PathBuf::from(&config.data.path);
    let cache = DatasetCache::new(source, LoadConfig::from(&config.data));

    let spinner = (!args.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading {}", cache.source().display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let loaded = cache.get();
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let dataset = loaded
        .with_context(|| format!("Failed to load dataset from {}", cache.source().display()))?;

    let stats = cache.load_stats().unwrap_or_default();
    info!(
        "Dataset ready: {} observations across {} cities",
        dataset.len(),
        dataset.cities().len()
    );

    // Handle --list-cities: print the selectable cities and exit
    if args.list_cities {
        for city in dataset.city_choices() {
            println!("{}", city);
        }
        return Ok(0);
    }

    // Step 2: Build the report
    let request = ReportRequest {
        source: cache.source().display().to_string(),
        city: args.city.clone(),
        period: Period::from(args.period),
        metric: args.metric(),
        histogram_bins: config.report.histogram_bins,
        include_trends: config.report.include_trends,
        rows_dropped: stats.rows_dropped,
    };
    let report = report::build_report(&dataset, &request);

    for notice in &report.notices {
        warn!("{}", notice);
    }

    // Step 3: Render and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    report::write_report(&output, &output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Step 4: Optional CSV export
    if let Some(ref dir) = args.export_dir {
        let path = report::export_to_dir(&dataset, dir)
            .with_context(|| format!("Failed to export dataset to {}", dir.display()))?;
        println!("⬇️  Dataset exported to: {}", path.display());
    }

    // Print summary
    if !args.quiet {
        println!("\n📊 Heat Exposure Summary:");
        println!(
            "   Observations: {} ({} rows dropped as missing)",
            dataset.len(),
            stats.rows_dropped
        );
        match report.summary {
            Some(ref summary) => {
                for line in analysis::generate_summary_text(summary).lines() {
                    println!("   {}", line);
                }
            }
            None => println!("   Nothing to display: dataset is empty."),
        }
        println!("   Duration: {:.2}s", start_time.elapsed().as_secs_f64());
        println!("\n✅ Report saved to: {}", output_path.display());
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILENAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
