//! Markdown report generation.
//!
//! This module renders the dashboard report as Markdown tables, one
//! section per dashboard tab, or as pretty-printed JSON.

use crate::analysis::{AggregateSummary, BoxStats, CityMarker};
use crate::models::{CityTrend, Metric, Report, ReportMetadata, Selection};
use anyhow::Result;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# 🌍 Global Urban Heat Exposure Report\n\n");
    output.push_str(
        "Comparative analysis of urban heat exposure across global cities using \
         **NASA POWER daily temperature reanalysis data**.\n\n",
    );

    output.push_str(&generate_metadata_section(&report.metadata));

    if let Some(ref summary) = report.summary {
        output.push_str(&generate_metrics_section(summary));
        output.push_str(&generate_ranking_section(summary));
    }

    output.push_str(&generate_map_section(&report.markers));
    output.push_str(&generate_distribution_section(&report.distribution));
    output.push_str(&generate_trends_section(&report.trends, report.metadata.metric));

    if let Some(ref selection) = report.selection {
        output.push_str(&generate_selection_section(selection));
    }

    output.push_str(&generate_notices_section(&report.notices));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Observations:** {}\n", metadata.records));
    if metadata.rows_dropped > 0 {
        section.push_str(&format!(
            "- **Rows Dropped (missing):** {}\n",
            metadata.rows_dropped
        ));
    }
    let cities: Vec<&str> = metadata.cities.iter().map(|c| c.name()).collect();
    section.push_str(&format!("- **Cities:** {}\n", cities.join(", ")));
    section.push_str(&format!("- **Trend Metric:** {}\n", metadata.metric));
    section.push('\n');

    section
}

/// Generate the headline metrics table.
fn generate_metrics_section(summary: &AggregateSummary) -> String {
    let mut section = String::new();

    section.push_str("## Headline Metrics\n\n");
    section.push_str("| 🔥 Hottest City | ❄️ Coolest City | 🌡️ Global Avg Temp |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {:.2} °C |\n\n",
        summary.hottest, summary.coolest, summary.global_mean
    ));

    section
}

/// Generate the heat ranking table, numbered from 1.
fn generate_ranking_section(summary: &AggregateSummary) -> String {
    let mut section = String::new();

    section.push_str("## 🔥 Heat Ranking\n\n");
    section.push_str("| Rank | City | Avg Temperature (°C) |\n");
    section.push_str("|:---:|:---|:---:|\n");

    for (i, entry) in summary.ranking.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            i + 1,
            entry.area,
            entry.mean_temperature_c
        ));
    }
    section.push('\n');

    section
}

/// Generate the map table.
fn generate_map_section(markers: &[CityMarker]) -> String {
    if markers.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## 🗺️ City Map\n\n");
    section.push_str(
        "| City | Latitude | Longitude | Avg Temperature (°C) | Vs Global Avg (°C) | Marker |\n",
    );
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");

    for marker in markers {
        section.push_str(&format!(
            "| {} | {:.4} | {:.4} | {:.2} | {:+.2} | {} |\n",
            marker.area,
            marker.latitude,
            marker.longitude,
            marker.mean_temperature_c,
            marker.deviation_c,
            marker.tone.color()
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-city distribution table.
fn generate_distribution_section(distribution: &[BoxStats]) -> String {
    if distribution.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## 📊 Temperature Variability by City\n\n");
    section.push_str("| City | Days | Min | Q1 | Median | Q3 | Max |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|:---:|\n");

    for stats in distribution {
        section.push_str(&format!(
            "| {} | {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} |\n",
            stats.area, stats.count, stats.min, stats.q1, stats.median, stats.q3, stats.max
        ));
    }
    section.push('\n');

    section
}

/// Generate monthly trend tables, one per city.
fn generate_trends_section(trends: &[CityTrend], metric: Metric) -> String {
    if trends.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## 📈 Trends\n\n");
    section.push_str(&format!("*Monthly mean of {}*\n\n", metric));

    for trend in trends {
        section.push_str(&format!("### {}\n\n", trend.area));
        section.push_str("| Month | Mean |\n");
        section.push_str("|:---|:---:|\n");

        for month in &trend.monthly {
            section.push_str(&format!(
                "| {}-{:02} | {:.2} |\n",
                month.year, month.month, month.mean
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the selected city's histogram and seasonal contribution.
fn generate_selection_section(selection: &Selection) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {} ({})\n\n", selection.city, selection.period));
    section.push_str(&format!("*Days in view: {}*\n\n", selection.records));

    section.push_str("### Temperature Frequency\n\n");
    section.push_str("| Temperature (°C) | Number of Days |\n");
    section.push_str("|:---|:---:|\n");
    for bin in &selection.histogram {
        section.push_str(&format!("| {:.1} – {:.1} | {} |\n", bin.lower, bin.upper, bin.count));
    }
    section.push('\n');

    section.push_str("### Seasonal Contribution\n\n");
    section.push_str("| Season | Sum (°C) | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for share in &selection.seasonal_share {
        section.push_str(&format!(
            "| {} | {:.1} | {:.1}% |\n",
            share.season, share.total_c, share.share_pct
        ));
    }
    section.push('\n');

    section
}

/// Generate the notices section.
fn generate_notices_section(notices: &[String]) -> String {
    if notices.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Notices\n\n");
    for notice in notices {
        section.push_str(&format!("- ⚠️ {}\n", notice));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Data Source: NASA POWER API | Report generated by heatdash*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}
