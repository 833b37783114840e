//! Dashboard report assembly.
//!
//! Each section is computed independently from the enriched dataset. A
//! section whose computation fails is left empty and a notice is recorded,
//! so one bad selection never blanks the whole report.

use crate::analysis::{
    city_distributions, histogram, map_markers, monthly_means, seasonal_share, select_view,
    summarize, trend_series,
};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{CityTrend, EnrichedDataset, Metric, Period, Report, ReportMetadata, Selection};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, warn};

/// What the caller asked to see.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Path of the source, for the metadata section.
    pub source: String,
    /// Selected city; the first city by name when `None`.
    pub city: Option<String>,
    pub period: Period,
    pub metric: Metric,
    pub histogram_bins: usize,
    pub include_trends: bool,
    /// Rows dropped by the loader, for the metadata section.
    pub rows_dropped: usize,
}

/// Build the full dashboard report for `request`.
pub fn build_report(dataset: &EnrichedDataset, request: &ReportRequest) -> Report {
    let start = Instant::now();
    let mut notices = Vec::new();

    let summary = match summarize(dataset) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("Summary unavailable: {}", e);
            notices.push(format!("Headline metrics: nothing to display ({})", e));
            None
        }
    };

    let markers = summary.as_ref().map(map_markers).unwrap_or_default();
    let distribution = city_distributions(dataset, request.period);

    let trends: Vec<CityTrend> = if request.include_trends {
        dataset
            .cities()
            .into_iter()
            .map(|area| {
                let points = trend_series(dataset, area, request.metric);
                let monthly = monthly_means(&points);
                CityTrend {
                    area,
                    points,
                    monthly,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let selection = match build_selection(dataset, request) {
        Ok(selection) => Some(selection),
        Err(e) => {
            warn!("Selection unavailable: {}", e);
            notices.push(format!(
                "Selection ({}, {}): nothing to display ({})",
                request.city.as_deref().unwrap_or("default city"),
                request.period,
                e
            ));
            None
        }
    };

    let metadata = ReportMetadata {
        source: request.source.clone(),
        generated_at: Utc::now(),
        records: dataset.len(),
        rows_dropped: request.rows_dropped,
        cities: dataset.cities(),
        metric: request.metric,
        duration_seconds: start.elapsed().as_secs_f64(),
    };

    debug!("Report built with {} notices", notices.len());

    Report {
        metadata,
        summary,
        markers,
        distribution,
        trends,
        selection,
        notices,
    }
}

/// Compute the histogram and seasonal share for the selected view.
fn build_selection(
    dataset: &EnrichedDataset,
    request: &ReportRequest,
) -> PipelineResult<Selection> {
    let city = match &request.city {
        Some(city) => city.clone(),
        None => dataset
            .city_choices()
            .first()
            .map(|c| c.name().to_string())
            .ok_or(PipelineError::EmptyDataset)?,
    };

    let view = select_view(dataset, &city, request.period)?;
    let histogram = histogram(&view.temperatures(), request.histogram_bins)?;
    let seasonal_share = seasonal_share(&view.records)?;

    Ok(Selection {
        city: view.city,
        period: view.period,
        records: view.records.len(),
        histogram,
        seasonal_share,
    })
}
