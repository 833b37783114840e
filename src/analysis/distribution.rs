//! Distribution summaries: box statistics, histograms and seasonal shares.

use super::view::filter_by_period;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{City, EnrichedDataset, EnrichedObservation, Period, Season};
use serde::Serialize;

/// Five-number summary of one city's temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub area: City,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// One equal-width histogram bin. The last bin includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Summed temperature of one season and its share of the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonShare {
    pub season: Season,
    pub total_c: f64,
    pub share_pct: f64,
}

/// Quantile of sorted values using linear interpolation.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Compute the five-number summary of a city's values.
pub fn box_stats(area: City, values: &[f64]) -> PipelineResult<BoxStats> {
    if values.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Ok(BoxStats {
        area,
        count: sorted.len(),
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Box statistics for every city, restricted to `period`.
pub fn city_distributions(dataset: &EnrichedDataset, period: Period) -> Vec<BoxStats> {
    filter_by_period(dataset, period)
        .into_iter()
        .filter_map(|(city, records)| {
            let temps: Vec<f64> = records.iter().map(|r| r.temperature_c).collect();
            box_stats(city, &temps).ok()
        })
        .collect()
}

/// Count values into `bins` equal-width bins spanning their range.
///
/// A constant series spans `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> PipelineResult<Vec<HistogramBin>> {
    if values.is_empty() || bins == 0 {
        return Err(PipelineError::EmptyDataset);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count,
        })
        .collect())
}

/// Sum temperatures per season and express each as a share of the total.
///
/// Only seasons present in `records` are returned.
pub fn seasonal_share(records: &[EnrichedObservation]) -> PipelineResult<Vec<SeasonShare>> {
    if records.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    let totals: Vec<(Season, f64)> = Season::ALL
        .iter()
        .filter_map(|season| {
            let mut in_season = records.iter().filter(|r| r.season == *season).peekable();
            in_season.peek()?;
            Some((*season, in_season.map(|r| r.temperature_c).sum()))
        })
        .collect();

    let grand_total: f64 = totals.iter().map(|(_, t)| t).sum();

    Ok(totals
        .into_iter()
        .map(|(season, total_c)| SeasonShare {
            season,
            total_c,
            share_pct: if grand_total == 0.0 {
                0.0
            } else {
                total_c / grand_total * 100.0
            },
        })
        .collect())
}
