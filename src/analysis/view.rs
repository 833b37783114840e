//! Per-request views over the enriched dataset.
//!
//! Views are pure functions of the dataset and the selection; they never
//! touch the cached dataset itself.

use super::features::MeanAccumulator;
use crate::error::PipelineResult;
use crate::models::{City, EnrichedDataset, EnrichedObservation, Metric, Period};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Records of one city restricted to one period, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityView {
    pub city: City,
    pub period: Period,
    pub records: Vec<EnrichedObservation>,
}

impl CityView {
    /// Temperatures of the view in chronological order.
    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature_c).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One point of a trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Mean of a trend series over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyMean {
    pub year: i32,
    pub month: u32,
    pub mean: f64,
}

/// Records for `city` within `period`, sorted by date.
pub fn filter_view(
    dataset: &EnrichedDataset,
    city: City,
    period: Period,
) -> Vec<EnrichedObservation> {
    let mut records: Vec<EnrichedObservation> = dataset
        .records()
        .iter()
        .filter(|r| r.area == city && period.admits(r.season))
        .copied()
        .collect();

    records.sort_by_key(|r| r.date);
    records
}

/// Resolve a user-supplied city name and build its view.
pub fn select_view(
    dataset: &EnrichedDataset,
    city: &str,
    period: Period,
) -> PipelineResult<CityView> {
    let city: City = city.parse()?;

    Ok(CityView {
        city,
        period,
        records: filter_view(dataset, city, period),
    })
}

/// Every city's records within `period`, each series sorted by date.
pub fn filter_by_period(
    dataset: &EnrichedDataset,
    period: Period,
) -> BTreeMap<City, Vec<EnrichedObservation>> {
    let mut grouped: BTreeMap<City, Vec<EnrichedObservation>> = BTreeMap::new();

    for record in dataset.records().iter().filter(|r| period.admits(r.season)) {
        grouped.entry(record.area).or_default().push(*record);
    }

    for series in grouped.values_mut() {
        series.sort_by_key(|r| r.date);
    }

    grouped
}

/// Chronological series of `metric` for one city over the full dataset.
pub fn trend_series(dataset: &EnrichedDataset, city: City, metric: Metric) -> Vec<TrendPoint> {
    filter_view(dataset, city, Period::FullYear)
        .iter()
        .map(|r| TrendPoint {
            date: r.date,
            value: r.metric(metric),
        })
        .collect()
}

/// Collapse a trend series into calendar-month means, oldest first.
pub fn monthly_means(series: &[TrendPoint]) -> Vec<MonthlyMean> {
    let mut acc: BTreeMap<(i32, u32), MeanAccumulator> = BTreeMap::new();

    for point in series {
        acc.entry((point.date.year(), point.date.month()))
            .or_default()
            .push(point.value);
    }

    acc.into_iter()
        .filter_map(|((year, month), a)| a.mean().map(|mean| MonthlyMean { year, month, mean }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::build_dataset;
    use crate::error::PipelineError;
    use crate::models::{Observation, Season};

    fn obs(area: City, y: i32, m: u32, d: u32, t: f64) -> Observation {
        Observation {
            area,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            temperature_c: t,
        }
    }

    fn dataset() -> EnrichedDataset {
        build_dataset(&[
            obs(City::Mumbai, 2024, 12, 20, 24.0),
            obs(City::Mumbai, 2024, 6, 1, 33.0),
            obs(City::Mumbai, 2024, 1, 5, 19.0),
            obs(City::Dubai, 2024, 1, 5, 21.0),
            obs(City::Mumbai, 2024, 4, 10, 30.0),
            obs(City::Mumbai, 2024, 2, 11, 20.0),
            obs(City::London, 2024, 7, 4, 22.0),
        ])
    }

    #[test]
    fn test_filter_city_winter_chronological() {
        let view = select_view(&dataset(), "Mumbai", Period::Winter).unwrap();

        assert_eq!(view.city, City::Mumbai);
        assert_eq!(view.records.len(), 3);
        assert!(view
            .records
            .iter()
            .all(|r| r.area == City::Mumbai && r.season == Season::Winter));
        assert!(view.records.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(view.temperatures(), vec![19.0, 20.0, 24.0]);
    }

    #[test]
    fn test_full_year_keeps_all_city_records() {
        let records = filter_view(&dataset(), City::Mumbai, Period::FullYear);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(records[4].date, NaiveDate::from_ymd_opt(2024, 12, 20).unwrap());
    }

    #[test]
    fn test_unknown_city() {
        let data = dataset();
        let before = data.clone();

        let err = select_view(&data, "Atlantis", Period::FullYear).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownCity(ref c) if c == "Atlantis"));
        assert_eq!(data, before);
    }

    #[test]
    fn test_known_city_without_records_is_empty() {
        let view = select_view(&dataset(), "Sydney", Period::Summer).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_filter_by_period() {
        let grouped = filter_by_period(&dataset(), Period::Winter);

        assert_eq!(grouped.get(&City::Mumbai).map(|v| v.len()), Some(3));
        assert_eq!(grouped.get(&City::Dubai).map(|v| v.len()), Some(1));
        assert!(grouped.get(&City::London).is_none());

        let full = filter_by_period(&dataset(), Period::FullYear);
        assert_eq!(full.values().map(Vec::len).sum::<usize>(), 7);
    }

    #[test]
    fn test_trend_series_metric() {
        let data = dataset();

        let temps = trend_series(&data, City::Mumbai, Metric::Temperature);
        assert_eq!(temps.len(), 5);
        assert_eq!(temps[0].value, 19.0);

        let index = trend_series(&data, City::Mumbai, Metric::HeatExposureIndex);
        // Mumbai mean is (24 + 33 + 19 + 30 + 20) / 5 = 25.2
        assert!((index[0].value - (19.0 - 25.2)).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_means() {
        let series = vec![
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                value: 10.0,
            },
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                value: 14.0,
            },
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                value: 9.0,
            },
        ];

        let months = monthly_means(&series);
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month, months[0].mean), (2024, 1, 12.0));
        assert_eq!(months[1].mean, 9.0);
    }
}
