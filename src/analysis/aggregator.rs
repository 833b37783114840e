//! City aggregation and ranking.
//!
//! This module computes per-city mean temperatures, the global mean,
//! the hottest and coolest cities, the ranking and the map markers
//! from an enriched dataset.

use super::features::MeanAccumulator;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{City, CityAggregate, EnrichedDataset};
use serde::Serialize;
use std::collections::BTreeMap;

/// Global-level summary consumed by the metric widgets and ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    /// Mean absolute temperature per city, in enumeration order.
    pub per_city_mean: BTreeMap<City, f64>,
    /// Unweighted mean of the per-city means.
    pub global_mean: f64,
    /// City with the highest mean.
    pub hottest: City,
    /// City with the lowest mean.
    pub coolest: City,
    /// Cities by mean, hottest first.
    pub ranking: Vec<CityAggregate>,
}

/// Whether a city sits above or below the global mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Warm,
    Cool,
}

impl Tone {
    /// Returns the marker colour name.
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Warm => "red",
            Tone::Cool => "blue",
        }
    }
}

/// A city aggregate joined with its location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityMarker {
    pub area: City,
    pub latitude: f64,
    pub longitude: f64,
    pub mean_temperature_c: f64,
    /// City mean minus the global mean.
    pub deviation_c: f64,
    pub tone: Tone,
}

/// Mean absolute temperature of every city present in the dataset.
pub fn per_city_mean(dataset: &EnrichedDataset) -> BTreeMap<City, f64> {
    let mut acc: BTreeMap<City, MeanAccumulator> = BTreeMap::new();

    for record in dataset.records() {
        acc.entry(record.area).or_default().push(record.temperature_c);
    }

    acc.into_iter()
        .filter_map(|(city, a)| a.mean().map(|m| (city, m)))
        .collect()
}

/// Sort cities by mean temperature, hottest first.
///
/// The sort is stable, so cities with equal means keep enumeration order.
pub fn rank_cities(per_city: &BTreeMap<City, f64>) -> Vec<CityAggregate> {
    let mut ranking: Vec<CityAggregate> = per_city
        .iter()
        .map(|(area, mean)| CityAggregate {
            area: *area,
            mean_temperature_c: *mean,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.mean_temperature_c
            .partial_cmp(&a.mean_temperature_c)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranking
}

/// Compute the aggregate summary of an enriched dataset.
pub fn summarize(dataset: &EnrichedDataset) -> PipelineResult<AggregateSummary> {
    let per_city_mean = per_city_mean(dataset);

    let mut entries = per_city_mean.iter();
    let Some((&first_city, &first_mean)) = entries.next() else {
        return Err(PipelineError::EmptyDataset);
    };

    let (mut hottest, mut hottest_mean) = (first_city, first_mean);
    let (mut coolest, mut coolest_mean) = (first_city, first_mean);

    // Strict comparisons keep the earliest city on ties.
    for (&city, &mean) in entries {
        if mean > hottest_mean {
            hottest = city;
            hottest_mean = mean;
        }
        if mean < coolest_mean {
            coolest = city;
            coolest_mean = mean;
        }
    }

    let global_mean = per_city_mean.values().sum::<f64>() / per_city_mean.len() as f64;
    let ranking = rank_cities(&per_city_mean);

    Ok(AggregateSummary {
        per_city_mean,
        global_mean,
        hottest,
        coolest,
        ranking,
    })
}

/// Join the per-city means with the location table.
pub fn map_markers(summary: &AggregateSummary) -> Vec<CityMarker> {
    summary
        .per_city_mean
        .iter()
        .map(|(city, mean)| {
            let location = city.location();
            let deviation_c = mean - summary.global_mean;

            CityMarker {
                area: *city,
                latitude: location.latitude,
                longitude: location.longitude,
                mean_temperature_c: *mean,
                deviation_c,
                tone: if deviation_c > 0.0 { Tone::Warm } else { Tone::Cool },
            }
        })
        .collect()
}

/// Generate a text summary of the headline metrics.
pub fn generate_summary_text(summary: &AggregateSummary) -> String {
    let mut lines = Vec::new();

    lines.push(format!("🔥 Hottest City: {}", summary.hottest));
    lines.push(format!("❄️ Coolest City: {}", summary.coolest));
    lines.push(format!("🌡️ Global Avg Temp: {:.2} °C", summary.global_mean));

    if !summary.ranking.is_empty() {
        lines.push(String::new());
        lines.push("Ranking:".to_string());

        for (i, entry) in summary.ranking.iter().enumerate() {
            lines.push(format!(
                "{}. {}: {:.2} °C",
                i + 1,
                entry.area,
                entry.mean_temperature_c
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::build_dataset;
    use crate::models::Observation;
    use chrono::NaiveDate;

    fn obs(area: City, m: u32, d: u32, t: f64) -> Observation {
        Observation {
            area,
            date: NaiveDate::from_ymd_opt(2024, m, d).unwrap(),
            temperature_c: t,
        }
    }

    fn example_dataset() -> EnrichedDataset {
        build_dataset(&[
            obs(City::Mumbai, 6, 15, 32.0),
            obs(City::Mumbai, 1, 15, 18.0),
            obs(City::Dubai, 6, 15, 40.0),
        ])
    }

    #[test]
    fn test_summarize_example() {
        let summary = summarize(&example_dataset()).unwrap();

        assert_eq!(summary.per_city_mean.get(&City::Mumbai), Some(&25.0));
        assert_eq!(summary.per_city_mean.get(&City::Dubai), Some(&40.0));
        assert!((summary.global_mean - 32.5).abs() < 1e-9);
        assert_eq!(summary.hottest, City::Dubai);
        assert_eq!(summary.coolest, City::Mumbai);
        assert_eq!(summary.ranking[0].area, City::Dubai);
        assert_eq!(summary.ranking[1].area, City::Mumbai);
    }

    #[test]
    fn test_global_mean_is_mean_of_city_means() {
        // London has three times as many rows; it must still count once.
        let dataset = build_dataset(&[
            obs(City::London, 1, 1, 10.0),
            obs(City::London, 1, 2, 10.0),
            obs(City::London, 1, 3, 10.0),
            obs(City::Dubai, 1, 1, 30.0),
        ]);

        let summary = summarize(&dataset).unwrap();
        assert!((summary.global_mean - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty_dataset() {
        let err = summarize(&EnrichedDataset::default()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDataset));
    }

    #[test]
    fn test_ties_resolve_to_enumeration_order() {
        let dataset = build_dataset(&[
            obs(City::Sydney, 1, 1, 20.0),
            obs(City::Dubai, 1, 1, 30.0),
            obs(City::Mumbai, 1, 1, 30.0),
            obs(City::London, 1, 1, 20.0),
        ]);

        let summary = summarize(&dataset).unwrap();
        assert_eq!(summary.hottest, City::Mumbai);
        assert_eq!(summary.coolest, City::London);

        let order: Vec<City> = summary.ranking.iter().map(|r| r.area).collect();
        assert_eq!(
            order,
            vec![City::Mumbai, City::Dubai, City::London, City::Sydney]
        );
    }

    #[test]
    fn test_ranking_sorted_descending() {
        let dataset = build_dataset(&[
            obs(City::London, 1, 1, 11.0),
            obs(City::Singapore, 1, 1, 27.5),
            obs(City::NewYork, 1, 1, 12.0),
            obs(City::Sydney, 1, 1, 22.0),
        ]);

        let ranking = summarize(&dataset).unwrap().ranking;
        assert!(ranking
            .windows(2)
            .all(|w| w[0].mean_temperature_c >= w[1].mean_temperature_c));
        assert_eq!(ranking[0].area, City::Singapore);
        assert_eq!(ranking[3].area, City::London);
    }

    #[test]
    fn test_map_markers() {
        let summary = summarize(&example_dataset()).unwrap();
        let markers = map_markers(&summary);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].area, City::Mumbai);
        assert_eq!(markers[0].latitude, 19.0760);
        assert!((markers[0].deviation_c + 7.5).abs() < 1e-9);
        assert_eq!(markers[0].tone, Tone::Cool);
        assert_eq!(markers[1].tone, Tone::Warm);
        assert_eq!(markers[1].tone.color(), "red");
    }

    #[test]
    fn test_generate_summary_text() {
        let summary = summarize(&example_dataset()).unwrap();
        let text = generate_summary_text(&summary);

        assert!(text.contains("Hottest City: Dubai"));
        assert!(text.contains("Coolest City: Mumbai"));
        assert!(text.contains("32.50 °C"));
        assert!(text.contains("1. Dubai: 40.00 °C"));
    }
}
