//! Feature derivation: month, season and heat exposure index.

use crate::models::{City, EnrichedDataset, EnrichedObservation, Observation, Season};
use chrono::Datelike;
use std::collections::HashMap;
use tracing::debug;

/// Running sum and count for a mean.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean temperature of every city over the given observations.
pub fn city_means<'a, I>(observations: I) -> HashMap<City, f64>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut acc: HashMap<City, MeanAccumulator> = HashMap::new();

    for obs in observations {
        acc.entry(obs.area).or_default().push(obs.temperature_c);
    }

    acc.into_iter()
        .filter_map(|(city, a)| a.mean().map(|m| (city, m)))
        .collect()
}

/// Enrich observations with month, season and heat exposure index.
///
/// The index is relative to each city's mean over the whole input, so
/// it must be computed before any filtering. The input is left untouched
/// and the output keeps its order.
pub fn derive_features(observations: &[Observation]) -> Vec<EnrichedObservation> {
    let means = city_means(observations);

    observations
        .iter()
        .map(|obs| {
            // A city with a single reading has that reading as its mean.
            let mean = means.get(&obs.area).copied().unwrap_or(obs.temperature_c);

            EnrichedObservation {
                area: obs.area,
                date: obs.date,
                temperature_c: obs.temperature_c,
                month: obs.date.month(),
                season: Season::of_date(obs.date),
                heat_exposure_index: obs.temperature_c - mean,
            }
        })
        .collect()
}

/// Build the enriched dataset from cleaned observations.
pub fn build_dataset(observations: &[Observation]) -> EnrichedDataset {
    let records = derive_features(observations);
    debug!("Derived features for {} observations", records.len());
    EnrichedDataset::new(records)
}
