//! Data models for the heat exposure pipeline.
//!
//! This module contains the core data structures shared by the loader,
//! the feature deriver, the aggregator and the view filter.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::{
    AggregateSummary, BoxStats, CityMarker, HistogramBin, MonthlyMean, SeasonShare, TrendPoint,
};
use crate::error::PipelineError;

/// A city tracked by the dashboard.
///
/// Declaration order is the enumeration order used for tie-breaking
/// and for ordered maps keyed by city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum City {
    Mumbai,
    Dubai,
    Singapore,
    London,
    #[serde(rename = "New York")]
    NewYork,
    Sydney,
}

impl City {
    /// All cities in enumeration order.
    pub const ALL: [City; 6] = [
        City::Mumbai,
        City::Dubai,
        City::Singapore,
        City::London,
        City::NewYork,
        City::Sydney,
    ];

    /// Returns the name used in the source data.
    pub fn name(&self) -> &'static str {
        match self {
            City::Mumbai => "Mumbai",
            City::Dubai => "Dubai",
            City::Singapore => "Singapore",
            City::London => "London",
            City::NewYork => "New York",
            City::Sydney => "Sydney",
        }
    }

    /// Returns the static location of the city.
    pub fn location(&self) -> CityLocation {
        let (latitude, longitude) = match self {
            City::Mumbai => (19.0760, 72.8777),
            City::Dubai => (25.2048, 55.2708),
            City::Singapore => (1.3521, 103.8198),
            City::London => (51.5074, -0.1278),
            City::NewYork => (40.7128, -74.0060),
            City::Sydney => (-33.8688, 151.2093),
        };

        CityLocation {
            area: *self,
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for City {
    type Err = PipelineError;

    /// Parses a city name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        City::ALL
            .iter()
            .copied()
            .find(|city| city.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PipelineError::UnknownCity(wanted.to_string()))
    }
}

/// Calendar season label derived from the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    /// June, July, August.
    Summer,
    /// December, January, February.
    Winter,
    /// Every other month.
    Transition,
}

/// Season of each month, indexed by `month - 1`.
const MONTH_SEASONS: [Season; 12] = [
    Season::Winter,
    Season::Winter,
    Season::Transition,
    Season::Transition,
    Season::Transition,
    Season::Summer,
    Season::Summer,
    Season::Summer,
    Season::Transition,
    Season::Transition,
    Season::Transition,
    Season::Winter,
];

impl Season {
    /// All seasons in display order.
    pub const ALL: [Season; 3] = [Season::Summer, Season::Winter, Season::Transition];

    /// Returns the season for a month in `1..=12`, or `None` outside that range.
    pub fn from_month(month: u32) -> Option<Season> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        MONTH_SEASONS.get(index).copied()
    }

    /// Returns the season a calendar date falls into.
    pub fn of_date(date: NaiveDate) -> Season {
        MONTH_SEASONS[date.month0() as usize]
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Summer => write!(f, "Summer"),
            Season::Winter => write!(f, "Winter"),
            Season::Transition => write!(f, "Transition"),
        }
    }
}

/// Time-period selector for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    /// Every season.
    #[default]
    FullYear,
    Summer,
    Winter,
    Transition,
}

impl Period {
    /// Returns true if records of `season` belong to this period.
    pub fn admits(&self, season: Season) -> bool {
        match self {
            Period::FullYear => true,
            Period::Summer => season == Season::Summer,
            Period::Winter => season == Season::Winter,
            Period::Transition => season == Season::Transition,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::FullYear => write!(f, "Full Year"),
            Period::Summer => write!(f, "Summer"),
            Period::Winter => write!(f, "Winter"),
            Period::Transition => write!(f, "Transition"),
        }
    }
}

/// Which value a trend series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Absolute temperature in °C.
    #[default]
    Temperature,
    /// Deviation from the city's own mean.
    HeatExposureIndex,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Temperature => write!(f, "Temperature (°C)"),
            Metric::HeatExposureIndex => write!(f, "Heat Exposure Index (°C)"),
        }
    }
}

/// A cleaned daily temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// City the reading belongs to.
    pub area: City,
    /// Calendar date of the reading.
    pub date: NaiveDate,
    /// Temperature in °C, always finite and above the sentinel threshold.
    pub temperature_c: f64,
}

/// An observation with its derived calendar and anomaly fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnrichedObservation {
    pub area: City,
    pub date: NaiveDate,
    pub temperature_c: f64,
    /// Month of `date`, 1-12.
    pub month: u32,
    pub season: Season,
    /// `temperature_c` minus the city's full-dataset mean.
    pub heat_exposure_index: f64,
}

impl EnrichedObservation {
    /// Returns the underlying observation without derived fields.
    pub fn observation(&self) -> Observation {
        Observation {
            area: self.area,
            date: self.date,
            temperature_c: self.temperature_c,
        }
    }

    /// Returns the value of the given metric for this record.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature_c,
            Metric::HeatExposureIndex => self.heat_exposure_index,
        }
    }
}

/// Static geographic reference for a city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityLocation {
    pub area: City,
    pub latitude: f64,
    pub longitude: f64,
}

/// Mean absolute temperature of one city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityAggregate {
    pub area: City,
    pub mean_temperature_c: f64,
}

/// The enriched dataset built once per load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichedDataset {
    records: Vec<EnrichedObservation>,
}

impl EnrichedDataset {
    /// Wraps already-enriched records.
    pub fn new(records: Vec<EnrichedObservation>) -> Self {
        Self { records }
    }

    /// Returns all records in load order.
    pub fn records(&self) -> &[EnrichedObservation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the cities present in the data, in enumeration order.
    pub fn cities(&self) -> Vec<City> {
        City::ALL
            .iter()
            .copied()
            .filter(|city| self.records.iter().any(|r| r.area == *city))
            .collect()
    }

    /// Returns the cities present in the data, sorted by name.
    pub fn city_choices(&self) -> Vec<City> {
        let mut cities = self.cities();
        cities.sort_by_key(|city| city.name());
        cities
    }
}

/// Metadata about the dashboard report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the source dataset.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of enriched observations.
    pub records: usize,
    /// Number of source rows dropped as missing.
    pub rows_dropped: usize,
    /// Cities present in the dataset.
    pub cities: Vec<City>,
    /// Metric used for the trend series.
    pub metric: Metric,
    /// Time spent building the report, in seconds.
    pub duration_seconds: f64,
}

/// The per-city trend shown on the trends tab.
#[derive(Debug, Clone, Serialize)]
pub struct CityTrend {
    pub area: City,
    pub points: Vec<TrendPoint>,
    pub monthly: Vec<MonthlyMean>,
}

/// Distribution plots for the selected city and period.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub city: City,
    pub period: Period,
    /// Number of records in the view.
    pub records: usize,
    pub histogram: Vec<HistogramBin>,
    pub seasonal_share: Vec<SeasonShare>,
}

/// The complete dashboard report.
///
/// Sections that could not be computed are `None` or empty, with the reason
/// recorded in `notices`.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Headline metrics and ranking.
    pub summary: Option<AggregateSummary>,
    /// Map markers, one per city.
    pub markers: Vec<CityMarker>,
    /// Box statistics per city for the selected period.
    pub distribution: Vec<BoxStats>,
    pub trends: Vec<CityTrend>,
    pub selection: Option<Selection>,
    /// Messages for sections with nothing to display.
    pub notices: Vec<String>,
}
