//! Record loader for raw temperature observations.
//!
//! This module reads the tabular source, drops sentinel and blank
//! temperatures, and rejects malformed rows.

use crate::error::{PipelineError, PipelineResult};
use crate::models::{City, Observation};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Header of the city column.
pub const AREA_COLUMN: &str = "Area";
/// Header of the date column.
pub const DATE_COLUMN: &str = "Date";
/// Header of the temperature column.
pub const TEMPERATURE_COLUMN: &str = "Temperature_C";

/// Readings at or below this value mean "missing".
pub const DEFAULT_SENTINEL_THRESHOLD: f64 = -900.0;

/// Configuration for loading observations.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Temperatures at or below this value are treated as missing.
    pub sentinel_threshold: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            sentinel_threshold: DEFAULT_SENTINEL_THRESHOLD,
        }
    }
}

impl From<&crate::config::DataConfig> for LoadConfig {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            sentinel_threshold: config.sentinel_threshold,
        }
    }
}

/// Cleaned observations plus counters about the load.
#[derive(Debug, Clone, Default)]
pub struct LoadedObservations {
    /// Retained observations in source order.
    pub observations: Vec<Observation>,
    /// Number of data rows read from the source.
    pub rows_read: usize,
    /// Number of rows dropped for a missing temperature.
    pub rows_dropped: usize,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    area: usize,
    date: usize,
    temperature: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> PipelineResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            area: find(AREA_COLUMN)?,
            date: find(DATE_COLUMN)?,
            temperature: find(TEMPERATURE_COLUMN)?,
        })
    }
}

/// Loader turning raw rows into validated observations.
pub struct RecordLoader {
    config: LoadConfig,
}

impl RecordLoader {
    /// Create a new loader.
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Load observations from a CSV file.
    pub fn load_path(&self, path: &Path) -> PipelineResult<LoadedObservations> {
        info!("Loading observations from {}", path.display());
        let file = File::open(path)?;
        self.load_reader(file)
    }

    /// Load observations from any CSV reader.
    pub fn load_reader<R: Read>(&self, reader: R) -> PipelineResult<LoadedObservations> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = ColumnIndex::resolve(reader.headers()?)?;

        let mut loaded = LoadedObservations::default();
        let mut seen: HashSet<(City, NaiveDate)> = HashSet::new();

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => return Err(field_count_error(&e).unwrap_or_else(|| e.into())),
            };
            let row = record.position().map(|p| p.line()).unwrap_or(0);
            loaded.rows_read += 1;

            let field = |index: usize| record.get(index).unwrap_or("");

            let raw_area = field(columns.area);
            let area = raw_area
                .parse::<City>()
                .map_err(|_| PipelineError::format(row, format!("unknown area '{}'", raw_area)))?;

            let raw_date = field(columns.date);
            let date = parse_date(raw_date).ok_or_else(|| {
                PipelineError::format(row, format!("unparsable date '{}'", raw_date))
            })?;

            let raw_temperature = field(columns.temperature);
            let Some(temperature_c) = self.parse_temperature(row, raw_temperature)? else {
                debug!("Dropping row {} ({} {}): missing temperature", row, area, date);
                loaded.rows_dropped += 1;
                continue;
            };

            if !seen.insert((area, date)) {
                return Err(PipelineError::format(
                    row,
                    format!("duplicate observation for {} on {}", area, date),
                ));
            }

            loaded.observations.push(Observation {
                area,
                date,
                temperature_c,
            });
        }

        info!(
            "Loaded {} observations ({} rows read, {} dropped as missing)",
            loaded.observations.len(),
            loaded.rows_read,
            loaded.rows_dropped
        );

        Ok(loaded)
    }

    /// Parse a temperature cell. `Ok(None)` means the reading is missing.
    fn parse_temperature(&self, row: u64, raw: &str) -> PipelineResult<Option<f64>> {
        if is_null_marker(raw) {
            return Ok(None);
        }

        let value: f64 = raw
            .parse()
            .map_err(|_| PipelineError::format(row, format!("unparsable temperature '{}'", raw)))?;

        if value.is_nan() {
            return Ok(None);
        }
        if value.is_infinite() {
            return Err(PipelineError::format(
                row,
                format!("non-finite temperature '{}'", raw),
            ));
        }
        if value <= self.config.sentinel_threshold.max(DEFAULT_SENTINEL_THRESHOLD) {
            return Ok(None);
        }

        Ok(Some(value))
    }
}

/// Rows with the wrong number of fields fail as that row's format error.
fn field_count_error(error: &csv::Error) -> Option<PipelineError> {
    match error.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => Some(PipelineError::format(
            pos.as_ref().map(|p| p.line()).unwrap_or(0),
            format!("expected {} fields, found {}", expected_len, len),
        )),
        _ => None,
    }
}

/// Blank cells and the usual null spellings.
fn is_null_marker(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "" | "na" | "n/a" | "<na>" | "nan" | "null" | "none"
    )
}

/// Parse an ISO date, with or without a midnight time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> PipelineResult<LoadedObservations> {
        RecordLoader::new(LoadConfig::default()).load_reader(csv.as_bytes())
    }

    #[test]
    fn test_load_valid_rows() {
        let loaded = load(
            "Area,Date,Temperature_C\n\
             Mumbai,2024-06-15,32.0\n\
             Dubai,2024-06-15,40.0\n",
        )
        .unwrap();

        assert_eq!(loaded.rows_read, 2);
        assert_eq!(loaded.rows_dropped, 0);
        assert_eq!(loaded.observations.len(), 2);
        assert_eq!(loaded.observations[0].area, City::Mumbai);
        assert_eq!(
            loaded.observations[1].date,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
        assert_eq!(loaded.observations[1].temperature_c, 40.0);
    }

    #[test]
    fn test_sentinel_rows_dropped() {
        let loaded = load(
            "Area,Date,Temperature_C\n\
             Mumbai,2024-06-15,-999\n\
             Mumbai,2024-06-16,-900\n\
             Mumbai,2024-06-17,-899.5\n\
             Mumbai,2024-06-18,31.0\n",
        )
        .unwrap();

        assert_eq!(loaded.rows_dropped, 2);
        assert_eq!(loaded.observations.len(), 2);
        assert!(loaded.observations.iter().all(|o| o.temperature_c > -900.0));
    }

    #[test]
    fn test_blank_and_nan_dropped() {
        let loaded = load(
            "Area,Date,Temperature_C\n\
             London,2024-01-01,\n\
             London,2024-01-02,NaN\n\
             London,2024-01-03,NA\n\
             London,2024-01-04,5.5\n",
        )
        .unwrap();

        assert_eq!(loaded.rows_dropped, 3);
        assert_eq!(loaded.observations.len(), 1);
        assert_eq!(loaded.observations[0].temperature_c, 5.5);
    }

    #[test]
    fn test_unparsable_date_is_format_error() {
        let err = load(
            "Area,Date,Temperature_C\n\
             Mumbai,2024-06-15,32.0\n\
             Mumbai,15/06/2024,31.0\n",
        )
        .unwrap_err();

        match err {
            PipelineError::Format { row, message } => {
                assert_eq!(row, 3);
                assert!(message.contains("15/06/2024"));
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_unparsable_temperature_is_format_error() {
        let err = load("Area,Date,Temperature_C\nMumbai,2024-06-15,hot\n").unwrap_err();
        assert!(matches!(err, PipelineError::Format { row: 2, .. }));

        let err = load("Area,Date,Temperature_C\nMumbai,2024-06-15,inf\n").unwrap_err();
        assert!(matches!(err, PipelineError::Format { .. }));
    }

    #[test]
    fn test_unknown_area_is_format_error() {
        let err = load("Area,Date,Temperature_C\nAtlantis,2024-06-15,20.0\n").unwrap_err();
        assert!(matches!(err, PipelineError::Format { .. }));
    }

    #[test]
    fn test_duplicate_observation_rejected() {
        let err = load(
            "Area,Date,Temperature_C\n\
             Sydney,2024-02-01,25.0\n\
             Sydney,2024-02-01,26.0\n",
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Format { row: 3, .. }));
    }

    #[test]
    fn test_missing_column() {
        let err = load("Area,Date\nMumbai,2024-06-15\n").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "Temperature_C"));
    }

    #[test]
    fn test_extra_columns_and_datetime_dates() {
        let loaded = load(
            "Station, Area ,Date,Temperature_C\n\
             x,New York,2024-12-01 00:00:00,3.5\n\
             y,Singapore,2024-12-01T00:00:00,27.0\n",
        )
        .unwrap();

        assert_eq!(loaded.observations.len(), 2);
        assert_eq!(loaded.observations[0].area, City::NewYork);
        assert_eq!(
            loaded.observations[1].date,
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
    }

    #[test]
    fn test_empty_after_cleaning_is_ok() {
        let loaded = load("Area,Date,Temperature_C\nDubai,2024-06-15,-999\n").unwrap();
        assert!(loaded.observations.is_empty());
        assert_eq!(loaded.rows_dropped, 1);
    }

    #[test]
    fn test_custom_sentinel_threshold() {
        let loader = RecordLoader::new(LoadConfig {
            sentinel_threshold: -50.0,
        });
        let loaded = loader
            .load_reader("Area,Date,Temperature_C\nLondon,2024-01-01,-60\n".as_bytes())
            .unwrap();
        assert!(loaded.observations.is_empty());
    }

    #[test]
    fn test_threshold_below_sentinel_still_drops_sentinels() {
        let loader = RecordLoader::new(LoadConfig {
            sentinel_threshold: -2000.0,
        });
        let loaded = loader
            .load_reader(
                "Area,Date,Temperature_C\n\
                 Mumbai,2024-06-15,-999\n\
                 Mumbai,2024-06-16,30\n"
                    .as_bytes(),
            )
            .unwrap();

        assert_eq!(loaded.rows_dropped, 1);
        let temps: Vec<f64> = loaded.observations.iter().map(|o| o.temperature_c).collect();
        assert_eq!(temps, vec![30.0]);
    }

    #[test]
    fn test_short_row_is_format_error() {
        let err = load(
            "Area,Date,Temperature_C\n\
             Mumbai,2024-06-14,31.0\n\
             Mumbai,2024-06-15\n",
        )
        .unwrap_err();

        match err {
            PipelineError::Format { message, .. } => {
                assert!(message.contains("expected 3 fields, found 2"));
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_long_row_is_format_error() {
        let err = load("Area,Date,Temperature_C\nMumbai,2024-06-15,30.0,extra\n").unwrap_err();

        match err {
            PipelineError::Format { message, .. } => {
                assert!(message.contains("found 4"));
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }
}
