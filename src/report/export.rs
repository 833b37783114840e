//! CSV re-export of the enriched dataset.

use crate::error::PipelineResult;
use crate::models::{City, EnrichedDataset, Season};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name offered for the downloadable dataset.
pub const EXPORT_FILENAME: &str = "global_urban_heat_daily_temperature_2024_2025.csv";

/// Header row of the exported CSV, in `ExportRow` field order.
pub const EXPORT_COLUMNS: [&str; 6] = [
    "Area",
    "Date",
    "Temperature_C",
    "Month",
    "Season",
    "Heat_Exposure_Index",
];

#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(rename = "Area")]
    area: City,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Temperature_C")]
    temperature_c: f64,
    #[serde(rename = "Month")]
    month: u32,
    #[serde(rename = "Season")]
    season: Season,
    #[serde(rename = "Heat_Exposure_Index")]
    heat_exposure_index: f64,
}

/// Write the enriched dataset as CSV to any writer.
pub fn write_csv<W: Write>(dataset: &EnrichedDataset, writer: W) -> PipelineResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(EXPORT_COLUMNS)?;

    for record in dataset.records() {
        csv_writer.serialize(ExportRow {
            area: record.area,
            date: record.date,
            temperature_c: record.temperature_c,
            month: record.month,
            season: record.season,
            heat_exposure_index: record.heat_exposure_index,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render the enriched dataset as a CSV string.
pub fn export_to_string(dataset: &EnrichedDataset) -> PipelineResult<String> {
    let mut buffer = Vec::new();
    write_csv(dataset, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the enriched dataset to `dir/EXPORT_FILENAME`, returning the path written.
pub fn export_to_dir(dataset: &EnrichedDataset, dir: &Path) -> PipelineResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILENAME);

    write_csv(dataset, File::create(&path)?)?;
    info!("Exported {} records to {}", dataset.len(), path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::build_dataset;
    use crate::loader::{LoadConfig, RecordLoader};
    use crate::models::Observation;
    use tempfile::TempDir;

    fn dataset() -> EnrichedDataset {
        build_dataset(&[
            Observation {
                area: City::NewYork,
                date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                temperature_c: 28.5,
            },
            Observation {
                area: City::NewYork,
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                temperature_c: 1.5,
            },
        ])
    }

    #[test]
    fn test_export_columns_and_values() {
        let csv = export_to_string(&dataset()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("Area,Date,Temperature_C,Month,Season,Heat_Exposure_Index")
        );
        assert_eq!(lines.next(), Some("New York,2024-07-01,28.5,7,Summer,13.5"));
        assert_eq!(lines.next(), Some("New York,2024-01-01,1.5,1,Winter,-13.5"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_reloads_to_same_observations() {
        let original = dataset();
        let csv = export_to_string(&original).unwrap();

        let reloaded = RecordLoader::new(LoadConfig::default())
            .load_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(build_dataset(&reloaded.observations), original);
    }

    #[test]
    fn test_export_to_dir_uses_fixed_name() {
        let dir = TempDir::new().unwrap();
        let path = export_to_dir(&dataset(), &dir.path().join("out")).unwrap();

        assert!(path.ends_with(EXPORT_FILENAME));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("Area,Date,"));
    }

    #[test]
    fn test_export_empty_dataset_keeps_header() {
        let csv = export_to_string(&EnrichedDataset::default()).unwrap();
        assert_eq!(csv, format!("{}\n", EXPORT_COLUMNS.join(",")));

        let reloaded = RecordLoader::new(LoadConfig::default())
            .load_reader(csv.as_bytes())
            .unwrap();
        assert!(reloaded.observations.is_empty());
        assert_eq!(reloaded.rows_read, 0);
    }
}
