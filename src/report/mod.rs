//! Report assembly, rendering and CSV export.

pub mod dashboard;
pub mod export;
pub mod generator;

pub use dashboard::{build_report, ReportRequest};
pub use export::{export_to_dir, EXPORT_FILENAME};
pub use generator::{generate_json_report, generate_markdown_report, write_report};
