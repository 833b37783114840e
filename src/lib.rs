//! heatdash - Global Urban Heat Exposure pipeline
//!
//! Loads daily city temperatures, drops sentinel readings, derives the
//! season and heat exposure index of every observation, and computes the
//! aggregates and views behind the dashboard report.
//!
//! The enriched dataset is built once per source through
//! [`cache::DatasetCache`] and passed explicitly to the aggregator and
//! view functions in [`analysis`].

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod report;

pub use error::{PipelineError, PipelineResult};
