//! Error taxonomy for the pipeline.

/// Errors raised by the loader, aggregator and view filter.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A source row could not be parsed. `row` is the 1-indexed line in the source.
    #[error("Format error at row {row}: {message}")]
    Format { row: u64, message: String },

    /// A required column is absent from the source header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The requested city is not one of the tracked cities.
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// Aggregation was requested over zero valid records.
    #[error("Dataset is empty: no valid observations to aggregate")]
    EmptyDataset,

    /// Reading or writing the CSV stream failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn format(row: u64, message: impl Into<String>) -> Self {
        PipelineError::Format {
            row,
            message: message.into(),
        }
    }
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
