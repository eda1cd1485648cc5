use thiserror::Error;

/// Error taxonomy for the pipeline core.
///
/// Schema, cardinality, and coercion errors abort the run immediately.
/// `Quality` failures are equally fatal but carry a human-readable detail
/// (row counts, offending values) for reporting.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{dataset}: missing required column '{column}'")]
    SchemaViolation { dataset: String, column: String },

    #[error("{dataset}: join key product_id={key} is not unique")]
    Cardinality { dataset: String, key: i64 },

    #[error("{dataset}: cannot coerce '{column}' to integer at row {row} (value: {value})")]
    TypeCoercion {
        dataset: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("quality check '{check}' failed: {detail}")]
    Quality { check: String, detail: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

impl PipelineError {
    pub fn schema(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaViolation {
            dataset: dataset.into(),
            column: column.into(),
        }
    }

    pub fn quality(check: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Quality {
            check: check.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
