//! Named dataset wrapper passed between pipeline stages.

use polars::prelude::DataFrame;

/// A dataset with its pipeline name and source provenance.
///
/// Wraps a Polars DataFrame with the dataset name used in logs and error
/// messages ("products", "sales", "inventory") and an optional source label
/// (file path or API URL) for traceability.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    /// Dataset name ("products", "sales", "inventory").
    pub name: String,
    /// The dataset contents.
    pub data: DataFrame,
    /// Where the data came from (file path or URL), when known.
    pub source: Option<String>,
}

impl SourceFrame {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Number of rows in the dataset.
    pub fn record_count(&self) -> usize {
        self.data.height()
    }
}
