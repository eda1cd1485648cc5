//! Per-run execution context.
//!
//! Everything a stage needs to locate its inputs and outputs travels in this
//! struct: the run date stamp and the resolved directories. No
//! working-directory-relative lookups or process-wide state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::PipelineConfig;

/// Resolved paths and the date stamp for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// UTC run date, `YYYY-MM-DD`, used in every output file name.
    pub run_date: String,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub outputs_dir: PathBuf,
}

impl RunContext {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            run_date: Utc::now().format("%Y-%m-%d").to_string(),
            raw_dir: config.processing.raw_path.clone(),
            processed_dir: config.processing.output_path.clone(),
            outputs_dir: config.processing.outputs_path.clone(),
        }
    }

    /// Override the date stamp (tests need deterministic file names).
    #[must_use]
    pub fn with_run_date(mut self, run_date: impl Into<String>) -> Self {
        self.run_date = run_date.into();
        self
    }

    /// Redirect all output directories under one root.
    #[must_use]
    pub fn under_root(mut self, root: &Path) -> Self {
        self.raw_dir = root.join("raw");
        self.processed_dir = root.join("processed");
        self.outputs_dir = root.join("outputs");
        self
    }

    /// Create the output directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.raw_dir, &self.processed_dir, &self.outputs_dir] {
            std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn raw_snapshot_path(&self, dataset: &str) -> PathBuf {
        self.raw_dir
            .join(format!("{dataset}_{}.parquet", self.run_date))
    }

    pub fn merged_path(&self) -> PathBuf {
        self.processed_dir
            .join(format!("merged_{}.parquet", self.run_date))
    }

    pub fn category_sales_path(&self) -> PathBuf {
        self.outputs_dir
            .join(format!("category_sales_{}.csv", self.run_date))
    }

    pub fn product_sales_path(&self) -> PathBuf {
        self.outputs_dir
            .join(format!("product_sales_{}.csv", self.run_date))
    }

    pub fn report_path(&self) -> PathBuf {
        self.outputs_dir.join(format!("report_{}.md", self.run_date))
    }
}
