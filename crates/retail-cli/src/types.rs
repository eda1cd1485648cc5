use std::path::PathBuf;

use retail_model::ProductAggregate;

/// Result of a full pipeline run, for the terminal summary and exit code.
#[derive(Debug)]
pub struct RunSummary {
    pub run_date: String,
    pub merged_rows: usize,
    pub categories: usize,
    pub products: usize,
    /// Rows in the merged dataset flagged as critical stock.
    pub critical_rows: usize,
    /// Names of the quality checks that passed, in execution order.
    pub checks_passed: Vec<String>,
    /// Category backfill status line from the quality gate.
    pub backfill: String,
    /// Top products by quantity, at most five.
    pub top_products: Vec<ProductAggregate>,
    /// Files written this run, empty on a dry run.
    pub outputs: Vec<PathBuf>,
    pub dry_run: bool,
}
