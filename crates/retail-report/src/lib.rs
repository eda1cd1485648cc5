//! Output generation for the retail pipeline.
//!
//! Parquet for the raw snapshots and the merged dataset, CSV for the
//! aggregates, Markdown for the human-readable run report. All writers are
//! atomic (temp file + rename).

mod outputs;
mod report;

pub use outputs::{write_csv, write_parquet, write_text};
pub use report::render_report;
