//! Pipeline core: normalization, merging, and business metrics.
//!
//! Every function here is pure with respect to its inputs: frames are taken
//! by reference and new frames are returned. I/O and configuration live in
//! the surrounding crates.

mod backfill;
mod merge;
mod metrics;
mod normalize;

pub use backfill::{BackfillOutcome, backfill_sales_category};
pub use merge::merge_datasets;
pub use metrics::{MetricsOutput, compute_metrics};
pub use normalize::{PRODUCT_COLUMNS, normalize_products};
