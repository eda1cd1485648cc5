//! Domain types shared across the retail pipeline crates.

pub mod aggregates;
pub mod error;
pub mod frame;

pub use aggregates::{COST_RATIO, CategoryAggregate, ProductAggregate, SalesBand};
pub use error::{PipelineError, Result};
pub use frame::SourceFrame;
