//! Library components for the retail pipeline CLI.

pub mod config;
pub mod context;
pub mod logging;
pub mod pipeline;
pub mod types;
