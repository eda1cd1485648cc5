//! Source readers for the retail pipeline.
//!
//! Products come from a remote JSON API (or a local CSV override); sales and
//! inventory come from local CSV files. Both paths produce typed Polars
//! frames with inferred column types.

mod api;
mod csv;
mod values;

pub use api::{fetch_products, frame_from_json_records};
pub use csv::load_csv;
pub use values::{
    any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64,
    parse_i64,
};
