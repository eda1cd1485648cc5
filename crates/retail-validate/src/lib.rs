//! Quality gate for the retail pipeline.

mod checks;
mod dates;
mod gate;

pub use checks::{
    CheckOutcome, check_categories_exist, check_no_negative_prices, check_sale_dates_valid,
    check_stock_integrity,
};
pub use dates::parse_calendar_date;
pub use gate::{GateInput, GateReport, run_quality_gate};
