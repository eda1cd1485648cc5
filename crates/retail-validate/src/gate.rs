//! The fail-closed quality gate.
//!
//! Checks run in a fixed sequence and the first failure aborts the run;
//! output generation never happens once the gate has rejected a batch.

use polars::prelude::DataFrame;
use tracing::info;

use retail_model::Result;
use retail_transform::{BackfillOutcome, backfill_sales_category};

use crate::checks::{
    CheckOutcome, check_categories_exist, check_no_negative_prices, check_sale_dates_valid,
    check_stock_integrity,
};

/// Datasets the gate inspects.
///
/// The product checks run against `raw_products`, the frame as it arrived
/// from its source: normalization guarantees `price` and `category` columns
/// exist, so checking the normalized frame would let a catalog that never
/// carried them slip through. The normalized frame is still needed for the
/// category backfill, where the guaranteed columns are the point.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    /// Products as ingested, before normalization.
    pub raw_products: &'a DataFrame,
    /// Products after normalization, used for the backfill join.
    pub products: &'a DataFrame,
    pub sales: &'a DataFrame,
    pub inventory: &'a DataFrame,
}

/// Record of a gate run that passed: every check outcome plus the category
/// backfill status, for the run summary.
#[derive(Debug, Clone)]
pub struct GateReport {
    pub checks: Vec<CheckOutcome>,
    pub backfill: String,
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names_owned().iter().any(|c| c == name)
}

/// Run the quality gate.
///
/// Order is fixed: prices and stock run unconditionally; the category check
/// runs against sales enriched by the best-effort backfill; the date check
/// runs only when sales carries a `sale_date` column.
pub fn run_quality_gate(input: GateInput<'_>) -> Result<GateReport> {
    let mut checks = Vec::new();

    checks.push(check_no_negative_prices(input.raw_products)?);
    checks.push(check_stock_integrity(input.inventory)?);

    let backfill = backfill_sales_category(input.sales, input.products);
    let backfill_status = backfill.describe();
    let sales = match &backfill {
        BackfillOutcome::Applied(enriched) => enriched,
        BackfillOutcome::AlreadyPresent | BackfillOutcome::Skipped { .. } => input.sales,
    };

    checks.push(check_categories_exist(input.raw_products, sales)?);

    if has_column(sales, "sale_date") {
        checks.push(check_sale_dates_valid(sales)?);
    } else {
        info!("sales has no sale_date column, date check skipped");
    }

    info!(
        checks = checks.len(),
        backfill = %backfill_status,
        "quality gate passed"
    );
    Ok(GateReport {
        checks,
        backfill: backfill_status,
    })
}
