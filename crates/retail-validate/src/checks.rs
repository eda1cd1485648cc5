//! Individual quality checks.
//!
//! Each check is a single pass over one dataset. A check either passes with
//! a short detail line for the report, or fails the run: missing columns are
//! schema violations, bad values are quality violations carrying the count
//! or list of offending rows.

use std::collections::BTreeSet;

use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::info;

use retail_ingest::{any_to_f64, any_to_string_non_empty};
use retail_model::{PipelineError, Result};

use crate::dates::parse_calendar_date;

/// A passed check, with what it looked at.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub detail: String,
}

fn require_column<'a>(df: &'a DataFrame, dataset: &str, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::schema(dataset, name))
}

/// Products must carry a `price` column with no negative values.
pub fn check_no_negative_prices(products: &DataFrame) -> Result<CheckOutcome> {
    info!("check: no negative prices");
    let price = require_column(products, "products", "price")?;
    let mut negative = 0usize;
    for row in 0..products.height() {
        let value = price.get(row).unwrap_or(AnyValue::Null);
        if any_to_f64(&value).is_some_and(|v| v < 0.0) {
            negative += 1;
        }
    }
    if negative > 0 {
        return Err(PipelineError::quality(
            "no_negative_prices",
            format!("{negative} rows with negative price"),
        ));
    }
    Ok(CheckOutcome {
        name: "no_negative_prices",
        detail: format!("{} rows scanned", products.height()),
    })
}

/// Inventory `current_stock` must be integer-valued and non-negative.
///
/// Nulls count as 0 for the negativity check only; they do not fail the
/// integer check.
pub fn check_stock_integrity(inventory: &DataFrame) -> Result<CheckOutcome> {
    info!("check: stock integrity");
    let stock = require_column(inventory, "inventory", "current_stock")?;
    let mut non_integer = 0usize;
    let mut negative = 0usize;
    for row in 0..inventory.height() {
        let value = stock.get(row).unwrap_or(AnyValue::Null);
        if matches!(value, AnyValue::Null) {
            continue;
        }
        match any_to_f64(&value) {
            Some(v) if v.fract() == 0.0 => {
                if v < 0.0 {
                    negative += 1;
                }
            }
            // Fractional and non-numeric values both break integrity.
            _ => non_integer += 1,
        }
    }
    if non_integer > 0 {
        return Err(PipelineError::quality(
            "stock_integrity",
            format!("{non_integer} current_stock values are not integers"),
        ));
    }
    if negative > 0 {
        return Err(PipelineError::quality(
            "stock_integrity",
            format!("{negative} negative current_stock values"),
        ));
    }
    Ok(CheckOutcome {
        name: "stock_integrity",
        detail: format!("{} rows scanned", inventory.height()),
    })
}

fn category_set(df: &DataFrame, name: &str) -> BTreeSet<String> {
    let Ok(column) = df.column(name) else {
        return BTreeSet::new();
    };
    (0..df.height())
        .filter_map(|row| {
            let value = column.get(row).unwrap_or(AnyValue::Null);
            any_to_string_non_empty(&value)
        })
        .collect()
}

/// Every category referenced by sales must exist in the product catalog.
pub fn check_categories_exist(products: &DataFrame, sales: &DataFrame) -> Result<CheckOutcome> {
    info!("check: categories exist");
    require_column(products, "products", "category")?;
    let product_categories = category_set(products, "category");
    let sale_categories = category_set(sales, "category");
    let missing: Vec<String> = sale_categories
        .difference(&product_categories)
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::quality(
            "categories_exist",
            format!(
                "categories referenced by sales but absent from products: {}",
                missing.join(", ")
            ),
        ));
    }
    Ok(CheckOutcome {
        name: "categories_exist",
        detail: format!("{} sale categories checked", sale_categories.len()),
    })
}

/// Every `sale_date` value must parse as a calendar date. Nulls fail too.
pub fn check_sale_dates_valid(sales: &DataFrame) -> Result<CheckOutcome> {
    info!("check: sale dates valid");
    let dates = require_column(sales, "sales", "sale_date")?;
    let mut invalid = 0usize;
    for row in 0..sales.height() {
        let value = dates.get(row).unwrap_or(AnyValue::Null);
        let parsed = any_to_string_non_empty(&value)
            .and_then(|text| parse_calendar_date(&text));
        if parsed.is_none() {
            invalid += 1;
        }
    }
    if invalid > 0 {
        return Err(PipelineError::quality(
            "sale_dates_valid",
            format!("{invalid} invalid sale_date values"),
        ));
    }
    Ok(CheckOutcome {
        name: "sale_dates_valid",
        detail: format!("{} rows scanned", sales.height()),
    })
}
