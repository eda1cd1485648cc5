//! Business metrics over the merged dataset.
//!
//! Numeric coercion here is deliberately lossy: unparseable or absent values
//! fall back to 0/0.0 so metrics are always computable. The Quality Gate
//! enforces strictness on the same fields separately; that asymmetry is
//! intentional and documented.

use std::collections::HashMap;

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::debug;

use retail_ingest::{any_to_f64, any_to_i64, any_to_string_non_empty};
use retail_model::{
    COST_RATIO, CategoryAggregate, PipelineError, ProductAggregate, Result, SalesBand,
};

/// Metrics engine output: the augmented merged frame plus typed aggregates.
#[derive(Debug, Clone)]
pub struct MetricsOutput {
    /// Merged dataset with coerced numeric columns and `is_critical_stock`.
    pub merged: DataFrame,
    /// Per-category totals, in first-appearance order.
    pub category_sales: Vec<CategoryAggregate>,
    /// Per-product aggregates, sorted descending by total quantity.
    pub product_sales: Vec<ProductAggregate>,
}

impl MetricsOutput {
    /// Render the category aggregates as a frame for the output writer.
    pub fn category_frame(&self) -> Result<DataFrame> {
        let categories: Vec<Option<String>> = self
            .category_sales
            .iter()
            .map(|a| a.category.clone())
            .collect();
        let totals: Vec<f64> = self.category_sales.iter().map(|a| a.total_sales).collect();
        let df = DataFrame::new(vec![
            Series::new("category".into(), categories).into(),
            Series::new("total_sales".into(), totals).into(),
        ])?;
        Ok(df)
    }

    /// Render the product aggregates as a frame for the output writer.
    pub fn product_frame(&self) -> Result<DataFrame> {
        let rows = &self.product_sales;
        let product_ids: Vec<Option<i64>> = rows.iter().map(|a| a.product_id).collect();
        let titles: Vec<Option<String>> = rows.iter().map(|a| a.title.clone()).collect();
        let categories: Vec<Option<String>> = rows.iter().map(|a| a.category.clone()).collect();
        let quantities: Vec<i64> = rows.iter().map(|a| a.total_quantity).collect();
        let avg_prices: Vec<f64> = rows.iter().map(|a| a.avg_price).collect();
        let revenues: Vec<f64> = rows.iter().map(|a| a.estimated_revenue).collect();
        let costs: Vec<f64> = rows.iter().map(|a| a.estimated_cost).collect();
        let profits: Vec<f64> = rows.iter().map(|a| a.estimated_profit).collect();
        let margins: Vec<f64> = rows.iter().map(|a| a.profit_margin).collect();
        let bands: Vec<&str> = rows.iter().map(|a| a.sales_category.as_str()).collect();
        let df = DataFrame::new(vec![
            Series::new("product_id".into(), product_ids).into(),
            Series::new("title".into(), titles).into(),
            Series::new("category".into(), categories).into(),
            Series::new("total_quantity".into(), quantities).into(),
            Series::new("avg_price".into(), avg_prices).into(),
            Series::new("estimated_revenue".into(), revenues).into(),
            Series::new("estimated_cost".into(), costs).into(),
            Series::new("estimated_profit".into(), profits).into(),
            Series::new("profit_margin".into(), margins).into(),
            Series::new("sales_category".into(), bands).into(),
        ])?;
        Ok(df)
    }
}

/// Resolve the first present column from a base name and its join-collision
/// variants (`<name>`, `<name>_sales`, `<name>_prod`).
fn resolve_column(df: &DataFrame, base: &str) -> Option<String> {
    let names = df.get_column_names_owned();
    for candidate in [base.to_string(), format!("{base}_sales"), format!("{base}_prod")] {
        if names.iter().any(|name| *name == candidate) {
            return Some(candidate);
        }
    }
    None
}

fn f64_column_or_default(df: &DataFrame, name: Option<&str>) -> Vec<f64> {
    let height = df.height();
    let Some(column) = name.and_then(|n| df.column(n).ok()) else {
        return vec![0.0; height];
    };
    (0..height)
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            any_to_f64(&value).unwrap_or(0.0)
        })
        .collect()
}

fn i64_column_or_default(df: &DataFrame, name: &str) -> Vec<i64> {
    let height = df.height();
    let Ok(column) = df.column(name) else {
        return vec![0; height];
    };
    (0..height)
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            // Truncating like the lossy coercion this stage promises.
            any_to_f64(&value).map(|v| v as i64).unwrap_or(0)
        })
        .collect()
}

fn optional_string_column(df: &DataFrame, name: Option<&str>) -> Vec<Option<String>> {
    let height = df.height();
    let Some(column) = name.and_then(|n| df.column(n).ok()) else {
        return vec![None; height];
    };
    (0..height)
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            any_to_string_non_empty(&value)
        })
        .collect()
}

fn optional_i64_column(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
    let height = df.height();
    let Ok(column) = df.column(name) else {
        return vec![None; height];
    };
    (0..height)
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            any_to_i64(&value)
        })
        .collect()
}

#[derive(Debug)]
struct ProductAccumulator {
    product_id: Option<i64>,
    title: Option<String>,
    category: Option<String>,
    total_quantity: i64,
    price_sum: f64,
    rows: usize,
}

/// Compute category and product aggregates plus the critical-stock flag.
///
/// Pure: the input frame is not mutated. Group iteration order is the first
/// appearance of each key, which keeps the float accumulation order, and
/// therefore the output bytes, reproducible for identical input.
pub fn compute_metrics(merged: &DataFrame) -> Result<MetricsOutput> {
    let height = merged.height();

    let price_column = resolve_column(merged, "price")
        .ok_or_else(|| PipelineError::schema("merged", "price"))?;
    let category_column = resolve_column(merged, "category");

    let prices = f64_column_or_default(merged, Some(price_column.as_str()));
    let quantities = i64_column_or_default(merged, "quantity");
    let current_stock = i64_column_or_default(merged, "current_stock");
    let min_stock = i64_column_or_default(merged, "min_stock");
    let categories = optional_string_column(merged, category_column.as_deref());
    let product_ids = optional_i64_column(merged, "product_id");
    let titles = optional_string_column(merged, resolve_column(merged, "title").as_deref());

    let critical: Vec<bool> = current_stock
        .iter()
        .zip(min_stock.iter())
        .map(|(current, min)| current < min)
        .collect();

    let mut out = merged.clone();
    out.with_column(Series::new("price".into(), prices.clone()))?;
    out.with_column(Series::new("quantity".into(), quantities.clone()))?;
    out.with_column(Series::new("current_stock".into(), current_stock))?;
    out.with_column(Series::new("min_stock".into(), min_stock))?;
    out.with_column(Series::new("is_critical_stock".into(), critical))?;

    // Category totals, null category in its own bucket.
    let mut category_sales: Vec<CategoryAggregate> = Vec::new();
    let mut category_slots: HashMap<Option<String>, usize> = HashMap::new();
    for idx in 0..height {
        let key = categories[idx].clone();
        let amount = prices[idx] * quantities[idx] as f64;
        match category_slots.get(&key) {
            Some(&slot) => category_sales[slot].total_sales += amount,
            None => {
                category_slots.insert(key.clone(), category_sales.len());
                category_sales.push(CategoryAggregate {
                    category: key,
                    total_sales: amount,
                });
            }
        }
    }

    // Product aggregates keyed on (product_id, title, category).
    let mut accumulators: Vec<ProductAccumulator> = Vec::new();
    let mut product_slots: HashMap<(Option<i64>, Option<String>, Option<String>), usize> =
        HashMap::new();
    for idx in 0..height {
        let key = (
            product_ids[idx],
            titles[idx].clone(),
            categories[idx].clone(),
        );
        match product_slots.get(&key) {
            Some(&slot) => {
                let accumulator = &mut accumulators[slot];
                accumulator.total_quantity += quantities[idx];
                accumulator.price_sum += prices[idx];
                accumulator.rows += 1;
            }
            None => {
                product_slots.insert(key.clone(), accumulators.len());
                accumulators.push(ProductAccumulator {
                    product_id: key.0,
                    title: key.1,
                    category: key.2,
                    total_quantity: quantities[idx],
                    price_sum: prices[idx],
                    rows: 1,
                });
            }
        }
    }

    let mut product_sales: Vec<ProductAggregate> = accumulators
        .into_iter()
        .map(|accumulator| {
            let avg_price = accumulator.price_sum / accumulator.rows as f64;
            let estimated_revenue = avg_price * accumulator.total_quantity as f64;
            let estimated_cost = estimated_revenue * COST_RATIO;
            let estimated_profit = estimated_revenue - estimated_cost;
            let profit_margin = if estimated_revenue > 0.0 {
                estimated_profit / estimated_revenue
            } else {
                0.0
            };
            ProductAggregate {
                product_id: accumulator.product_id,
                title: accumulator.title,
                category: accumulator.category,
                total_quantity: accumulator.total_quantity,
                avg_price,
                estimated_revenue,
                estimated_cost,
                estimated_profit,
                profit_margin,
                sales_category: SalesBand::from_total_quantity(accumulator.total_quantity),
            }
        })
        .collect();
    // Stable: ties keep first-appearance order.
    product_sales.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));

    debug!(
        rows = height,
        categories = category_sales.len(),
        products = product_sales.len(),
        "metrics computed"
    );

    Ok(MetricsOutput {
        merged: out,
        category_sales,
        product_sales,
    })
}
