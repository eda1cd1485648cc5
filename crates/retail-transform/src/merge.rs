//! Sales + products + inventory merge.
//!
//! Left-joins sales onto normalized products, then onto inventory, keyed on
//! `product_id` with many-to-one cardinality enforced on the right side of
//! each join. The join is an explicit key-index + gather rather than a
//! library join so that sales row order and collision suffixing stay
//! deterministic. Unmatched keys produce nulls; surfacing gaps is the
//! Quality Gate's job.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{AnyValue, Column, DataFrame, DataType, NamedFrom, Series};
use tracing::debug;

use retail_ingest::{any_to_f64, any_to_i64, any_to_string};
use retail_model::{PipelineError, Result};

/// Merge the three datasets into one row per sale.
///
/// `products` is expected to be normalized (see [`crate::normalize_products`]).
/// Column collisions between sales and products become `<name>_sales` /
/// `<name>_prod`; inventory collisions get `_inv` on the inventory side.
/// `product_id` is never suffixed.
pub fn merge_datasets(
    products: &DataFrame,
    sales: &DataFrame,
    inventory: &DataFrame,
) -> Result<DataFrame> {
    let sales_keys = coerce_key_column(sales, "sales")?;
    let inventory_keys = coerce_key_column(inventory, "inventory")?;

    let product_index = key_index(products, "products")?;
    let inventory_index = index_from_keys(&inventory_keys, "inventory")?;

    let product_rows: Vec<Option<usize>> = sales_keys
        .iter()
        .map(|key| product_index.get(key).copied())
        .collect();
    let inventory_rows: Vec<Option<usize>> = sales_keys
        .iter()
        .map(|key| inventory_index.get(key).copied())
        .collect();

    let sales_names: BTreeSet<String> = column_names(sales).into_iter().collect();
    let collisions: BTreeSet<String> = column_names(products)
        .into_iter()
        .filter(|name| name != "product_id" && sales_names.contains(name))
        .collect();

    let mut columns: Vec<Column> = Vec::new();
    let mut used: BTreeSet<String> = BTreeSet::new();

    for column in sales.get_columns() {
        let name = column.name().to_string();
        if name == "product_id" {
            columns.push(Series::new("product_id".into(), sales_keys.clone()).into());
            used.insert(name);
        } else if collisions.contains(&name) {
            let renamed = format!("{name}_sales");
            let mut column = column.clone();
            column.rename(renamed.as_str().into());
            columns.push(column);
            used.insert(renamed);
        } else {
            columns.push(column.clone());
            used.insert(name);
        }
    }

    for column in products.get_columns() {
        let name = column.name().to_string();
        if name == "product_id" {
            continue;
        }
        let out_name = if collisions.contains(&name) {
            format!("{name}_prod")
        } else {
            name
        };
        columns.push(take_optional(column, &product_rows, &out_name));
        used.insert(out_name);
    }

    for column in inventory.get_columns() {
        let name = column.name().to_string();
        if name == "product_id" {
            continue;
        }
        let out_name = if used.contains(&name) {
            format!("{name}_inv")
        } else {
            name
        };
        columns.push(take_optional(column, &inventory_rows, &out_name));
        used.insert(out_name);
    }

    let merged = DataFrame::new(columns)?;
    debug!(
        rows = merged.height(),
        columns = merged.width(),
        "datasets merged"
    );
    Ok(merged)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Coerce a dataset's `product_id` column to integers, one value per row.
///
/// Missing column is a schema violation; any null or non-integer value is a
/// coercion error naming the offending row.
fn coerce_key_column(df: &DataFrame, dataset: &str) -> Result<Vec<i64>> {
    let column = df
        .column("product_id")
        .map_err(|_| PipelineError::schema(dataset, "product_id"))?;
    let mut keys = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let value = column.get(row).unwrap_or(AnyValue::Null);
        match any_to_i64(&value) {
            Some(key) => keys.push(key),
            None => {
                let rendered = match value {
                    AnyValue::Null => "null".to_string(),
                    other => any_to_string(&other),
                };
                return Err(PipelineError::TypeCoercion {
                    dataset: dataset.to_string(),
                    column: "product_id".to_string(),
                    row,
                    value: rendered,
                });
            }
        }
    }
    Ok(keys)
}

/// Build a unique key -> row index for the right side of a join.
///
/// Null or non-integer keys cannot match a coerced sales key and are
/// skipped; duplicates among the rest violate the many-to-one cardinality.
fn key_index(df: &DataFrame, dataset: &str) -> Result<BTreeMap<i64, usize>> {
    let column = df
        .column("product_id")
        .map_err(|_| PipelineError::schema(dataset, "product_id"))?;
    let mut index = BTreeMap::new();
    for row in 0..df.height() {
        let value = column.get(row).unwrap_or(AnyValue::Null);
        let Some(key) = any_to_i64(&value) else {
            continue;
        };
        if index.insert(key, row).is_some() {
            return Err(PipelineError::Cardinality {
                dataset: dataset.to_string(),
                key,
            });
        }
    }
    Ok(index)
}

fn index_from_keys(keys: &[i64], dataset: &str) -> Result<BTreeMap<i64, usize>> {
    let mut index = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        if index.insert(*key, row).is_some() {
            return Err(PipelineError::Cardinality {
                dataset: dataset.to_string(),
                key: *key,
            });
        }
    }
    Ok(index)
}

/// Gather rows from a right-side column by matched row index, keeping the
/// source dtype family. Unmatched rows become nulls.
fn take_optional(column: &Column, rows: &[Option<usize>], name: &str) -> Column {
    let cell = |row: usize| column.get(row).unwrap_or(AnyValue::Null);
    let dtype = column.dtype();
    if dtype.is_integer() {
        let values: Vec<Option<i64>> = rows
            .iter()
            .map(|row| row.and_then(|idx| any_to_i64(&cell(idx))))
            .collect();
        Series::new(name.into(), values).into()
    } else if dtype.is_float() {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|row| row.and_then(|idx| any_to_f64(&cell(idx))))
            .collect();
        Series::new(name.into(), values).into()
    } else if *dtype == DataType::Boolean {
        let values: Vec<Option<bool>> = rows
            .iter()
            .map(|row| {
                row.and_then(|idx| match cell(idx) {
                    AnyValue::Boolean(b) => Some(b),
                    _ => None,
                })
            })
            .collect();
        Series::new(name.into(), values).into()
    } else {
        let values: Vec<Option<String>> = rows
            .iter()
            .map(|row| {
                row.and_then(|idx| match cell(idx) {
                    AnyValue::Null => None,
                    other => Some(any_to_string(&other)),
                })
            })
            .collect();
        Series::new(name.into(), values).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize_products;

    fn products() -> DataFrame {
        DataFrame::new(vec![
            Series::new("product_id".into(), vec![1i64, 2]).into(),
            Series::new("title".into(), vec!["Mouse", "Keyboard"]).into(),
            Series::new("price".into(), vec![10.0f64, 25.0]).into(),
            Series::new("category".into(), vec!["peripherals", "peripherals"]).into(),
        ])
        .unwrap()
    }

    fn sales() -> DataFrame {
        DataFrame::new(vec![
            Series::new("sale_id".into(), vec![100i64, 101, 102]).into(),
            Series::new("product_id".into(), vec![2i64, 1, 2]).into(),
            Series::new("quantity".into(), vec![3i64, 2, 1]).into(),
        ])
        .unwrap()
    }

    fn inventory() -> DataFrame {
        DataFrame::new(vec![
            Series::new("product_id".into(), vec![1i64, 2]).into(),
            Series::new("current_stock".into(), vec![5i64, 1]).into(),
            Series::new("min_stock".into(), vec![2i64, 3]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn one_row_per_sale_in_input_order() {
        let merged = merge_datasets(&products(), &sales(), &inventory()).unwrap();
        assert_eq!(merged.height(), 3);
        let titles = merged.column("title").unwrap();
        let first = titles.get(0).unwrap();
        assert_eq!(any_to_string(&first), "Keyboard");
        let second = titles.get(1).unwrap();
        assert_eq!(any_to_string(&second), "Mouse");
    }

    #[test]
    fn missing_sales_key_column_is_schema_violation() {
        let no_key =
            DataFrame::new(vec![Column::from(Series::new("sale_id".into(), vec![1i64]))]).unwrap();
        let error = merge_datasets(&products(), &no_key, &inventory()).unwrap_err();
        assert!(matches!(
            error,
            PipelineError::SchemaViolation { ref dataset, ref column }
                if dataset == "sales" && column == "product_id"
        ));
    }

    #[test]
    fn non_integer_sales_key_is_coercion_error() {
        let bad = DataFrame::new(vec![
            Series::new("product_id".into(), vec!["1", "abc"]).into(),
            Series::new("quantity".into(), vec![1i64, 2]).into(),
        ])
        .unwrap();
        let error = merge_datasets(&products(), &bad, &inventory()).unwrap_err();
        assert!(matches!(
            error,
            PipelineError::TypeCoercion { row: 1, .. }
        ));
    }

    #[test]
    fn duplicate_product_key_is_cardinality_error() {
        let dup = DataFrame::new(vec![
            Series::new("product_id".into(), vec![1i64, 1]).into(),
            Series::new("title".into(), vec!["a", "b"]).into(),
        ])
        .unwrap();
        let error = merge_datasets(&dup, &sales(), &inventory()).unwrap_err();
        assert!(matches!(
            error,
            PipelineError::Cardinality { ref dataset, key: 1 } if dataset == "products"
        ));
    }

    #[test]
    fn unmatched_keys_fill_nulls_without_failing() {
        let one_product = DataFrame::new(vec![
            Series::new("product_id".into(), vec![1i64]).into(),
            Series::new("title".into(), vec!["Mouse"]).into(),
        ])
        .unwrap();
        let merged = merge_datasets(&one_product, &sales(), &inventory()).unwrap();
        // Sales rows 0 and 2 reference product 2, which is gone.
        assert_eq!(merged.column("title").unwrap().null_count(), 2);
    }

    #[test]
    fn product_collisions_get_sales_and_prod_suffixes() {
        let sales_with_category = DataFrame::new(vec![
            Series::new("product_id".into(), vec![1i64]).into(),
            Series::new("category".into(), vec!["from-sales"]).into(),
        ])
        .unwrap();
        let merged = merge_datasets(&products(), &sales_with_category, &inventory()).unwrap();
        let names = column_names(&merged);
        assert!(names.contains(&"category_sales".to_string()));
        assert!(names.contains(&"category_prod".to_string()));
        assert!(!names.contains(&"category".to_string()));
    }

    #[test]
    fn inventory_collisions_get_inv_suffix() {
        let sales_with_stock = DataFrame::new(vec![
            Series::new("product_id".into(), vec![1i64]).into(),
            Series::new("current_stock".into(), vec![99i64]).into(),
        ])
        .unwrap();
        let merged = merge_datasets(&products(), &sales_with_stock, &inventory()).unwrap();
        let names = column_names(&merged);
        assert!(names.contains(&"current_stock".to_string()));
        assert!(names.contains(&"current_stock_inv".to_string()));
        let kept = merged.column("current_stock").unwrap().get(0).unwrap();
        assert_eq!(any_to_i64(&kept), Some(99));
    }

    #[test]
    fn normalized_products_merge_end_to_end() {
        let raw = DataFrame::new(vec![
            Series::new("id".into(), vec![1i64, 2]).into(),
            Series::new("title".into(), vec!["Mouse", "Keyboard"]).into(),
            Series::new("price".into(), vec![10.0f64, 25.0]).into(),
            Series::new("category".into(), vec!["x", "y"]).into(),
        ])
        .unwrap();
        let normalized = normalize_products(&raw).unwrap();
        let merged = merge_datasets(&normalized, &sales(), &inventory()).unwrap();
        assert_eq!(merged.height(), 3);
        assert!(column_names(&merged).contains(&"price".to_string()));
    }
}
