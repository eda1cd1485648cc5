//! Product dataset normalization.
//!
//! Canonicalizes the key column name and guarantees the required columns
//! before the merge: `product_id`, `title`, `price`, `category`. Missing
//! columns are filled with nulls and `price` is rebuilt as Float64, with
//! non-numeric values silently becoming null. Strictness on those values is
//! the Quality Gate's job, not this stage's.

use polars::prelude::{AnyValue, DataFrame, DataType, NamedFrom, Series};

use retail_ingest::any_to_f64;
use retail_model::Result;

/// Columns every normalized product frame carries.
pub const PRODUCT_COLUMNS: [&str; 4] = ["product_id", "title", "price", "category"];

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names_owned().iter().any(|c| c == name)
}

/// Normalize a raw product dataset. The input frame is not mutated.
pub fn normalize_products(products: &DataFrame) -> Result<DataFrame> {
    let mut df = products.clone();
    let height = df.height();

    if has_column(&df, "id") && !has_column(&df, "product_id") {
        df.rename("id", "product_id".into())?;
    }

    for name in PRODUCT_COLUMNS {
        if has_column(&df, name) {
            continue;
        }
        let dtype = match name {
            "product_id" => DataType::Int64,
            "price" => DataType::Float64,
            _ => DataType::String,
        };
        df.with_column(Series::full_null(name.into(), height, &dtype))?;
    }

    let price = df.column("price")?;
    let mut values: Vec<Option<f64>> = Vec::with_capacity(height);
    for idx in 0..height {
        let value = price.get(idx).unwrap_or(AnyValue::Null);
        values.push(any_to_f64(&value));
    }
    df.with_column(Series::new("price".into(), values))?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn renames_id_to_product_id() {
        let df = DataFrame::new(vec![
            Series::new("id".into(), vec![1i64, 2]).into(),
            Series::new("title".into(), vec!["a", "b"]).into(),
        ])
        .unwrap();
        let normalized = normalize_products(&df).unwrap();
        assert!(has_column(&normalized, "product_id"));
        assert!(!has_column(&normalized, "id"));
    }

    #[test]
    fn fills_missing_columns_with_nulls() {
        let df = DataFrame::new(vec![Column::from(Series::new(
            "product_id".into(),
            vec![1i64],
        ))])
        .unwrap();
        let normalized = normalize_products(&df).unwrap();
        for name in PRODUCT_COLUMNS {
            assert!(has_column(&normalized, name), "missing {name}");
        }
        assert_eq!(normalized.column("price").unwrap().null_count(), 1);
        assert_eq!(normalized.column("category").unwrap().null_count(), 1);
    }

    #[test]
    fn non_numeric_price_becomes_null_not_error() {
        let df = DataFrame::new(vec![
            Series::new("product_id".into(), vec![1i64, 2]).into(),
            Series::new("price".into(), vec!["19.99", "n/a"]).into(),
        ])
        .unwrap();
        let normalized = normalize_products(&df).unwrap();
        let price = normalized.column("price").unwrap();
        assert_eq!(price.dtype(), &DataType::Float64);
        assert_eq!(price.null_count(), 1);
        assert_eq!(price.get(0).unwrap(), AnyValue::Float64(19.99));
    }

    #[test]
    fn input_frame_is_untouched() {
        let df = DataFrame::new(vec![Column::from(Series::new("id".into(), vec![1i64]))]).unwrap();
        let _ = normalize_products(&df).unwrap();
        assert!(has_column(&df, "id"));
    }
}
