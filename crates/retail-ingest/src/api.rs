//! Product download from the remote JSON API.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use serde_json::{Map, Value};
use tracing::info;

/// Fetch the product catalog from a JSON API endpoint.
///
/// Expects a top-level array of objects. Uses the blocking client; the
/// pipeline is single-threaded and a run either completes or aborts.
pub fn fetch_products(url: &str, timeout: Duration) -> Result<DataFrame> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("build http client")?;
    info!(url, "fetching products");
    let records: Vec<Map<String, Value>> = client
        .get(url)
        .send()
        .with_context(|| format!("request {url}"))?
        .error_for_status()
        .context("product api returned an error status")?
        .json()
        .context("decode product api response")?;
    let df = frame_from_json_records(&records)?;
    info!(rows = df.height(), "products fetched");
    Ok(df)
}

/// Build a DataFrame from an array of JSON objects.
///
/// Columns appear in first-seen order. All-integer columns become Int64,
/// numeric columns Float64, boolean columns Boolean; everything else
/// (including nested objects and arrays) is rendered as text.
pub fn frame_from_json_records(records: &[Map<String, Value>]) -> Result<DataFrame> {
    let mut order: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                order.push(key.clone());
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(order.len());
    for name in &order {
        let values: Vec<&Value> = records
            .iter()
            .map(|record| record.get(name).unwrap_or(&Value::Null))
            .collect();
        columns.push(json_column(name, &values));
    }
    DataFrame::new(columns).context("build products frame")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonKind {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_json_kind(values: &[&Value]) -> JsonKind {
    let mut kind: Option<JsonKind> = None;
    for value in values {
        let this = match value {
            Value::Null => continue,
            Value::Number(n) if n.as_i64().is_some() => JsonKind::Int,
            Value::Number(_) => JsonKind::Float,
            Value::Bool(_) => JsonKind::Bool,
            _ => JsonKind::Text,
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(k), t) if k == t => k,
            (Some(JsonKind::Int), JsonKind::Float) | (Some(JsonKind::Float), JsonKind::Int) => {
                JsonKind::Float
            }
            _ => return JsonKind::Text,
        });
    }
    kind.unwrap_or(JsonKind::Text)
}

fn json_column(name: &str, values: &[&Value]) -> Column {
    match infer_json_kind(values) {
        JsonKind::Int => {
            let cells: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
            Series::new(name.into(), cells).into()
        }
        JsonKind::Float => {
            let cells: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
            Series::new(name.into(), cells).into()
        }
        JsonKind::Bool => {
            let cells: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
            Series::new(name.into(), cells).into()
        }
        JsonKind::Text => {
            let cells: Vec<Option<String>> = values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            Series::new(name.into(), cells).into()
        }
    }
}
