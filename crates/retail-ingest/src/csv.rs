//! CSV loading with per-column type inference.
//!
//! Raw files are read with the `csv` crate and materialized as Polars frames.
//! A column becomes Int64 when every non-empty cell parses as an integer,
//! Float64 when every non-empty cell parses as a number, and String
//! otherwise. Empty cells become nulls.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use tracing::info;

use crate::values::{parse_f64, parse_i64};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Text,
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Int;
    let mut seen_value = false;
    for cell in cells {
        if cell.is_empty() {
            continue;
        }
        seen_value = true;
        match kind {
            ColumnKind::Int if parse_i64(cell).is_some() => {}
            ColumnKind::Int | ColumnKind::Float if parse_f64(cell).is_some() => {
                kind = ColumnKind::Float;
            }
            _ => return ColumnKind::Text,
        }
    }
    if seen_value { kind } else { ColumnKind::Text }
}

fn build_column(name: &str, cells: &[String]) -> Column {
    match infer_kind(cells.iter().map(String::as_str)) {
        ColumnKind::Int => {
            let values: Vec<Option<i64>> = cells.iter().map(|c| parse_i64(c)).collect();
            Series::new(name.into(), values).into()
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|c| parse_f64(c)).collect();
            Series::new(name.into(), values).into()
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|c| {
                    if c.is_empty() {
                        None
                    } else {
                        Some(c.clone())
                    }
                })
                .collect();
            Series::new(name.into(), values).into()
        }
    }
}

/// Load a local CSV file into a typed DataFrame.
///
/// Short records are padded with nulls; headers and cells are trimmed of
/// whitespace and BOM markers.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

    let mut cells_by_column: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.with_context(|| format!("read {}", path.display()))?;
        for (idx, column) in cells_by_column.iter_mut().enumerate() {
            column.push(record.get(idx).map(normalize_cell).unwrap_or_default());
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells_by_column.iter())
        .map(|(name, cells)| build_column(name, cells))
        .collect();
    let df = DataFrame::new(columns).with_context(|| format!("build frame {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "csv loaded"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("data.csv");
        std::fs::write(&path, contents).expect("write csv");
        (dir, path)
    }

    #[test]
    fn infers_int_float_and_text_columns() {
        let (_dir, path) = write_csv("a,b,c\n1,1.5,x\n2,2,y\n");
        let df = load_csv(&path).expect("load");
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("c").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn empty_cells_become_nulls() {
        let (_dir, path) = write_csv("a,b\n1,\n,2\n");
        let df = load_csv(&path).expect("load");
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn mixed_column_falls_back_to_text() {
        let (_dir, path) = write_csv("a\n1\nabc\n");
        let df = load_csv(&path).expect("load");
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn short_records_are_padded() {
        let (_dir, path) = write_csv("a,b\n1,2\n3\n");
        let df = load_csv(&path).expect("load");
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }
}
