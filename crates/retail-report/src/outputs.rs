//! Atomic file writers for pipeline outputs.
//!
//! Every artifact is written to a `.tmp` sibling first and renamed into
//! place, so a failed run never leaves a partial output file behind.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, SerWriter};
use tracing::info;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let tmp = temp_path(path);
    let file = File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    match write(file) {
        Ok(()) => {
            std::fs::rename(&tmp, path)
                .with_context(|| format!("rename into {}", path.display()))?;
            Ok(())
        }
        Err(error) => {
            let _ = std::fs::remove_file(&tmp);
            Err(error)
        }
    }
}

/// Write a frame as Parquet.
pub fn write_parquet(df: &DataFrame, path: &Path) -> Result<()> {
    write_atomic(path, |file| {
        ParquetWriter::new(file)
            .finish(&mut df.clone())
            .with_context(|| format!("write parquet {}", path.display()))?;
        Ok(())
    })?;
    info!(path = %path.display(), rows = df.height(), "parquet written");
    Ok(())
}

/// Write a frame as CSV with headers.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    write_atomic(path, |file| {
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut df.clone())
            .with_context(|| format!("write csv {}", path.display()))?;
        Ok(())
    })?;
    info!(path = %path.display(), rows = df.height(), "csv written");
    Ok(())
}

/// Write a text artifact (the Markdown report).
pub fn write_text(contents: &str, path: &Path) -> Result<()> {
    write_atomic(path, |mut file| {
        file.write_all(contents.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    })?;
    info!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("category".into(), vec!["a", "b"]).into(),
            Series::new("total_sales".into(), vec![10.0f64, 20.0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn csv_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample_frame(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("category,total_sales"));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn parquet_write_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/out.parquet");
        write_parquet(&sample_frame(), &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn text_write_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_text("# hello\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hello\n");
    }
}
