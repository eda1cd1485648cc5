//! YAML pipeline configuration.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level pipeline configuration, loaded from a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub api: ApiConfig,
    pub data_sources: DataSources,
    pub processing: ProcessingConfig,
}

/// Product API endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Local input file locations.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSources {
    pub sales_file: PathBuf,
    pub inventory_file: PathBuf,
    /// Optional local products CSV; when set, the API fetch is skipped.
    #[serde(default)]
    pub products_file: Option<PathBuf>,
}

/// Output directory layout.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Directory for the merged Parquet dataset.
    pub output_path: PathBuf,
    /// Directory for aggregate CSVs and the report.
    #[serde(default = "default_outputs_path")]
    pub outputs_path: PathBuf,
    /// Directory for raw input snapshots.
    #[serde(default = "default_raw_path")]
    pub raw_path: PathBuf,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_outputs_path() -> PathBuf {
    PathBuf::from("data/outputs")
}

fn default_raw_path() -> PathBuf {
    PathBuf::from("data/raw")
}

/// Load and parse the pipeline configuration.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let file = File::open(path).with_context(|| format!("open config {}", path.display()))?;
    serde_yaml::from_reader(file).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let yaml = "\
api:
  url: https://example.test/products
data_sources:
  sales_file: data/sales.csv
  inventory_file: data/inventory.csv
processing:
  output_path: data/processed
";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.data_sources.products_file.is_none());
        assert_eq!(config.processing.outputs_path, PathBuf::from("data/outputs"));
        assert_eq!(config.processing.raw_path, PathBuf::from("data/raw"));
    }

    #[test]
    fn explicit_values_win_over_defaults() {
        let yaml = "\
api:
  url: https://example.test/products
  timeout_secs: 5
data_sources:
  sales_file: s.csv
  inventory_file: i.csv
  products_file: p.csv
processing:
  output_path: out
  outputs_path: reports
  raw_path: raw
";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.data_sources.products_file,
            Some(PathBuf::from("p.csv"))
        );
        assert_eq!(config.processing.outputs_path, PathBuf::from("reports"));
        assert_eq!(config.processing.raw_path, PathBuf::from("raw"));
    }
}
