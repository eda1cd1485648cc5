//! Pipeline orchestration with explicit stages.
//!
//! The run follows these stages in order:
//! 1. **Ingest**: fetch products from the API, read sales and inventory CSVs
//! 2. **Snapshot**: persist raw inputs as dated Parquet files
//! 3. **Transform**: normalize products, merge datasets, compute metrics
//! 4. **Gate**: run the quality checks; any failure aborts the run
//! 5. **Output**: write the merged dataset, aggregate CSVs, and the report
//!
//! Each stage takes the output of the previous stage and returns typed
//! results. All paths and the date stamp come from the [`RunContext`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use polars::prelude::AnyValue;
use tracing::{info, info_span};

use retail_ingest::{fetch_products, load_csv};
use retail_model::SourceFrame;
use retail_report::{render_report, write_csv, write_parquet, write_text};
use retail_transform::{MetricsOutput, compute_metrics, merge_datasets, normalize_products};
use retail_validate::{GateInput, GateReport, run_quality_gate};

use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::types::RunSummary;

/// Raw datasets as read from their sources.
#[derive(Debug)]
pub struct IngestResult {
    pub products: SourceFrame,
    pub sales: SourceFrame,
    pub inventory: SourceFrame,
}

/// Read all three datasets.
///
/// Products come from the configured API endpoint, or from a local CSV when
/// `data_sources.products_file` is set. Sales and inventory are always local
/// CSV files.
pub fn ingest(config: &PipelineConfig) -> Result<IngestResult> {
    let products = match &config.data_sources.products_file {
        Some(path) => {
            let data = load_csv(path)?;
            SourceFrame::new("products", data).with_source(path.display().to_string())
        }
        None => {
            let timeout = Duration::from_secs(config.api.timeout_secs);
            let data = fetch_products(&config.api.url, timeout)?;
            SourceFrame::new("products", data).with_source(config.api.url.clone())
        }
    };
    let sales = SourceFrame::new("sales", load_csv(&config.data_sources.sales_file)?)
        .with_source(config.data_sources.sales_file.display().to_string());
    let inventory = SourceFrame::new("inventory", load_csv(&config.data_sources.inventory_file)?)
        .with_source(config.data_sources.inventory_file.display().to_string());
    Ok(IngestResult {
        products,
        sales,
        inventory,
    })
}

/// Persist the raw inputs as dated Parquet snapshots.
pub fn snapshot_raw(ctx: &RunContext, ingested: &IngestResult) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for frame in [&ingested.products, &ingested.sales, &ingested.inventory] {
        let path = ctx.raw_snapshot_path(&frame.name);
        write_parquet(&frame.data, &path)
            .with_context(|| format!("snapshot {}", frame.name))?;
        paths.push(path);
    }
    Ok(paths)
}

/// Transformed datasets: normalized products plus the computed metrics.
#[derive(Debug)]
pub struct TransformResult {
    /// Products after schema normalization; the gate checks these.
    pub products: polars::prelude::DataFrame,
    pub metrics: MetricsOutput,
}

/// Normalize, merge, and compute metrics.
pub fn transform(ingested: &IngestResult) -> Result<TransformResult> {
    let products = normalize_products(&ingested.products.data)?;
    let merged = merge_datasets(&products, &ingested.sales.data, &ingested.inventory.data)?;
    let metrics = compute_metrics(&merged)?;
    Ok(TransformResult { products, metrics })
}

/// Run the quality gate.
///
/// The product checks see the dataset as ingested, so a catalog missing
/// `price` or `category` fails here instead of being papered over by the
/// null columns normalization adds. The normalized frame drives the
/// category backfill.
pub fn validate(ingested: &IngestResult, transformed: &TransformResult) -> Result<GateReport> {
    let report = run_quality_gate(GateInput {
        raw_products: &ingested.products.data,
        products: &transformed.products,
        sales: &ingested.sales.data,
        inventory: &ingested.inventory.data,
    })?;
    Ok(report)
}

/// Write the merged dataset, the aggregate CSVs, and the Markdown report.
pub fn output(ctx: &RunContext, metrics: &MetricsOutput) -> Result<Vec<PathBuf>> {
    let merged_path = ctx.merged_path();
    write_parquet(&metrics.merged, &merged_path).context("write merged dataset")?;

    let category_path = ctx.category_sales_path();
    write_csv(&metrics.category_frame()?, &category_path).context("write category sales")?;

    let product_path = ctx.product_sales_path();
    write_csv(&metrics.product_frame()?, &product_path).context("write product sales")?;

    let report_path = ctx.report_path();
    write_text(&render_report(&ctx.run_date, metrics), &report_path).context("write report")?;

    Ok(vec![merged_path, category_path, product_path, report_path])
}

fn critical_row_count(metrics: &MetricsOutput) -> usize {
    let Ok(column) = metrics.merged.column("is_critical_stock") else {
        return 0;
    };
    (0..metrics.merged.height())
        .filter(|&idx| matches!(column.get(idx), Ok(AnyValue::Boolean(true))))
        .count()
}

/// Execute a full run. On a dry run, every stage executes but nothing is
/// written to disk.
pub fn execute_run(config: &PipelineConfig, ctx: &RunContext, dry_run: bool) -> Result<RunSummary> {
    let mut outputs = Vec::new();

    let ingest_span = info_span!("ingest");
    let ingest_start = Instant::now();
    let ingested = ingest_span.in_scope(|| ingest(config))?;
    info!(
        products = ingested.products.record_count(),
        sales = ingested.sales.record_count(),
        inventory = ingested.inventory.record_count(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    if !dry_run {
        let snapshot_span = info_span!("snapshot");
        outputs.extend(snapshot_span.in_scope(|| snapshot_raw(ctx, &ingested))?);
    }

    let transform_span = info_span!("transform");
    let transform_start = Instant::now();
    let transformed = transform_span.in_scope(|| transform(&ingested))?;
    info!(
        merged_rows = transformed.metrics.merged.height(),
        categories = transformed.metrics.category_sales.len(),
        products = transformed.metrics.product_sales.len(),
        duration_ms = transform_start.elapsed().as_millis(),
        "transform complete"
    );

    let gate_span = info_span!("quality_gate");
    let gate = gate_span.in_scope(|| validate(&ingested, &transformed))?;

    if !dry_run {
        let output_span = info_span!("output");
        let output_start = Instant::now();
        outputs.extend(output_span.in_scope(|| output(ctx, &transformed.metrics))?);
        info!(
            files = outputs.len(),
            duration_ms = output_start.elapsed().as_millis(),
            "outputs written"
        );
    } else {
        info!("dry run, no files written");
    }

    let metrics = transformed.metrics;
    Ok(RunSummary {
        run_date: ctx.run_date.clone(),
        merged_rows: metrics.merged.height(),
        categories: metrics.category_sales.len(),
        products: metrics.product_sales.len(),
        critical_rows: critical_row_count(&metrics),
        checks_passed: gate.checks.iter().map(|c| c.name.to_string()).collect(),
        backfill: gate.backfill,
        top_products: metrics.product_sales.into_iter().take(5).collect(),
        outputs,
        dry_run,
    })
}
