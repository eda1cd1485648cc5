//! End-to-end tests driving a full pipeline run from local fixtures.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use retail_cli::config::{PipelineConfig, load_config};
use retail_cli::context::RunContext;
use retail_cli::pipeline::execute_run;

fn write_fixture(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Three products, three sales rows, one understocked item. Sales carry no
/// category column so the gate's backfill kicks in.
fn setup(dir: &Path) -> PipelineConfig {
    write_fixture(
        dir,
        "products.csv",
        "product_id,title,price,category\n\
         1,Mouse,10.0,electronics\n\
         2,Keyboard,25.5,electronics\n\
         3,Desk,99.9,furniture\n",
    );
    write_fixture(
        dir,
        "sales.csv",
        "sale_id,product_id,quantity,price,sale_date\n\
         100,1,2,10.0,2024-05-01\n\
         101,2,1,25.5,2024-05-01\n\
         102,1,1,10.0,2024-05-02\n",
    );
    write_fixture(
        dir,
        "inventory.csv",
        "product_id,current_stock,min_stock\n\
         1,3,5\n\
         2,10,2\n\
         3,0,1\n",
    );
    let config_yaml = format!(
        "api:\n\
         \x20 url: http://unused.invalid/products\n\
         data_sources:\n\
         \x20 sales_file: {dir}/sales.csv\n\
         \x20 inventory_file: {dir}/inventory.csv\n\
         \x20 products_file: {dir}/products.csv\n\
         processing:\n\
         \x20 output_path: {dir}/data/processed\n",
        dir = dir.display()
    );
    write_fixture(dir, "pipeline.yaml", &config_yaml);
    load_config(&dir.join("pipeline.yaml")).unwrap()
}

fn context(config: &PipelineConfig, root: &Path) -> RunContext {
    let ctx = RunContext::new(config)
        .under_root(root)
        .with_run_date("2024-05-03");
    ctx.ensure_dirs().unwrap();
    ctx
}

#[test]
fn full_run_writes_all_outputs() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    let ctx = context(&config, &dir.path().join("out"));

    let summary = execute_run(&config, &ctx, false).unwrap();

    assert_eq!(summary.run_date, "2024-05-03");
    assert_eq!(summary.merged_rows, 3);
    assert_eq!(summary.categories, 1);
    assert_eq!(summary.products, 2);
    assert_eq!(summary.critical_rows, 2);
    assert_eq!(
        summary.checks_passed,
        vec![
            "no_negative_prices",
            "stock_integrity",
            "categories_exist",
            "sale_dates_valid",
        ]
    );
    assert_eq!(summary.backfill, "applied");
    assert!(!summary.dry_run);

    // Three raw snapshots plus merged, two aggregates, and the report.
    assert_eq!(summary.outputs.len(), 7);
    for path in &summary.outputs {
        assert!(path.exists(), "missing output {}", path.display());
    }

    let report = fs::read_to_string(ctx.report_path()).unwrap();
    assert!(report.starts_with("# Pipeline report 2024-05-03\n"));
    assert!(report.contains("- Total merged rows: 3\n"));
    assert!(report.contains("- Categories detected: 1\n"));
    assert!(report.contains("- Mouse (id:1): 3 units, estimated revenue: 30.00\n"));

    let categories = fs::read_to_string(ctx.category_sales_path()).unwrap();
    assert!(categories.starts_with("category,total_sales\n"));
    assert!(categories.contains("electronics,45.5"));

    let products = fs::read_to_string(ctx.product_sales_path()).unwrap();
    let mut lines = products.lines();
    assert_eq!(
        lines.next().unwrap(),
        "product_id,title,category,total_quantity,avg_price,estimated_revenue,\
         estimated_cost,estimated_profit,profit_margin,sales_category"
    );
    let first = lines.next().unwrap();
    assert!(first.starts_with("1,Mouse,electronics,3,"), "got {first}");
    assert!(first.ends_with(",bajas"), "got {first}");
}

#[test]
fn top_seller_metrics_follow_the_cost_model() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    let ctx = context(&config, &dir.path().join("out"));

    let summary = execute_run(&config, &ctx, false).unwrap();

    let top = &summary.top_products[0];
    assert_eq!(top.title.as_deref(), Some("Mouse"));
    assert_eq!(top.total_quantity, 3);
    assert!((top.avg_price - 10.0).abs() < 1e-9);
    assert!((top.estimated_revenue - 30.0).abs() < 1e-9);
    assert!((top.estimated_cost - 18.0).abs() < 1e-9);
    assert!((top.estimated_profit - 12.0).abs() < 1e-9);
    assert!((top.profit_margin - 0.4).abs() < 1e-9);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    let root = dir.path().join("out");
    let ctx = RunContext::new(&config)
        .under_root(&root)
        .with_run_date("2024-05-03");

    let summary = execute_run(&config, &ctx, true).unwrap();

    assert!(summary.dry_run);
    assert!(summary.outputs.is_empty());
    assert_eq!(summary.merged_rows, 3);
    assert!(!root.exists());
}

#[test]
fn negative_price_aborts_before_outputs() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    write_fixture(
        dir.path(),
        "products.csv",
        "product_id,title,price,category\n\
         1,Mouse,-10.0,electronics\n",
    );
    let ctx = context(&config, &dir.path().join("out"));

    let error = execute_run(&config, &ctx, false).unwrap_err();
    assert!(
        error.to_string().contains("no_negative_prices"),
        "got {error:#}"
    );

    // Raw snapshots precede the gate; processed data and reports must not.
    assert!(!ctx.merged_path().exists());
    assert!(!ctx.category_sales_path().exists());
    assert!(!ctx.product_sales_path().exists());
    assert!(!ctx.report_path().exists());
}

#[test]
fn products_without_price_column_fail_the_gate() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    write_fixture(
        dir.path(),
        "products.csv",
        "product_id,title,category\n\
         1,Mouse,electronics\n\
         2,Keyboard,electronics\n",
    );
    let ctx = context(&config, &dir.path().join("out"));

    let error = execute_run(&config, &ctx, false).unwrap_err();
    assert!(
        error.to_string().contains("missing required column 'price'"),
        "got {error:#}"
    );

    assert!(!ctx.merged_path().exists());
    assert!(!ctx.category_sales_path().exists());
    assert!(!ctx.product_sales_path().exists());
    assert!(!ctx.report_path().exists());
}

#[test]
fn orphan_sale_category_fails_the_gate() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    write_fixture(
        dir.path(),
        "sales.csv",
        "sale_id,product_id,quantity,price,category,sale_date\n\
         100,1,2,10.0,ghosts,2024-05-01\n",
    );
    let ctx = context(&config, &dir.path().join("out"));

    let error = execute_run(&config, &ctx, false).unwrap_err();
    assert!(
        error.to_string().contains("categories_exist"),
        "got {error:#}"
    );
}
