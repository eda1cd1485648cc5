//! Markdown run report.

use retail_transform::MetricsOutput;

/// How many top sellers the report lists.
const TOP_PRODUCTS: usize = 5;

/// Render the run report: totals plus the top products by quantity.
///
/// Pure string rendering; writing is the caller's concern so tests can
/// compare output byte-for-byte.
pub fn render_report(run_date: &str, metrics: &MetricsOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Pipeline report {run_date}\n\n"));
    out.push_str(&format!(
        "- Total merged rows: {}\n",
        metrics.merged.height()
    ));
    out.push_str(&format!(
        "- Categories detected: {}\n\n",
        metrics.category_sales.len()
    ));
    out.push_str("## Top 5 products by quantity\n");
    for product in metrics.product_sales.iter().take(TOP_PRODUCTS) {
        let title = product.title.as_deref().unwrap_or("(unknown)");
        let id = product
            .product_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "- {title} (id:{id}): {} units, estimated revenue: {:.2}\n",
            product.total_quantity, product.estimated_revenue
        ));
    }
    out
}
