use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use retail_cli::types::RunSummary;

pub fn print_summary(summary: &RunSummary) {
    println!("Run date: {}", summary.run_date);
    if summary.dry_run {
        println!("Dry run: no files written");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Merged rows"),
        header_cell("Categories"),
        header_cell("Products"),
        header_cell("Critical stock"),
        header_cell("Checks passed"),
    ]);
    apply_table_style(&mut table);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(summary.merged_rows),
        Cell::new(summary.categories),
        Cell::new(summary.products),
        critical_cell(summary.critical_rows),
        Cell::new(summary.checks_passed.len()),
    ]);
    println!("{table}");

    println!("Backfill: {}", summary.backfill);

    if !summary.top_products.is_empty() {
        let mut top = Table::new();
        top.set_header(vec![
            header_cell("Product"),
            header_cell("Quantity"),
            header_cell("Est. revenue"),
            header_cell("Band"),
        ]);
        apply_table_style(&mut top);
        align_column(&mut top, 1, CellAlignment::Right);
        align_column(&mut top, 2, CellAlignment::Right);
        for product in &summary.top_products {
            let title = product.title.as_deref().unwrap_or("(unknown)");
            top.add_row(vec![
                Cell::new(title),
                Cell::new(product.total_quantity),
                Cell::new(format!("{:.2}", product.estimated_revenue)),
                Cell::new(product.sales_category.as_str()),
            ]);
        }
        println!();
        println!("Top products:");
        println!("{top}");
    }

    if !summary.outputs.is_empty() {
        println!("Outputs:");
        for path in &summary.outputs {
            println!("- {}", path.display());
        }
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn critical_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}
