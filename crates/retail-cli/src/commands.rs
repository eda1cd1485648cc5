use anyhow::Result;
use tracing::info_span;

use retail_cli::config::{PipelineConfig, load_config};
use retail_cli::context::RunContext;
use retail_cli::pipeline::execute_run;
use retail_cli::types::RunSummary;

use crate::cli::{CheckConfigArgs, RunArgs};

pub fn run(args: &RunArgs) -> Result<RunSummary> {
    let config = load_config(&args.config)?;
    let mut ctx = RunContext::new(&config);
    if let Some(root) = &args.output_dir {
        ctx = ctx.under_root(root);
    }
    if let Some(date) = &args.run_date {
        ctx = ctx.with_run_date(date.clone());
    }
    if !args.dry_run {
        ctx.ensure_dirs()?;
    }
    let run_span = info_span!("run", run_date = %ctx.run_date);
    let _guard = run_span.enter();
    execute_run(&config, &ctx, args.dry_run)
}

pub fn check_config(args: &CheckConfigArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    print_resolved(&config);
    Ok(())
}

fn print_resolved(config: &PipelineConfig) {
    println!("api.url: {}", config.api.url);
    println!("api.timeout_secs: {}", config.api.timeout_secs);
    match &config.data_sources.products_file {
        Some(path) => println!("data_sources.products_file: {}", path.display()),
        None => println!("data_sources.products_file: (api fetch)"),
    }
    println!(
        "data_sources.sales_file: {}",
        config.data_sources.sales_file.display()
    );
    println!(
        "data_sources.inventory_file: {}",
        config.data_sources.inventory_file.display()
    );
    println!(
        "processing.raw_path: {}",
        config.processing.raw_path.display()
    );
    println!(
        "processing.output_path: {}",
        config.processing.output_path.display()
    );
    println!(
        "processing.outputs_path: {}",
        config.processing.outputs_path.display()
    );
}
