//! turbine-matrix CLI
//!
//! Command-line front end for the rake coverage planner:
//!
//! 1. Load the CFD sweep (CSV with RPM, PressureRatio, Swirl columns)
//! 2. Classify points by vacuum regime around the critical pressure ratio
//! 3. Place the fewest rakes covering every swirl angle in each regime
//! 4. Export the test matrix, rake summary and config tables

mod cli;
mod demo;
mod loader;
mod report;

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, PlanArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Plan(args) => run_plan(&args),
        Command::Inspect { input, rows, json } => run_inspect(&input, rows, json),
        Command::Demo { output, seed } => run_demo(&output, seed),
    }
}

/// Log to stderr so stdout stays clean for tables.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_plan(args: &PlanArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let table = loader::load_cfd_csv(&args.input)?;
    let points = table.points();

    let matrix = turbine_calc::plan(&points, &config)
        .with_context(|| format!("planning failed for {}", args.input.display()))?;

    report::print_summary(&matrix);
    let paths = report::write_report(&args.output_dir, &matrix, &config, args.json)?;

    println!();
    println!("Test matrix:   {}", paths.test_matrix.display());
    println!("Rake summary:  {}", paths.rake_summary.display());
    println!("Configuration: {}", paths.config.display());
    if let Some(json) = &paths.summary_json {
        println!("JSON summary:  {}", json.display());
    }
    Ok(())
}

fn run_inspect(input: &std::path::Path, rows: usize, json: bool) -> Result<()> {
    let table = loader::load_cfd_csv(input)?;
    let stats = table.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    if table.is_empty() {
        println!("{} holds no complete data rows", input.display());
        return Ok(());
    }

    println!("File: {}", input.display());
    println!("Columns: {}", stats.columns.join(", "));
    println!("Total points: {}", stats.total_points);
    if table.dropped_rows > 0 {
        println!("Dropped rows (missing values): {}", table.dropped_rows);
    }
    for (name, range) in [
        ("RPM", stats.rpm_range),
        ("PressureRatio", stats.pressure_ratio_range),
        ("Swirl", stats.swirl_range),
    ] {
        if let Some((min, max)) = range {
            println!("  {:<14} [{:.3}, {:.3}]", name, min, max);
        }
    }

    println!();
    println!("{:>10}  {:>14}  {:>10}", "RPM", "PressureRatio", "Swirl");
    for point in table.preview(rows) {
        println!("{:>10.2}  {:>14.4}  {:>10.2}", point.rpm, point.pressure_ratio, point.swirl_angle);
    }
    Ok(())
}

fn run_demo(output: &std::path::Path, seed: u64) -> Result<()> {
    let points = demo::demo_points(seed)?;
    let file = File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
    report::write_csv(&mut demo::points_frame(&points)?, BufWriter::new(file))?;

    println!("Demo CFD data ({} points, seed {}) written to {}", points.len(), seed, output.display());
    Ok(())
}
