//! Test matrix export.
//!
//! Writes the planned matrix as three CSV tables (test matrix, rake summary,
//! configuration) plus an optional JSON summary, and prints the console
//! report.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use turbine_calc::{MatrixSummary, TestConfig, TestMatrix};

pub const TEST_MATRIX_FILE: &str = "test_matrix.csv";
pub const RAKE_SUMMARY_FILE: &str = "rake_summary.csv";
pub const CONFIG_FILE: &str = "config.csv";
pub const SUMMARY_JSON_FILE: &str = "summary.json";

/// Round to a fixed number of decimals for presentation.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Main test matrix table, one row per test point.
pub fn matrix_frame(matrix: &TestMatrix) -> PolarsResult<DataFrame> {
    let rows = &matrix.rows;
    df!(
        "TestSequence" => rows.iter().map(|r| r.test_sequence as u32).collect::<Vec<_>>(),
        "RakeAngle" => rows.iter().map(|r| round_to(r.rake_angle, 2)).collect::<Vec<_>>(),
        "CoverageMin" => rows.iter().map(|r| round_to(r.coverage_min, 2)).collect::<Vec<_>>(),
        "CoverageMax" => rows.iter().map(|r| round_to(r.coverage_max, 2)).collect::<Vec<_>>(),
        "VacuumRequired" => rows.iter().map(|r| yes_no(r.vacuum_required)).collect::<Vec<_>>(),
        "RPM" => rows.iter().map(|r| r.rpm).collect::<Vec<_>>(),
        "PressureRatio" => rows.iter().map(|r| round_to(r.pressure_ratio, 4)).collect::<Vec<_>>(),
        "Swirl" => rows.iter().map(|r| round_to(r.swirl_angle, 2)).collect::<Vec<_>>()
    )
}

/// One row per rake with its point count.
pub fn rake_summary_frame(matrix: &TestMatrix) -> PolarsResult<DataFrame> {
    let table = matrix.rake_table();
    df!(
        "TestSequence" => table.iter().map(|r| r.sequence as u32).collect::<Vec<_>>(),
        "RakeAngle" => table.iter().map(|r| round_to(r.angle, 2)).collect::<Vec<_>>(),
        "VacuumRequired" => table.iter().map(|r| yes_no(r.vacuum_required)).collect::<Vec<_>>(),
        "PointCount" => table.iter().map(|r| r.points_covered as u32).collect::<Vec<_>>()
    )
}

/// Parameter/value table of the run configuration.
pub fn config_frame(config: &TestConfig) -> PolarsResult<DataFrame> {
    let summary = config.summary();
    df!(
        "Parameter" => summary.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        "Value" => summary
            .iter()
            .map(|(k, v)| if k == "P_critical" { round_to(*v, 4) } else { *v })
            .collect::<Vec<_>>()
    )
}

/// Write a frame as CSV with a header row.
pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> PolarsResult<()> {
    CsvWriter::new(writer).has_header(true).finish(df)
}

/// JSON rake entry, shaped like the planner's HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RakePositionReport {
    pub sequence: usize,
    pub angle: f64,
    pub vacuum_required: &'static str,
    pub points_covered: usize,
}

/// JSON run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub summary: MatrixSummary,
    pub rake_positions: Vec<RakePositionReport>,
}

impl PlanReport {
    pub fn from_matrix(matrix: &TestMatrix) -> Self {
        let rake_positions = matrix
            .rake_table()
            .into_iter()
            .map(|r| RakePositionReport {
                sequence: r.sequence,
                angle: round_to(r.angle, 2),
                vacuum_required: yes_no(r.vacuum_required),
                points_covered: r.points_covered,
            })
            .collect();
        Self {
            summary: matrix.summary,
            rake_positions,
        }
    }
}

/// Files produced by [`write_report`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub test_matrix: PathBuf,
    pub rake_summary: PathBuf,
    pub config: PathBuf,
    pub summary_json: Option<PathBuf>,
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Write every report table into `dir`, creating it if needed.
pub fn write_report(dir: &Path, matrix: &TestMatrix, config: &TestConfig, with_json: bool) -> Result<ReportPaths> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let paths = ReportPaths {
        test_matrix: dir.join(TEST_MATRIX_FILE),
        rake_summary: dir.join(RAKE_SUMMARY_FILE),
        config: dir.join(CONFIG_FILE),
        summary_json: with_json.then(|| dir.join(SUMMARY_JSON_FILE)),
    };

    write_csv(&mut matrix_frame(matrix)?, create(&paths.test_matrix)?)?;
    write_csv(&mut rake_summary_frame(matrix)?, create(&paths.rake_summary)?)?;
    write_csv(&mut config_frame(config)?, create(&paths.config)?)?;

    if let Some(path) = &paths.summary_json {
        let mut writer = create(path)?;
        serde_json::to_writer_pretty(&mut writer, &PlanReport::from_matrix(matrix))?;
        writer.flush()?;
    }

    info!("Test matrix written to {}", dir.display());
    Ok(paths)
}

/// Print the rake table and summary block to stdout.
pub fn print_summary(matrix: &TestMatrix) {
    println!();
    println!("{:>4}  {:>9}  {:>18}  {:>6}  {:>6}", "#", "Angle", "Coverage", "Vacuum", "Points");
    for rake in &matrix.rakes {
        println!(
            "{:>4}  {:>8.1}°  [{:>6.1}°, {:>6.1}°]  {:>6}  {:>6}",
            rake.sequence,
            rake.angle,
            rake.coverage_min,
            rake.coverage_max,
            rake.regime.label(),
            rake.points_covered()
        );
    }

    let s = &matrix.summary;
    println!();
    println!("{}", "=".repeat(60));
    println!("TEST MATRIX SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total rake positions: {}", s.total_rakes);
    println!("  - Vacuum off: {} rakes", s.vacuum_off_rakes);
    println!("  - Vacuum on:  {} rakes", s.vacuum_on_rakes);
    println!();
    println!("Total test points: {}", s.total_points);
    println!("P_critical: {:.3}", s.p_critical);
    println!("{}", "=".repeat(60));
}
