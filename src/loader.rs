//! CFD table loading.
//!
//! Reads a CSV export of the CFD sweep with polars, checks the required
//! columns, drops rows with missing values and hands back the three numeric
//! columns as `ndarray` arrays.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array1;
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use turbine_calc::point::{PRESSURE_RATIO_COLUMN, RPM_COLUMN, SWIRL_COLUMN};
use turbine_calc::{OperatingPoint, REQUIRED_COLUMNS, SchemaError};

/// The numeric columns of a loaded CFD table.
#[derive(Debug, Clone, PartialEq)]
pub struct CfdTable {
    pub rpm: Array1<f64>,
    pub pressure_ratio: Array1<f64>,
    pub swirl: Array1<f64>,
    /// Every column name of the source file, in file order.
    pub columns: Vec<String>,
    /// Rows skipped because a required value was missing.
    pub dropped_rows: usize,
}

/// Summary statistics shown before planning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_points: usize,
    pub rpm_range: Option<(f64, f64)>,
    pub pressure_ratio_range: Option<(f64, f64)>,
    pub swirl_range: Option<(f64, f64)>,
    pub columns: Vec<String>,
}

impl CfdTable {
    pub fn len(&self) -> usize {
        self.swirl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swirl.is_empty()
    }

    /// Rows as operating points, in file order.
    pub fn points(&self) -> Vec<OperatingPoint> {
        self.rpm
            .iter()
            .zip(self.pressure_ratio.iter())
            .zip(self.swirl.iter())
            .map(|((&rpm, &pr), &swirl)| OperatingPoint::new(rpm, pr, swirl))
            .collect()
    }

    /// First `n` rows.
    pub fn preview(&self, n: usize) -> Vec<OperatingPoint> {
        self.points().into_iter().take(n).collect()
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            total_points: self.len(),
            rpm_range: value_range(&self.rpm),
            pressure_ratio_range: value_range(&self.pressure_ratio),
            swirl_range: value_range(&self.swirl),
            columns: self.columns.clone(),
        }
    }
}

/// (min, max) of a column, `None` when empty.
fn value_range(values: &Array1<f64>) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.fold(f64::INFINITY, |a, &b| a.min(b));
    let max = values.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    Some((min, max))
}

/// Load a CFD table from a CSV file on disk.
pub fn load_cfd_csv(path: &Path) -> Result<CfdTable> {
    let bytes = fs::read(path).with_context(|| format!("cannot open {}", path.display()))?;
    let table = parse_cfd_csv(&bytes).with_context(|| format!("cannot load {}", path.display()))?;
    info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Parse a CFD table from in-memory CSV bytes.
pub fn parse_cfd_csv(bytes: &[u8]) -> Result<CfdTable> {
    let df = CsvReader::new(Cursor::new(bytes))
        .has_header(true)
        .finish()
        .context("cannot parse CSV data")?;
    table_from_frame(df)
}

/// Validate the schema of a frame and extract the required columns.
pub fn table_from_frame(df: DataFrame) -> Result<CfdTable> {
    let columns: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing).into());
    }

    for name in REQUIRED_COLUMNS {
        let column = df.column(name)?;
        let dtype = column.dtype();
        // A column without a single value is read as str; its rows are dropped below.
        let all_missing = column.null_count() == column.len();
        if !dtype.is_numeric() && !all_missing {
            return Err(SchemaError::NonNumericColumn {
                column: name.to_string(),
                dtype: dtype.to_string(),
            }
            .into());
        }
    }

    let before = df.height();
    let df = df
        .lazy()
        .drop_nulls(Some(REQUIRED_COLUMNS.iter().map(|c| col(c)).collect()))
        .collect()?;
    let dropped_rows = before - df.height();
    if dropped_rows > 0 {
        warn!("Dropped {} rows with missing RPM/PressureRatio/Swirl values", dropped_rows);
    }

    Ok(CfdTable {
        rpm: column_array(&df, RPM_COLUMN)?,
        pressure_ratio: column_array(&df, PRESSURE_RATIO_COLUMN)?,
        swirl: column_array(&df, SWIRL_COLUMN)?,
        columns,
        dropped_rows,
    })
}

/// Cast a numeric column to f64 and copy it out.
fn column_array(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let values = series.f64()?;
    Ok(Array1::from_vec(values.into_no_null_iter().collect()))
}
