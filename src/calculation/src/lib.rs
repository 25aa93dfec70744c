//! Rake coverage optimization for turbine rig test matrices.
//!
//! Given CFD-predicted operating points (speed, pressure ratio, swirl angle)
//! this library plans the physical rake positions for a rig test:
//! - Regime classification around the critical pressure ratio (vacuum on/off)
//! - Greedy set cover of swirl angles by fixed-width rake windows
//! - Assembly of a globally sequenced test matrix and rake summary
//!
//! # Example
//!
//! ```
//! use turbine_calc::{plan, OperatingPoint, TestConfig};
//!
//! let points = vec![
//!     OperatingPoint::new(60.0, 1.2, 30.0),
//!     OperatingPoint::new(70.0, 1.5, 35.0),
//!     OperatingPoint::new(80.0, 1.2, 72.0),
//! ];
//! let matrix = plan(&points, &TestConfig::default()).unwrap();
//! assert_eq!(matrix.summary.total_points, 3);
//! assert_eq!(matrix.summary.vacuum_on_rakes, 1);
//! ```
//!
//! The library performs no I/O. Loading CFD tables and writing reports is
//! left to the caller.

#![warn(clippy::doc_markdown)]
#![allow(clippy::inconsistent_struct_constructor)]

pub mod classify;
pub mod config;
pub mod error;
pub mod matrix;
pub mod optimizer;
pub mod pipeline;
pub mod point;
pub mod rake;

// Re-export key types and functions for easy use
pub use classify::{Classification, classify};
pub use config::TestConfig;
pub use error::{ConfigError, PlanError, Result, SchemaError};
pub use matrix::{InvariantViolation, MatrixSummary, RakeSummaryRow, TestMatrix, TestMatrixBuilder, TestMatrixRow};
pub use optimizer::{CoverageOptimizer, RemainingSet, optimize};
pub use pipeline::plan;
pub use point::{OperatingPoint, REQUIRED_COLUMNS, Regime};
pub use rake::{CoverageWindow, RakePosition};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
