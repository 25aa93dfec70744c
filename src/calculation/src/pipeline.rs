//! End-to-end planning: classify, optimize both regimes, build the matrix.

use rayon::prelude::*;
use tracing::info;

use crate::classify::classify;
use crate::config::TestConfig;
use crate::error::{ConfigError, Result};
use crate::matrix::{TestMatrix, TestMatrixBuilder};
use crate::optimizer::CoverageOptimizer;
use crate::point::{OperatingPoint, Regime, validate_points};
use crate::rake::RakePosition;

/// Plan the full test matrix for `points` under `config`.
///
/// Configuration, point data and swirl reachability are validated before any
/// optimization work. The two regimes are optimized concurrently; the result
/// does not depend on scheduling. An empty point set yields an empty matrix.
pub fn plan(points: &[OperatingPoint], config: &TestConfig) -> Result<TestMatrix> {
    config.validate()?;
    validate_points(points)?;

    let classification = classify(points, config)?;
    let optimizer = CoverageOptimizer::new(config)?;
    let all: Vec<usize> = (0..points.len()).collect();
    optimizer.check_reachable(points, &all)?;

    info!(
        "Planning {} points: P_critical = {:.3}, vacuum on: {}, vacuum off: {}",
        points.len(),
        classification.p_critical,
        classification.on.len(),
        classification.off.len()
    );

    let regimes: Vec<Vec<RakePosition>> = [Regime::VacuumOff, Regime::VacuumOn]
        .par_iter()
        .map(|&regime| optimizer.cover(points, classification.indices(regime), regime))
        .collect::<std::result::Result<_, ConfigError>>()?;
    let (off, on) = (&regimes[0], &regimes[1]);

    let matrix = TestMatrixBuilder::build(points, classification.p_critical, off, on);
    debug_assert_eq!(matrix.check_invariants(points, config), Ok(()));

    info!(
        "Test matrix: {} rake positions ({} vacuum off, {} vacuum on), {} test points",
        matrix.summary.total_rakes,
        matrix.summary.vacuum_off_rakes,
        matrix.summary.vacuum_on_rakes,
        matrix.summary.total_points
    );

    Ok(matrix)
}
