//! Test matrix assembly.
//!
//! Merges the per-regime rake lists into one globally sequenced test plan:
//! vacuum-off rakes first, then vacuum-on rakes, each rake expanded into one
//! row per covered point. Summary counts are derived from the rake lists only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TestConfig;
use crate::point::{OperatingPoint, Regime};
use crate::rake::RakePosition;

/// Absolute tolerance on window width checks (deg).
const WIDTH_TOLERANCE: f64 = 1e-9;

/// One line of the test matrix: an operating point and the rake measuring it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestMatrixRow {
    /// Index of the point in the input sequence
    pub point_index: usize,
    pub rpm: f64,
    pub pressure_ratio: f64,
    pub swirl_angle: f64,
    pub test_sequence: usize,
    pub rake_angle: f64,
    pub coverage_min: f64,
    pub coverage_max: f64,
    pub vacuum_required: bool,
}

/// Run-level counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub total_rakes: usize,
    pub total_points: usize,
    pub p_critical: f64,
    pub vacuum_off_rakes: usize,
    pub vacuum_on_rakes: usize,
}

/// Per-rake line of the rake summary table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RakeSummaryRow {
    pub sequence: usize,
    pub angle: f64,
    pub vacuum_required: bool,
    pub points_covered: usize,
}

/// A violated matrix invariant. Always a bug in the planner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("point {0} is not assigned to any rake")]
    Uncovered(usize),
    #[error("point {0} is assigned to more than one rake")]
    Duplicated(usize),
    #[error("row references point {0}, which is not in the input")]
    UnknownPoint(usize),
    #[error("point {index} swirl {swirl} lies outside rake {sequence} window [{min}, {max}]")]
    OutsideWindow {
        index: usize,
        sequence: usize,
        swirl: f64,
        min: f64,
        max: f64,
    },
    #[error("rake {sequence} window width {width} differs from {expected}")]
    WindowWidth {
        sequence: usize,
        width: f64,
        expected: f64,
    },
    #[error("point {0} is in the wrong vacuum regime")]
    WrongRegime(usize),
    #[error("rakes are not numbered 1..N in off-then-on order")]
    Sequence,
    #[error("summary counts do not match the rake lists")]
    Summary,
}

/// Complete output of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMatrix {
    pub rows: Vec<TestMatrixRow>,
    /// All rakes in test order, globally sequenced.
    pub rakes: Vec<RakePosition>,
    pub summary: MatrixSummary,
}

/// Composes per-regime rake lists into a [`TestMatrix`].
pub struct TestMatrixBuilder;

impl TestMatrixBuilder {
    /// Merge off-regime and on-regime rakes into the final matrix.
    ///
    /// `points` is the full input sequence that the rakes' indices refer to.
    ///
    /// # Panics
    ///
    /// Panics if a rake covers an index that is out of bounds for `points`.
    pub fn build(
        points: &[OperatingPoint],
        p_critical: f64,
        off_rakes: &[RakePosition],
        on_rakes: &[RakePosition],
    ) -> TestMatrix {
        let rakes: Vec<RakePosition> = off_rakes
            .iter()
            .chain(on_rakes)
            .enumerate()
            .map(|(i, rake)| rake.with_sequence(i + 1))
            .collect();

        let rows: Vec<TestMatrixRow> = rakes
            .iter()
            .flat_map(|rake| {
                rake.covered_point_indices.iter().map(move |&index| {
                    let point = &points[index];
                    TestMatrixRow {
                        point_index: index,
                        rpm: point.rpm,
                        pressure_ratio: point.pressure_ratio,
                        swirl_angle: point.swirl_angle,
                        test_sequence: rake.sequence,
                        rake_angle: rake.angle,
                        coverage_min: rake.coverage_min,
                        coverage_max: rake.coverage_max,
                        vacuum_required: rake.vacuum_required(),
                    }
                })
            })
            .collect();

        let summary = MatrixSummary {
            total_rakes: rakes.len(),
            total_points: rows.len(),
            p_critical,
            vacuum_off_rakes: off_rakes.len(),
            vacuum_on_rakes: on_rakes.len(),
        };

        TestMatrix { rows, rakes, summary }
    }
}

impl TestMatrix {
    /// One line per rake: sequence, angle, regime, point count.
    pub fn rake_table(&self) -> Vec<RakeSummaryRow> {
        self.rakes
            .iter()
            .map(|rake| RakeSummaryRow {
                sequence: rake.sequence,
                angle: rake.angle,
                vacuum_required: rake.vacuum_required(),
                points_covered: rake.points_covered(),
            })
            .collect()
    }

    /// Rakes of one regime, in test order.
    pub fn rakes_for(&self, regime: Regime) -> impl Iterator<Item = &RakePosition> {
        self.rakes.iter().filter(move |rake| rake.regime == regime)
    }

    /// Verify the coverage, membership, width, regime and numbering invariants.
    pub fn check_invariants(&self, points: &[OperatingPoint], config: &TestConfig) -> Result<(), InvariantViolation> {
        let mut seen = vec![false; points.len()];
        for rake in &self.rakes {
            for &index in &rake.covered_point_indices {
                let slot = seen.get_mut(index).ok_or(InvariantViolation::UnknownPoint(index))?;
                if *slot {
                    return Err(InvariantViolation::Duplicated(index));
                }
                *slot = true;
            }
        }
        if let Some(index) = seen.iter().position(|&covered| !covered) {
            return Err(InvariantViolation::Uncovered(index));
        }

        let expected = 2.0 * config.effective_accuracy();
        for rake in &self.rakes {
            let width = rake.window().width();
            if (width - expected).abs() > WIDTH_TOLERANCE * expected.max(1.0) {
                return Err(InvariantViolation::WindowWidth {
                    sequence: rake.sequence,
                    width,
                    expected,
                });
            }
        }

        let p_critical = self.summary.p_critical;
        for row in &self.rows {
            let point = points.get(row.point_index).ok_or(InvariantViolation::UnknownPoint(row.point_index))?;
            if !(row.swirl_angle >= row.coverage_min && row.swirl_angle <= row.coverage_max) {
                return Err(InvariantViolation::OutsideWindow {
                    index: row.point_index,
                    sequence: row.test_sequence,
                    swirl: row.swirl_angle,
                    min: row.coverage_min,
                    max: row.coverage_max,
                });
            }
            let regime = Regime::for_pressure_ratio(point.pressure_ratio, p_critical);
            if regime.vacuum_required() != row.vacuum_required {
                return Err(InvariantViolation::WrongRegime(row.point_index));
            }
        }

        let numbered = self.rakes.iter().enumerate().all(|(i, rake)| rake.sequence == i + 1);
        let grouped = self.rakes.windows(2).all(|pair| pair[0].regime <= pair[1].regime);
        if !numbered || !grouped {
            return Err(InvariantViolation::Sequence);
        }

        let off = self.rakes_for(Regime::VacuumOff).count();
        let on = self.rakes_for(Regime::VacuumOn).count();
        let summary_ok = self.summary.total_rakes == self.rakes.len()
            && self.summary.total_points == self.rows.len()
            && self.summary.vacuum_off_rakes == off
            && self.summary.vacuum_on_rakes == on
            && self.rows.len() == points.len();
        if !summary_ok {
            return Err(InvariantViolation::Summary);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rake::CoverageWindow;
    use approx::assert_relative_eq;

    fn rake(angle: f64, regime: Regime, covered: &[usize]) -> RakePosition {
        RakePosition::new(
            1,
            angle,
            CoverageWindow::centered(angle, 11.0),
            regime,
            covered.iter().copied().collect(),
        )
    }

    fn points() -> Vec<OperatingPoint> {
        vec![
            OperatingPoint::new(50.0, 1.2, 30.0),
            OperatingPoint::new(60.0, 1.5, -5.0),
            OperatingPoint::new(70.0, 1.3, 35.0),
            OperatingPoint::new(80.0, 1.9, 0.0),
            OperatingPoint::new(90.0, 1.1, -40.0),
        ]
    }

    fn sample_matrix() -> TestMatrix {
        let off = vec![rake(30.0, Regime::VacuumOff, &[2, 0]), rake(-40.0, Regime::VacuumOff, &[4])];
        let on = vec![rake(-5.0, Regime::VacuumOn, &[1, 3])];
        TestMatrixBuilder::build(&points(), TestConfig::new().p_critical(), &off, &on)
    }

    #[test]
    fn test_build_orders_off_then_on() {
        let matrix = sample_matrix();
        let sequences: Vec<usize> = matrix.rakes.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(matrix.rakes[0].regime, Regime::VacuumOff);
        assert_eq!(matrix.rakes[2].regime, Regime::VacuumOn);

        let order: Vec<(usize, usize)> = matrix.rows.iter().map(|r| (r.test_sequence, r.point_index)).collect();
        assert_eq!(order, vec![(1, 0), (1, 2), (2, 4), (3, 1), (3, 3)]);
    }

    #[test]
    fn test_rows_copy_point_and_rake_fields() {
        let matrix = sample_matrix();
        let row = matrix.rows[3];
        assert_eq!(row.point_index, 1);
        assert_eq!(row.rpm, 60.0);
        assert_relative_eq!(row.rake_angle, -5.0);
        assert_relative_eq!(row.coverage_min, -16.0);
        assert_relative_eq!(row.coverage_max, 6.0);
        assert!(row.vacuum_required);
    }

    #[test]
    fn test_summary_counts() {
        let matrix = sample_matrix();
        assert_eq!(matrix.summary.total_rakes, 3);
        assert_eq!(matrix.summary.total_points, 5);
        assert_eq!(matrix.summary.vacuum_off_rakes, 2);
        assert_eq!(matrix.summary.vacuum_on_rakes, 1);
        assert_relative_eq!(matrix.summary.p_critical, 1.381692573402418, epsilon = 1e-12);
    }

    #[test]
    fn test_rake_table() {
        let table = sample_matrix().rake_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].points_covered, 2);
        assert!(!table[0].vacuum_required);
        assert!(table[2].vacuum_required);
        assert_eq!(table[2].sequence, 3);
    }

    #[test]
    fn test_check_invariants_accepts_valid_matrix() {
        let matrix = sample_matrix();
        assert_eq!(matrix.check_invariants(&points(), &TestConfig::new()), Ok(()));
    }

    #[test]
    fn test_check_invariants_detects_gap_and_overlap() {
        let config = TestConfig::new();
        let p_critical = config.p_critical();

        let off = vec![rake(30.0, Regime::VacuumOff, &[0, 2])];
        let on = vec![rake(-5.0, Regime::VacuumOn, &[1, 3])];
        let gap = TestMatrixBuilder::build(&points(), p_critical, &off, &on);
        assert_eq!(gap.check_invariants(&points(), &config), Err(InvariantViolation::Uncovered(4)));

        let off = vec![rake(30.0, Regime::VacuumOff, &[0, 2]), rake(-40.0, Regime::VacuumOff, &[4, 0])];
        let overlap = TestMatrixBuilder::build(&points(), p_critical, &off, &on);
        assert_eq!(overlap.check_invariants(&points(), &config), Err(InvariantViolation::Duplicated(0)));
    }

    #[test]
    fn test_check_invariants_detects_membership_and_width() {
        let config = TestConfig::new();
        let p_critical = config.p_critical();

        let off = vec![rake(-40.0, Regime::VacuumOff, &[0, 2, 4])];
        let on = vec![rake(-5.0, Regime::VacuumOn, &[1, 3])];
        let outside = TestMatrixBuilder::build(&points(), p_critical, &off, &on);
        assert!(matches!(
            outside.check_invariants(&points(), &config),
            Err(InvariantViolation::OutsideWindow { index: 0, .. })
        ));

        let narrow = TestConfig {
            rake_accuracy: 5.0,
            ..config
        };
        let matrix = sample_matrix();
        assert!(matches!(
            matrix.check_invariants(&points(), &narrow),
            Err(InvariantViolation::WindowWidth { .. })
        ));
    }

    #[test]
    #[should_panic]
    fn test_build_panics_on_unknown_index() {
        let off = vec![rake(30.0, Regime::VacuumOff, &[0, 9])];
        TestMatrixBuilder::build(&points(), 1.4, &off, &[]);
    }

    #[test]
    fn test_empty_build() {
        let matrix = TestMatrixBuilder::build(&[], 1.4, &[], &[]);
        assert!(matrix.rows.is_empty());
        assert_eq!(matrix.summary.total_rakes, 0);
        assert_eq!(matrix.check_invariants(&[], &TestConfig::new()), Ok(()));
    }
}
