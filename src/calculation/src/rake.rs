//! Rake positions and their angular coverage windows.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::point::Regime;

/// Closed angular interval measured by one rake (deg).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageWindow {
    pub min: f64,
    pub max: f64,
}

impl CoverageWindow {
    /// Window of half-width `half_width` around `angle`.
    #[inline]
    pub fn centered(angle: f64, half_width: f64) -> Self {
        Self {
            min: angle - half_width,
            max: angle + half_width,
        }
    }

    /// Inclusive membership test. Both edges count as covered.
    #[inline]
    pub fn contains(&self, swirl: f64) -> bool {
        swirl >= self.min && swirl <= self.max
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// One chosen probe angle within a regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RakePosition {
    /// 1-based position in the test sequence. The optimizer numbers rakes
    /// within a regime; the matrix builder renumbers them globally.
    pub sequence: usize,
    /// Rake set angle (deg)
    pub angle: f64,
    pub coverage_min: f64,
    pub coverage_max: f64,
    pub regime: Regime,
    /// Input indices of the points measured at this rake, ascending.
    pub covered_point_indices: BTreeSet<usize>,
}

impl RakePosition {
    pub fn new(
        sequence: usize,
        angle: f64,
        window: CoverageWindow,
        regime: Regime,
        covered_point_indices: BTreeSet<usize>,
    ) -> Self {
        Self {
            sequence,
            angle,
            coverage_min: window.min,
            coverage_max: window.max,
            regime,
            covered_point_indices,
        }
    }

    /// Same rake under a different sequence number.
    pub fn with_sequence(&self, sequence: usize) -> Self {
        Self {
            sequence,
            ..self.clone()
        }
    }

    pub fn window(&self) -> CoverageWindow {
        CoverageWindow {
            min: self.coverage_min,
            max: self.coverage_max,
        }
    }

    pub fn points_covered(&self) -> usize {
        self.covered_point_indices.len()
    }

    pub fn vacuum_required(&self) -> bool {
        self.regime.vacuum_required()
    }
}
