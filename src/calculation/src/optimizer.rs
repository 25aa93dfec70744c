//! Greedy rake placement over 1-D angular coverage windows.
//!
//! Every rake measures a fixed-width window of swirl angles. For one regime
//! the optimizer repeatedly picks the feasible rake angle whose window holds
//! the most still-uncovered points, until every point is covered.
//!
//! # Candidate angles
//!
//! Any feasible window can be slid towards larger angles until its lower edge
//! reaches the smallest swirl it covers (or the rake hits `rake_max`) without
//! losing a point. So the angles `swirl + eff`, clamped to the rake bounds,
//! contain an optimal choice for each iteration; the mirrored `swirl - eff`
//! family gives the same guarantee from the other side. Point-centred angles
//! are kept as well: they always cover their own point, which guarantees
//! progress, and they win ties so that isolated points get a rake aimed
//! straight at them.
//!
//! # Tie-breaking
//!
//! Highest count first, then point-centred over edge-anchored, then the
//! angle closest to zero, then the numerically smallest angle.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::TestConfig;
use crate::error::ConfigError;
use crate::point::{OperatingPoint, Regime};
use crate::rake::{CoverageWindow, RakePosition};

/// Upper bound on ulp corrections when anchoring a window edge.
const MAX_ANCHOR_STEPS: usize = 4;

/// Owned working set of not-yet-covered point indices.
///
/// Indices stay in ascending (input) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingSet {
    indices: Vec<usize>,
}

impl RemainingSet {
    pub fn new(indices: &[usize]) -> Self {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Swirl angles of the remaining points, ascending.
    fn sorted_swirls(&self, points: &[OperatingPoint]) -> Vec<f64> {
        let mut swirls: Vec<f64> = self.indices.iter().map(|&i| points[i].swirl_angle).collect();
        swirls.sort_by(f64::total_cmp);
        swirls
    }

    /// Remove and return every remaining index whose swirl lies in `window`.
    pub fn take_covered(&mut self, points: &[OperatingPoint], window: &CoverageWindow) -> BTreeSet<usize> {
        let mut covered = BTreeSet::new();
        self.indices.retain(|&i| {
            if window.contains(points[i].swirl_angle) {
                covered.insert(i);
                false
            } else {
                true
            }
        });
        covered
    }
}

/// A scored rake angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub angle: f64,
    pub window: CoverageWindow,
    pub count: usize,
    /// Angle is a (clamped) swirl value of a remaining point.
    pub centered: bool,
}

impl Candidate {
    /// Ordering where the preferred candidate compares greatest.
    fn rank(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then(self.centered.cmp(&other.centered))
            .then_with(|| other.angle.abs().total_cmp(&self.angle.abs()))
            .then_with(|| other.angle.total_cmp(&self.angle))
    }
}

/// Number of values of an ascending slice inside `window` (inclusive).
fn count_in_window(sorted: &[f64], window: &CoverageWindow) -> usize {
    let upper = sorted.partition_point(|&s| s <= window.max);
    let lower = sorted.partition_point(|&s| s < window.min);
    upper.saturating_sub(lower)
}

/// Greedy set-cover optimizer for one regime at a time.
#[derive(Debug, Clone, Copy)]
pub struct CoverageOptimizer<'a> {
    config: &'a TestConfig,
}

impl<'a> CoverageOptimizer<'a> {
    /// Create an optimizer, validating the configuration up front.
    pub fn new(config: &'a TestConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Check that every point can be covered by some feasible rake.
    ///
    /// # Panics
    ///
    /// Panics if an entry of `indices` is out of bounds for `points`.
    pub fn check_reachable(&self, points: &[OperatingPoint], indices: &[usize]) -> Result<(), ConfigError> {
        let (reach_min, reach_max) = self.config.reachable_range();
        for &index in indices {
            let swirl = points[index].swirl_angle;
            let window = self.config.coverage_window(self.config.clamp_angle(swirl));
            if !window.contains(swirl) {
                return Err(ConfigError::UnreachableSwirl {
                    index,
                    swirl,
                    reach_min,
                    reach_max,
                });
            }
        }
        Ok(())
    }

    /// Rake angle whose window edge sits on `swirl`, clamped to the bounds.
    ///
    /// `swirl + offset - offset` can round past `swirl`; the angle is walked
    /// back one ulp at a time until `swirl` is inside again.
    fn anchored(&self, swirl: f64, offset: f64) -> f64 {
        let mut angle = self.config.clamp_angle(swirl + offset);
        for _ in 0..MAX_ANCHOR_STEPS {
            if self.config.coverage_window(angle).contains(swirl) {
                break;
            }
            let stepped = if offset > 0.0 { angle.next_down() } else { angle.next_up() };
            angle = self.config.clamp_angle(stepped);
        }
        angle
    }

    /// Every distinct candidate angle for the current remaining set.
    pub fn candidates(&self, points: &[OperatingPoint], remaining: &RemainingSet) -> Vec<Candidate> {
        let swirls = remaining.sorted_swirls(points);
        let eff = self.config.effective_accuracy();

        let mut angles: Vec<(f64, bool)> = Vec::with_capacity(swirls.len() * 3);
        for &s in &swirls {
            angles.push((self.config.clamp_angle(s), true));
            angles.push((self.anchored(s, eff), false));
            angles.push((self.anchored(s, -eff), false));
        }
        // Centred entries sort first among equal angles and survive dedup.
        angles.sort_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)));
        angles.dedup_by(|later, earlier| later.0 == earlier.0);

        angles
            .into_iter()
            .map(|(angle, centered)| {
                let window = self.config.coverage_window(angle);
                Candidate {
                    angle,
                    window,
                    count: count_in_window(&swirls, &window),
                    centered,
                }
            })
            .collect()
    }

    /// Best candidate for the current remaining set, if any point remains.
    pub fn best_candidate(&self, points: &[OperatingPoint], remaining: &RemainingSet) -> Option<Candidate> {
        self.candidates(points, remaining)
            .into_iter()
            .max_by(|a, b| a.rank(b))
    }

    /// Place rakes over the points at `indices`, all belonging to `regime`.
    ///
    /// Returned rakes are in selection order and numbered 1.. within the
    /// regime. An empty index set yields no rakes.
    ///
    /// # Panics
    ///
    /// Panics if an entry of `indices` is out of bounds for `points`.
    pub fn optimize(
        &self,
        points: &[OperatingPoint],
        indices: &[usize],
        regime: Regime,
    ) -> Result<Vec<RakePosition>, ConfigError> {
        self.check_reachable(points, indices)?;
        self.cover(points, indices, regime)
    }

    /// Greedy loop of [`optimize`](Self::optimize) for indices already
    /// known to be reachable.
    pub(crate) fn cover(
        &self,
        points: &[OperatingPoint],
        indices: &[usize],
        regime: Regime,
    ) -> Result<Vec<RakePosition>, ConfigError> {
        if indices.is_empty() {
            return Ok(Vec::new());
        }

        let mut remaining = RemainingSet::new(indices);
        let total = remaining.len();
        info!("Optimizing {}: {} test points", regime, total);

        let mut rakes: Vec<RakePosition> = Vec::new();
        while let Some(best) = self.best_candidate(points, &remaining) {
            let covered = remaining.take_covered(points, &best.window);
            if covered.is_empty() {
                // Only possible for an unchecked unreachable point.
                let index = remaining.indices()[0];
                let (reach_min, reach_max) = self.config.reachable_range();
                return Err(ConfigError::UnreachableSwirl {
                    index,
                    swirl: points[index].swirl_angle,
                    reach_min,
                    reach_max,
                });
            }

            debug!(
                "Rake #{}: {:.2} deg [{:.2}, {:.2}] -> {} points, {} remaining",
                rakes.len() + 1,
                best.angle,
                best.window.min,
                best.window.max,
                covered.len(),
                remaining.len()
            );
            rakes.push(RakePosition::new(rakes.len() + 1, best.angle, best.window, regime, covered));
        }

        info!("{}: {} rake positions cover {} points", regime, rakes.len(), total);
        Ok(rakes)
    }
}

/// Optimize every point of `points` as a single regime.
pub fn optimize(points: &[OperatingPoint], config: &TestConfig, regime: Regime) -> Result<Vec<RakePosition>, ConfigError> {
    let indices: Vec<usize> = (0..points.len()).collect();
    CoverageOptimizer::new(config)?.optimize(points, &indices, regime)
}
