//! Threshold classification of operating points into vacuum regimes.

use serde::{Deserialize, Serialize};

use crate::config::TestConfig;
use crate::error::ConfigError;
use crate::point::{OperatingPoint, Regime};

/// Stable partition of the input points by regime.
///
/// Both groups hold input indices in ascending (original) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub p_critical: f64,
    pub off: Vec<usize>,
    pub on: Vec<usize>,
}

impl Classification {
    /// Indices belonging to `regime`.
    pub fn indices(&self, regime: Regime) -> &[usize] {
        match regime {
            Regime::VacuumOff => &self.off,
            Regime::VacuumOn => &self.on,
        }
    }

    /// Points of `regime`, in input order.
    ///
    /// # Panics
    ///
    /// The iterator panics if `points` is shorter than the slice this
    /// classification was computed from.
    pub fn points<'a>(
        &'a self,
        regime: Regime,
        points: &'a [OperatingPoint],
    ) -> impl Iterator<Item = &'a OperatingPoint> + 'a {
        self.indices(regime).iter().map(move |&i| &points[i])
    }
}

/// Split points into (vacuum off, vacuum on) around the critical pressure ratio.
pub fn classify(points: &[OperatingPoint], config: &TestConfig) -> Result<Classification, ConfigError> {
    config.validate()?;

    let p_critical = config.p_critical();
    let (on, off): (Vec<usize>, Vec<usize>) = (0..points.len())
        .partition(|&i| Regime::for_pressure_ratio(points[i].pressure_ratio, p_critical).vacuum_required());

    Ok(Classification { p_critical, off, on })
}
