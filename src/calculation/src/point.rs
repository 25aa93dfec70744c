//! CFD operating points and vacuum regimes.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Column holding rotational speed.
pub const RPM_COLUMN: &str = "RPM";
/// Column holding the pressure ratio.
pub const PRESSURE_RATIO_COLUMN: &str = "PressureRatio";
/// Column holding the swirl angle (deg).
pub const SWIRL_COLUMN: &str = "Swirl";

/// Columns every CFD dataset must provide, case-sensitive.
pub const REQUIRED_COLUMNS: [&str; 3] = [RPM_COLUMN, PRESSURE_RATIO_COLUMN, SWIRL_COLUMN];

/// One CFD-predicted operating point.
///
/// Points carry no key of their own; they are identified by their index in
/// the input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub rpm: f64,
    pub pressure_ratio: f64,
    /// Flow swirl angle (deg)
    pub swirl_angle: f64,
}

impl OperatingPoint {
    pub const fn new(rpm: f64, pressure_ratio: f64, swirl_angle: f64) -> Self {
        Self {
            rpm,
            pressure_ratio,
            swirl_angle,
        }
    }

    /// Named fields, keyed by their dataset column.
    pub fn columns(&self) -> [(&'static str, f64); 3] {
        [
            (RPM_COLUMN, self.rpm),
            (PRESSURE_RATIO_COLUMN, self.pressure_ratio),
            (SWIRL_COLUMN, self.swirl_angle),
        ]
    }
}

/// Vacuum operating regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    VacuumOff,
    VacuumOn,
}

impl Regime {
    /// Regime of a point with the given pressure ratio.
    ///
    /// The threshold is inclusive: a ratio equal to `p_critical` needs vacuum.
    #[inline]
    pub fn for_pressure_ratio(pressure_ratio: f64, p_critical: f64) -> Self {
        if pressure_ratio >= p_critical {
            Self::VacuumOn
        } else {
            Self::VacuumOff
        }
    }

    pub fn vacuum_required(self) -> bool {
        matches!(self, Self::VacuumOn)
    }

    /// Report label ("Yes"/"No" for vacuum required).
    pub fn label(self) -> &'static str {
        match self {
            Self::VacuumOff => "No",
            Self::VacuumOn => "Yes",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VacuumOff => write!(f, "vacuum off"),
            Self::VacuumOn => write!(f, "vacuum on"),
        }
    }
}

/// Reject points with NaN or infinite fields.
pub fn validate_points(points: &[OperatingPoint]) -> Result<(), SchemaError> {
    for (index, point) in points.iter().enumerate() {
        for (column, value) in point.columns() {
            if !value.is_finite() {
                return Err(SchemaError::NonFinite {
                    index,
                    column,
                    value,
                });
            }
        }
    }
    Ok(())
}
