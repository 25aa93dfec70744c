//! Synthetic CFD sweep for trying the planner without real data.

use anyhow::Result;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use turbine_calc::OperatingPoint;
use turbine_calc::point::{PRESSURE_RATIO_COLUMN, RPM_COLUMN, SWIRL_COLUMN};

use crate::report::round_to;

/// Default RNG seed for reproducible demo data
pub const DEFAULT_SEED: u64 = 42;

/// Speeds 50..=140 % in 5 % steps
const RPM_START: f64 = 50.0;
const RPM_STEP: f64 = 5.0;
const RPM_COUNT: usize = 19;

/// Pressure ratios linearly spaced over [1.2, 2.5]
const PR_MIN: f64 = 1.2;
const PR_MAX: f64 = 2.5;
const PR_COUNT: usize = 15;

/// Swirl noise standard deviation (deg)
const SWIRL_NOISE: f64 = 5.0;

/// Generate the demo sweep: swirl rises with speed and pressure ratio.
///
/// swirl = -60 + 1.2 (rpm - 50) + 25 (pr - 1.2) + N(0, 5), clipped to +/-89 deg
pub fn demo_points(seed: u64) -> Result<Vec<OperatingPoint>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, SWIRL_NOISE)?;

    let mut points = Vec::with_capacity(RPM_COUNT * PR_COUNT);
    for i in 0..RPM_COUNT {
        let rpm = RPM_START + RPM_STEP * i as f64;
        for j in 0..PR_COUNT {
            let pr = PR_MIN + (PR_MAX - PR_MIN) * j as f64 / (PR_COUNT - 1) as f64;
            let swirl = -60.0 + (rpm - 50.0) * 1.2 + (pr - 1.2) * 25.0 + noise.sample(&mut rng);
            points.push(OperatingPoint::new(
                rpm,
                round_to(pr, 3),
                round_to(swirl.clamp(-89.0, 89.0), 2),
            ));
        }
    }
    Ok(points)
}

/// Points as a frame with the CFD column names.
pub fn points_frame(points: &[OperatingPoint]) -> PolarsResult<DataFrame> {
    df!(
        RPM_COLUMN => points.iter().map(|p| p.rpm).collect::<Vec<_>>(),
        PRESSURE_RATIO_COLUMN => points.iter().map(|p| p.pressure_ratio).collect::<Vec<_>>(),
        SWIRL_COLUMN => points.iter().map(|p| p.swirl_angle).collect::<Vec<_>>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_cfd_csv;
    use crate::report::write_csv;
    use approx::assert_relative_eq;

    #[test]
    fn test_demo_grid_shape() {
        let points = demo_points(DEFAULT_SEED).unwrap();
        assert_eq!(points.len(), 19 * 15);
        assert_eq!(points[0].rpm, 50.0);
        assert_eq!(points.last().unwrap().rpm, 140.0);
        assert_relative_eq!(points[0].pressure_ratio, 1.2);
        assert_relative_eq!(points[14].pressure_ratio, 2.5);
        assert!(points.iter().all(|p| p.swirl_angle.abs() <= 89.0));
    }

    #[test]
    fn test_demo_is_reproducible() {
        assert_eq!(demo_points(7).unwrap(), demo_points(7).unwrap());
        assert_ne!(demo_points(7).unwrap(), demo_points(8).unwrap());
    }

    #[test]
    fn test_demo_csv_loads_back() {
        let points = demo_points(DEFAULT_SEED).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut points_frame(&points).unwrap(), &mut buf).unwrap();

        let table = parse_cfd_csv(&buf).unwrap();
        assert_eq!(table.len(), points.len());
        assert_eq!(table.dropped_rows, 0);

        let plan = turbine_calc::plan(&table.points(), &turbine_calc::TestConfig::new()).unwrap();
        assert_eq!(plan.summary.total_points, points.len());
    }
}
