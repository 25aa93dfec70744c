//! Test configuration for one planning run.
//!
//! Holds the rig pressures used to derive the critical pressure ratio and the
//! rake parameters that fix the width and feasible range of every coverage
//! window. Defaults match the standard rig setup (150 kPa inlet, 10 kPa test
//! margin, standard atmosphere, +/-10 deg rakes with a 10 % margin).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rake::CoverageWindow;

/// Configuration parameters for a test matrix run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Inlet total pressure (kPa)
    pub pt_inlet: f64,

    /// Test safety margin subtracted from the inlet pressure (kPa)
    pub test_margin: f64,

    /// Ambient pressure (kPa)
    /// Standard value: 101.325 kPa
    pub ambient: f64,

    /// Rake angular accuracy, a +/- half-width (deg)
    pub rake_accuracy: f64,

    /// Extra safety margin on the accuracy, as a fraction (0.10 = 10 %)
    pub rake_margin_percent: f64,

    /// Lowest feasible rake angle (deg)
    pub rake_min: f64,

    /// Highest feasible rake angle (deg)
    pub rake_max: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfig {
    /// Create a config with the standard rig values.
    pub const fn new() -> Self {
        Self {
            pt_inlet: 150.0,
            test_margin: 10.0,
            ambient: 101.325,
            rake_accuracy: 10.0,
            rake_margin_percent: 0.10,
            rake_min: -89.0,
            rake_max: 89.0,
        }
    }

    /// Check every invariant of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if self.ambient <= 0.0 {
            return Err(ConfigError::NonPositiveAmbient(self.ambient));
        }
        if self.rake_accuracy <= 0.0 {
            return Err(ConfigError::NonPositiveAccuracy(self.rake_accuracy));
        }
        let effective = self.effective_accuracy();
        if effective <= 0.0 {
            return Err(ConfigError::NonPositiveEffectiveAccuracy(effective));
        }
        if self.rake_min >= self.rake_max {
            return Err(ConfigError::InvertedRakeBounds {
                min: self.rake_min,
                max: self.rake_max,
            });
        }
        Ok(())
    }

    /// Critical pressure ratio: at or above it the vacuum pump is engaged.
    ///
    /// p_critical = (pt_inlet - test_margin) / ambient
    #[inline]
    pub fn p_critical(&self) -> f64 {
        (self.pt_inlet - self.test_margin) / self.ambient
    }

    /// Accuracy half-width including the safety margin (deg).
    #[inline]
    pub fn effective_accuracy(&self) -> f64 {
        self.rake_accuracy * (1.0 + self.rake_margin_percent)
    }

    /// Clamp a requested rake angle into the feasible range.
    #[inline]
    pub fn clamp_angle(&self, angle: f64) -> f64 {
        angle.clamp(self.rake_min, self.rake_max)
    }

    /// Coverage window of a rake set at `angle` (unclamped).
    #[inline]
    pub fn coverage_window(&self, angle: f64) -> CoverageWindow {
        CoverageWindow::centered(angle, self.effective_accuracy())
    }

    /// Swirl range any feasible rake can reach.
    pub fn reachable_range(&self) -> (f64, f64) {
        let eff = self.effective_accuracy();
        (self.rake_min - eff, self.rake_max + eff)
    }

    /// Named fields, in declaration order.
    pub fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("pt_inlet", self.pt_inlet),
            ("test_margin", self.test_margin),
            ("ambient", self.ambient),
            ("rake_accuracy", self.rake_accuracy),
            ("rake_margin_percent", self.rake_margin_percent),
            ("rake_min", self.rake_min),
            ("rake_max", self.rake_max),
        ]
    }

    /// Human-readable parameter table for reports.
    ///
    /// The margin is listed in percent and `P_critical` is included.
    pub fn summary(&self) -> Vec<(String, f64)> {
        vec![
            ("pt_inlet [kPa]".to_string(), self.pt_inlet),
            ("test_margin [kPa]".to_string(), self.test_margin),
            ("ambient [kPa]".to_string(), self.ambient),
            ("P_critical".to_string(), self.p_critical()),
            ("rake_accuracy [deg]".to_string(), self.rake_accuracy),
            ("rake_margin [%]".to_string(), self.rake_margin_percent * 100.0),
            ("rake_min [deg]".to_string(), self.rake_min),
            ("rake_max [deg]".to_string(), self.rake_max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let c = TestConfig::default();
        assert_eq!(c.pt_inlet, 150.0);
        assert_eq!(c.ambient, 101.325);
        assert_eq!(c.rake_min, -89.0);
        assert_eq!(c.rake_max, 89.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_p_critical() {
        let c = TestConfig::new();
        // (150 - 10) / 101.325
        assert_relative_eq!(c.p_critical(), 1.381692573402418, epsilon = 1e-12);
    }

    #[test]
    fn test_effective_accuracy_and_window() {
        let c = TestConfig::new();
        assert_relative_eq!(c.effective_accuracy(), 11.0, epsilon = 1e-12);

        let w = c.coverage_window(30.0);
        assert_relative_eq!(w.min, 19.0, epsilon = 1e-12);
        assert_relative_eq!(w.max, 41.0, epsilon = 1e-12);
        assert!(w.contains(35.0));
        assert!(!w.contains(42.0));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut c = TestConfig::new();
        c.ambient = 0.0;
        assert_eq!(c.validate(), Err(ConfigError::NonPositiveAmbient(0.0)));

        let mut c = TestConfig::new();
        c.rake_accuracy = -1.0;
        assert_eq!(c.validate(), Err(ConfigError::NonPositiveAccuracy(-1.0)));

        let mut c = TestConfig::new();
        c.rake_margin_percent = -1.5;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonPositiveEffectiveAccuracy(_))
        ));

        let mut c = TestConfig::new();
        c.rake_min = 10.0;
        c.rake_max = 10.0;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvertedRakeBounds { .. })
        ));

        let mut c = TestConfig::new();
        c.pt_inlet = f64::NAN;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::NonFinite { field: "pt_inlet", .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let c: TestConfig = serde_json::from_str(r#"{"pt_inlet": 200.0}"#).unwrap();
        assert_eq!(c.pt_inlet, 200.0);
        assert_eq!(c.test_margin, 10.0);
        assert_eq!(c.rake_max, 89.0);
    }

    #[test]
    fn test_summary_lists_margin_in_percent() {
        let c = TestConfig::new();
        let summary = c.summary();
        assert_eq!(summary.len(), 8);
        let margin = summary.iter().find(|(k, _)| k == "rake_margin [%]").unwrap();
        assert_relative_eq!(margin.1, 10.0, epsilon = 1e-12);
    }
}
