//! Command-line interface definition and config resolution.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use turbine_calc::TestConfig;

use crate::demo::DEFAULT_SEED;

/// Turbine rig test matrix planner
///
/// Reads CFD operating points (RPM, PressureRatio, Swirl), splits them by
/// vacuum regime and finds the fewest rake angles that cover every swirl.
///
/// Examples:
///   turbine-matrix demo -o cfd.csv
///   turbine-matrix inspect cfd.csv
///   turbine-matrix plan cfd.csv --pt-inlet 180 --rake-accuracy 8 --json
#[derive(Parser, Debug)]
#[command(name = "turbine-matrix")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Verbose logging
    ///
    /// Shows per-rake placement details at debug level. RUST_LOG, when set,
    /// takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Plan rake positions and write the test matrix
    Plan(PlanArgs),

    /// Show dataset statistics and a preview
    Inspect {
        /// CFD data file (CSV)
        input: PathBuf,

        /// Number of preview rows
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,

        /// Print the statistics as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Write a synthetic CFD dataset
    Demo {
        /// Output CSV path
        #[arg(short, long, default_value = "demo_cfd_data.csv")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// CFD data file (CSV)
    pub input: PathBuf,

    /// Directory for the report files
    #[arg(short, long, default_value = "test_matrix_output")]
    pub output_dir: PathBuf,

    /// Also write summary.json
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Config file and per-field overrides.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// JSON config file; missing fields keep their defaults
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Inlet total pressure [kPa]
    #[arg(long, allow_negative_numbers = true)]
    pub pt_inlet: Option<f64>,

    /// Test safety margin [kPa]
    #[arg(long, allow_negative_numbers = true)]
    pub test_margin: Option<f64>,

    /// Ambient pressure [kPa]
    #[arg(long, allow_negative_numbers = true)]
    pub ambient: Option<f64>,

    /// Rake accuracy, +/- [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub rake_accuracy: Option<f64>,

    /// Extra accuracy margin [%], e.g. 10
    #[arg(long, allow_negative_numbers = true)]
    pub rake_margin_pct: Option<f64>,

    /// Lowest feasible rake angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub rake_min: Option<f64>,

    /// Highest feasible rake angle [deg]
    #[arg(long, allow_negative_numbers = true)]
    pub rake_max: Option<f64>,
}

impl ConfigArgs {
    /// Defaults, then the config file, then command-line flags.
    pub fn resolve(&self) -> Result<TestConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => TestConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut TestConfig) {
        if let Some(v) = self.pt_inlet {
            config.pt_inlet = v;
        }
        if let Some(v) = self.test_margin {
            config.test_margin = v;
        }
        if let Some(v) = self.ambient {
            config.ambient = v;
        }
        if let Some(v) = self.rake_accuracy {
            config.rake_accuracy = v;
        }
        if let Some(pct) = self.rake_margin_pct {
            config.rake_margin_percent = pct / 100.0;
        }
        if let Some(v) = self.rake_min {
            config.rake_min = v;
        }
        if let Some(v) = self.rake_max {
            config.rake_max = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_overrides() {
        let cli = Cli::parse_from([
            "turbine-matrix",
            "plan",
            "cfd.csv",
            "--pt-inlet",
            "180",
            "--rake-margin-pct",
            "20",
            "--rake-min",
            "-60",
        ]);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan subcommand");
        };
        let config = args.config.resolve().unwrap();
        assert_eq!(config.pt_inlet, 180.0);
        assert_relative_eq!(config.rake_margin_percent, 0.2);
        assert_eq!(config.rake_min, -60.0);
        assert_eq!(config.ambient, 101.325);
        assert!(!args.json);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = ConfigArgs {
            ambient: Some(0.0),
            ..ConfigArgs::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_demo_defaults() {
        let cli = Cli::parse_from(["turbine-matrix", "-v", "demo"]);
        assert!(cli.verbose);
        match cli.command {
            Command::Demo { output, seed } => {
                assert_eq!(output, PathBuf::from("demo_cfd_data.csv"));
                assert_eq!(seed, DEFAULT_SEED);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
