use std::env;
use std::path::PathBuf;

use dotenv::dotenv;
use tracing::{info, warn};

pub mod constant {
    pub(crate) const EARTH_RADIUS_KM: f64 = 6371.0;

    // Duration assigned to a run with fewer than two check-ins.
    pub(crate) const SINGLE_POINT_DURATION_HOURS: f64 = 0.5;
    pub(crate) const MIN_EFFICIENCY_DISTANCE_KM: f64 = 0.1;

    pub(crate) const DEFAULT_FUEL_PRICE: f64 = 7.5;
    pub(crate) const DEFAULT_FUEL_CONSUMPTION: f64 = 8.0;
    pub(crate) const DEFAULT_TOLL_RATE: f64 = 0.45;
    pub(crate) const DEFAULT_DRIVER_HOURLY_WAGE: f64 = 25.0;
    pub(crate) const DEFAULT_VEHICLE_DEPRECIATION: f64 = 150.0;
    pub(crate) const DEFAULT_INSURANCE_DAILY: f64 = 50.0;

    pub(crate) const SENSITIVITY_FACTOR: f64 = 1.2;

    pub(crate) const DEFAULT_OUTPUT_DIR: &str = "output";
    pub(crate) const DRIVER_COSTS_FILE: &str = "driver_costs.csv";
    pub(crate) const BRANCH_SUMMARY_FILE: &str = "branch_summary.csv";

    pub(crate) const SEED: u64 = 64;
}

/// Settings for one batch run, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Matched check-in CSV. `None` runs on a generated batch.
    pub checkin_csv_path: Option<PathBuf>,
    /// JSON cost parameters. `None` uses the defaults.
    pub cost_params_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub run_sensitivity: bool,
}

impl RunConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        let checkin_csv_path = env::var("CHECKIN_CSV_PATH").ok().map(PathBuf::from);
        if checkin_csv_path.is_none() {
            warn!("CHECKIN_CSV_PATH not set, using a generated check-in batch");
        }

        let cost_params_path = env::var("COST_PARAMS_PATH").ok().map(PathBuf::from);
        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(constant::DEFAULT_OUTPUT_DIR));
        let run_sensitivity = env::var("RUN_SENSITIVITY")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        info!(
            "Run config: input={:?}, params={:?}, output_dir={}, sensitivity={}",
            checkin_csv_path,
            cost_params_path,
            output_dir.display(),
            run_sensitivity
        );

        Self {
            checkin_csv_path,
            cost_params_path,
            output_dir,
            run_sensitivity,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
