use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

use tracing::{info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::constant::{BRANCH_SUMMARY_FILE, DRIVER_COSTS_FILE, SENSITIVITY_FACTOR};
use crate::config::RunConfig;
use crate::domain::params::CostParameters;
use crate::evaluation::overview::{rank_by_efficiency, rank_by_points, CostOverview};
use crate::fixtures::data_generator::{generate_checkins, GeneratorConfig};
use crate::io::csv_io::{read_checkins_from_path, write_branch_summary, write_driver_costs};
use crate::pipeline::batch::{PipelineOutput, PreparedBatch};
use crate::pipeline::sensitivity::sensitivity_sweep;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_span_events(fmt::format::FmtSpan::CLOSE))
        .init();
}

/// Cost parameters are resolved before any check-in is read.
fn load_params(config: &RunConfig) -> Result<CostParameters, Box<dyn Error>> {
    match &config.cost_params_path {
        Some(path) => Ok(CostParameters::load_json(path)?),
        None => {
            info!("COST_PARAMS_PATH not set, using default cost parameters");
            Ok(CostParameters::default())
        }
    }
}

fn load_batch(config: &RunConfig) -> Result<PreparedBatch, Box<dyn Error>> {
    let (events, unusable) = match &config.checkin_csv_path {
        Some(path) => {
            let report = read_checkins_from_path(path)?;
            (report.events, report.dropped)
        }
        None => (generate_checkins(&GeneratorConfig::default()), 0),
    };

    let batch = PreparedBatch::from_events(events);
    info!(
        "{} rows unusable at ingestion, {} dropped before reconstruction",
        unusable,
        batch.dropped()
    );
    Ok(batch)
}

fn save_outputs(
    output: &PipelineOutput,
    params: &CostParameters,
    dir: &Path,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;

    let driver_path = dir.join(DRIVER_COSTS_FILE);
    write_driver_costs(File::create(&driver_path)?, &output.driver_costs)?;
    let branch_path = dir.join(BRANCH_SUMMARY_FILE);
    write_branch_summary(File::create(&branch_path)?, &output.branch_summary)?;
    params.save_json(dir.join("cost_params.json"))?;

    info!(
        "Wrote {} driver rows to {} and {} branch rows to {}",
        output.driver_costs.len(),
        driver_path.display(),
        output.branch_summary.len(),
        branch_path.display()
    );
    Ok(())
}

fn report_overview(output: &PipelineOutput) {
    let Some(overview) = CostOverview::from_breakdowns(&output.driver_costs) else {
        warn!("No usable check-ins in batch, nothing to report");
        return;
    };

    info!(
        "{} drivers, {} points, {:.2} km, total cost {:.2} ({:.2} per point)",
        overview.driver_count,
        overview.total_points,
        overview.total_distance_km,
        overview.total_cost,
        overview.cost_per_point
    );
    info!(
        "Cost structure - mileage {:.2} ({:.1}%, fuel {:.2}, toll {:.2}), time {:.2} ({:.1}%), fixed {:.2} ({:.1}%)",
        overview.mileage_cost,
        overview.mileage_share_pct,
        overview.fuel_cost,
        overview.toll_cost,
        overview.time_cost,
        overview.time_share_pct,
        overview.fixed_cost,
        overview.fixed_share_pct
    );
    info!(
        "Cheapest driver {} ({:.2}/point), costliest {} ({:.2}/point), spread {:?}",
        overview.cheapest_driver.driver_id,
        overview.cheapest_driver.avg_cost_per_point,
        overview.costliest_driver.driver_id,
        overview.costliest_driver.avg_cost_per_point,
        overview.driver_spread()
    );

    for (rank, branch) in rank_by_efficiency(&output.branch_summary).iter().enumerate() {
        info!(
            "Efficiency #{}: {} {:.2}/km",
            rank + 1,
            branch.branch_name,
            branch.mean_cost_efficiency
        );
    }
    for (rank, branch) in rank_by_points(&output.branch_summary).iter().enumerate() {
        info!(
            "Volume #{}: {} {} points",
            rank + 1,
            branch.branch_name,
            branch.total_points
        );
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let config = RunConfig::from_env();

    let params = load_params(&config)?;

    let batch = {
        let span = span!(Level::INFO, "load");
        let _guard = span.enter();
        load_batch(&config)?
    };

    let output = {
        let span = span!(Level::INFO, "evaluate");
        let _guard = span.enter();
        batch.evaluate(&params)
    };

    report_overview(&output);
    save_outputs(&output, &params, &config.output_dir)?;

    if config.run_sensitivity && !batch.is_empty() {
        sensitivity_sweep(&batch, &params, SENSITIVITY_FACTOR)?;
    }

    Ok(())
}
