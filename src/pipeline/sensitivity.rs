//! What-if analysis over cost parameters.
//!
//! Every scenario reuses the batch's trajectories and gets its own
//! immutable `CostParameters`, so scenarios evaluate in parallel.

use rayon::prelude::*;
use tracing::{info, span, Level};

use crate::domain::params::{CostParameters, ParamKey, ParamsError};
use crate::domain::types::CostBreakdown;
use crate::pipeline::batch::PreparedBatch;
use crate::utils::round2;

#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityResult {
    pub key: ParamKey,
    pub base_value: f64,
    pub scenario_value: f64,
    pub base_total_cost: f64,
    pub scenario_total_cost: f64,
    pub cost_change: f64,
    pub cost_change_pct: f64,
}

/// Scale each parameter by `factor` on its own and report the change in
/// fleet total cost.
pub fn sensitivity_sweep(
    batch: &PreparedBatch,
    base: &CostParameters,
    factor: f64,
) -> Result<Vec<SensitivityResult>, ParamsError> {
    let span = span!(Level::INFO, "sensitivity_sweep", factor = factor);
    let _guard = span.enter();

    // Validate every scenario before computing any of them.
    let scenarios: Vec<(ParamKey, CostParameters)> = ParamKey::ALL
        .iter()
        .map(|&key| Ok((key, base.with(key, base.get(key) * factor)?)))
        .collect::<Result<_, ParamsError>>()?;

    let base_total = batch.evaluate(base).total_cost();

    let results: Vec<SensitivityResult> = scenarios
        .par_iter()
        .map(|(key, params)| {
            let scenario_total = batch.evaluate(params).total_cost();
            let change = scenario_total - base_total;
            SensitivityResult {
                key: *key,
                base_value: base.get(*key),
                scenario_value: params.get(*key),
                base_total_cost: round2(base_total),
                scenario_total_cost: round2(scenario_total),
                cost_change: round2(change),
                cost_change_pct: round2(percent(change, base_total)),
            }
        })
        .collect();

    for r in &results {
        info!(
            "{} {} -> {}: total {:.2} -> {:.2} ({:+.2}, {:+.1}%)",
            r.key,
            r.base_value,
            r.scenario_value,
            r.base_total_cost,
            r.scenario_total_cost,
            r.cost_change,
            r.cost_change_pct
        );
    }

    Ok(results)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamChange {
    pub key: ParamKey,
    pub old_value: f64,
    pub new_value: f64,
    pub change: f64,
    pub change_pct: f64,
}

/// Before/after view of two runs over the same check-ins.
#[derive(Debug, Clone, PartialEq)]
pub struct RunComparison {
    pub old_total_cost: f64,
    pub new_total_cost: f64,
    pub total_cost_change: f64,
    pub total_cost_change_pct: f64,
    pub old_mean_cost_per_point: f64,
    pub new_mean_cost_per_point: f64,
    pub mean_cost_per_point_change: f64,
    pub mean_cost_per_point_change_pct: f64,
    pub changed_params: Vec<ParamChange>,
}

pub fn compare_runs(
    old_costs: &[CostBreakdown],
    new_costs: &[CostBreakdown],
    old_params: &CostParameters,
    new_params: &CostParameters,
) -> RunComparison {
    let old_total: f64 = old_costs.iter().map(|c| c.total_cost).sum();
    let new_total: f64 = new_costs.iter().map(|c| c.total_cost).sum();
    let old_avg = mean_cost_per_point(old_costs);
    let new_avg = mean_cost_per_point(new_costs);

    let changed_params = ParamKey::ALL
        .iter()
        .filter(|&&key| old_params.get(key) != new_params.get(key))
        .map(|&key| {
            let (old_value, new_value) = (old_params.get(key), new_params.get(key));
            ParamChange {
                key,
                old_value,
                new_value,
                change: round2(new_value - old_value),
                change_pct: round2(percent(new_value - old_value, old_value)),
            }
        })
        .collect();

    RunComparison {
        old_total_cost: round2(old_total),
        new_total_cost: round2(new_total),
        total_cost_change: round2(new_total - old_total),
        total_cost_change_pct: round2(percent(new_total - old_total, old_total)),
        old_mean_cost_per_point: round2(old_avg),
        new_mean_cost_per_point: round2(new_avg),
        mean_cost_per_point_change: round2(new_avg - old_avg),
        mean_cost_per_point_change_pct: round2(percent(new_avg - old_avg, old_avg)),
        changed_params,
    }
}

fn mean_cost_per_point(costs: &[CostBreakdown]) -> f64 {
    if costs.is_empty() {
        return 0.0;
    }
    costs.iter().map(|c| c.avg_cost_per_point).sum::<f64>() / costs.len() as f64
}

fn percent(change: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        change / base * 100.0
    }
}
