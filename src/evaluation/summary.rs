use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::domain::types::{BranchSummary, CostBreakdown};
use crate::utils::round2;

/// Running sums for one branch. Partial accumulators built over disjoint
/// shards can be merged; means are only derived in `finish`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchAccumulator {
    drivers: BTreeSet<String>,
    records: usize,
    total_distance_km: f64,
    total_points: usize,
    total_cost: f64,
    sum_avg_cost_per_point: f64,
    sum_cost_efficiency: f64,
}

impl BranchAccumulator {
    pub fn add(&mut self, cost: &CostBreakdown) {
        self.drivers.insert(cost.driver_id.clone());
        self.records += 1;
        self.total_distance_km += cost.total_distance_km;
        self.total_points += cost.point_count;
        self.total_cost += cost.total_cost;
        self.sum_avg_cost_per_point += cost.avg_cost_per_point;
        self.sum_cost_efficiency += cost.cost_efficiency;
    }

    pub fn merge(&mut self, other: BranchAccumulator) {
        self.drivers.extend(other.drivers);
        self.records += other.records;
        self.total_distance_km += other.total_distance_km;
        self.total_points += other.total_points;
        self.total_cost += other.total_cost;
        self.sum_avg_cost_per_point += other.sum_avg_cost_per_point;
        self.sum_cost_efficiency += other.sum_cost_efficiency;
    }

    pub fn finish(&self, branch_name: &str) -> BranchSummary {
        let n = self.records.max(1) as f64;
        BranchSummary {
            branch_name: branch_name.to_string(),
            driver_count: self.drivers.len(),
            total_distance_km: round2(self.total_distance_km),
            mean_distance_km: round2(self.total_distance_km / n),
            total_points: self.total_points,
            total_cost: round2(self.total_cost),
            mean_cost: round2(self.total_cost / n),
            mean_avg_cost_per_point: round2(self.sum_avg_cost_per_point / n),
            mean_cost_efficiency: round2(self.sum_cost_efficiency / n),
        }
    }
}

/// Branch name to accumulator, in branch name order.
pub type BranchAccumulators = BTreeMap<String, BranchAccumulator>;

pub fn accumulate(costs: &[CostBreakdown]) -> BranchAccumulators {
    let mut groups = BranchAccumulators::new();
    for cost in costs {
        groups
            .entry(cost.branch_name.clone())
            .or_default()
            .add(cost);
    }
    groups
}

/// Combine shard results; a branch seen in several shards is summed, not averaged.
pub fn merge_accumulators(
    mut left: BranchAccumulators,
    right: BranchAccumulators,
) -> BranchAccumulators {
    for (branch, acc) in right {
        left.entry(branch).or_default().merge(acc);
    }
    left
}

pub fn finish_summaries(groups: &BranchAccumulators) -> Vec<BranchSummary> {
    groups
        .iter()
        .map(|(branch, acc)| acc.finish(branch))
        .collect()
}

/// One summary row per branch, sorted by branch name. Empty in, empty out.
pub fn summarize_branches(costs: &[CostBreakdown]) -> Vec<BranchSummary> {
    let summaries = finish_summaries(&accumulate(costs));
    debug!(
        "Summarised {} driver records into {} branches",
        costs.len(),
        summaries.len()
    );
    summaries
}
