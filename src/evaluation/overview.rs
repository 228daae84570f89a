use std::cmp::Ordering;

use crate::domain::types::{BranchSummary, CostBreakdown};
use crate::utils::{floored_div, round2};

#[derive(Debug, Clone, PartialEq)]
pub struct DriverHighlight {
    pub driver_id: String,
    pub branch_name: String,
    pub avg_cost_per_point: f64,
}

/// Fleet-wide cost totals and component shares (percent of total cost).
#[derive(Debug, Clone, PartialEq)]
pub struct CostOverview {
    pub driver_count: usize,
    pub total_points: usize,
    pub total_distance_km: f64,
    pub total_cost: f64,
    pub fuel_cost: f64,
    pub toll_cost: f64,
    pub mileage_cost: f64,
    pub time_cost: f64,
    pub fixed_cost: f64,
    pub mileage_share_pct: f64,
    pub time_share_pct: f64,
    pub fixed_share_pct: f64,
    pub cost_per_point: f64,
    pub cheapest_driver: DriverHighlight,
    pub costliest_driver: DriverHighlight,
}

impl CostOverview {
    pub fn from_breakdowns(costs: &[CostBreakdown]) -> Option<Self> {
        let first = costs.first()?;

        let mut total_points = 0;
        let (mut distance, mut total, mut fuel, mut toll, mut mileage, mut time, mut fixed) =
            (0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut cheapest = first;
        let mut costliest = first;

        for c in costs {
            total_points += c.point_count;
            distance += c.total_distance_km;
            total += c.total_cost;
            fuel += c.fuel_cost;
            toll += c.toll_cost;
            mileage += c.mileage_cost;
            time += c.time_cost;
            fixed += c.fixed_cost;

            if c.avg_cost_per_point < cheapest.avg_cost_per_point {
                cheapest = c;
            }
            if c.avg_cost_per_point > costliest.avg_cost_per_point {
                costliest = c;
            }
        }

        let share = |part: f64| {
            if total > 0.0 {
                round2(part / total * 100.0)
            } else {
                0.0
            }
        };

        Some(Self {
            driver_count: costs.len(),
            total_points,
            total_distance_km: round2(distance),
            total_cost: round2(total),
            fuel_cost: round2(fuel),
            toll_cost: round2(toll),
            mileage_cost: round2(mileage),
            time_cost: round2(time),
            fixed_cost: round2(fixed),
            mileage_share_pct: share(mileage),
            time_share_pct: share(time),
            fixed_share_pct: share(fixed),
            cost_per_point: round2(floored_div(total, total_points as f64, 1.0)),
            cheapest_driver: highlight(cheapest),
            costliest_driver: highlight(costliest),
        })
    }

    /// Best-to-worst spread in cost per point, e.g. 2.5 means the costliest
    /// driver spends 2.5x the cheapest per delivery.
    pub fn driver_spread(&self) -> Option<f64> {
        let best = self.cheapest_driver.avg_cost_per_point;
        (best > 0.0).then(|| round2(self.costliest_driver.avg_cost_per_point / best))
    }
}

fn highlight(cost: &CostBreakdown) -> DriverHighlight {
    DriverHighlight {
        driver_id: cost.driver_id.clone(),
        branch_name: cost.branch_name.clone(),
        avg_cost_per_point: cost.avg_cost_per_point,
    }
}

/// Branches from cheapest to dearest per km.
pub fn rank_by_efficiency(summaries: &[BranchSummary]) -> Vec<&BranchSummary> {
    let mut ranked: Vec<&BranchSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| {
        a.mean_cost_efficiency
            .total_cmp(&b.mean_cost_efficiency)
            .then_with(|| a.branch_name.cmp(&b.branch_name))
    });
    ranked
}

/// Branches by delivery volume, largest first.
pub fn rank_by_points(summaries: &[BranchSummary]) -> Vec<&BranchSummary> {
    let mut ranked: Vec<&BranchSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| match b.total_points.cmp(&a.total_points) {
        Ordering::Equal => a.branch_name.cmp(&b.branch_name),
        other => other,
    });
    ranked
}
