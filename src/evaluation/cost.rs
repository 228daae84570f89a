use tracing::trace;

use crate::config::constant::MIN_EFFICIENCY_DISTANCE_KM;
use crate::domain::params::CostParameters;
use crate::domain::types::{CostBreakdown, DriverTrajectory};
use crate::utils::{floored_div, round2};

/// Decompose one trajectory's cost. All arithmetic runs at full precision;
/// rounding to cents happens only when the record is filled in.
pub fn compute_cost(trajectory: &DriverTrajectory, params: &CostParameters) -> CostBreakdown {
    let distance = trajectory.total_distance_km;
    let points = trajectory.point_count as f64;

    let fuel_cost = distance * params.fuel_price() * params.fuel_consumption() / 100.0;
    let toll_cost = distance * params.toll_rate();
    let mileage_cost = fuel_cost + toll_cost;

    let time_cost = trajectory.duration_hours * params.driver_hourly_wage();

    // Amortised per point first so that an empty trajectory carries no fixed cost.
    let fixed_cost_per_point = if trajectory.point_count > 0 {
        floored_div(params.daily_fixed_cost(), points, 1.0)
    } else {
        0.0
    };
    let fixed_cost = fixed_cost_per_point * points;

    let total_cost = mileage_cost + time_cost + fixed_cost;
    let avg_cost_per_point = floored_div(total_cost, points, 1.0);
    let cost_efficiency = floored_div(total_cost, distance, MIN_EFFICIENCY_DISTANCE_KM);

    trace!(
        "Driver {}: mileage {:.4}, time {:.4}, fixed {:.4}, total {:.4}",
        trajectory.driver_id,
        mileage_cost,
        time_cost,
        fixed_cost,
        total_cost
    );

    CostBreakdown {
        driver_id: trajectory.driver_id.clone(),
        delivery_date: trajectory.delivery_date,
        branch_name: trajectory.branch_name.clone(),
        total_distance_km: round2(distance),
        duration_hours: round2(trajectory.duration_hours),
        point_count: trajectory.point_count,
        fuel_cost: round2(fuel_cost),
        toll_cost: round2(toll_cost),
        mileage_cost: round2(mileage_cost),
        time_cost: round2(time_cost),
        fixed_cost: round2(fixed_cost),
        total_cost: round2(total_cost),
        avg_cost_per_point: round2(avg_cost_per_point),
        cost_efficiency: round2(cost_efficiency),
    }
}
