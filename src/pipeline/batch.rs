use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, span, warn, Level};

use crate::domain::params::CostParameters;
use crate::domain::types::{BranchSummary, CheckInEvent, CostBreakdown, DriverTrajectory};
use crate::evaluation::cost::compute_cost;
use crate::evaluation::summary::summarize_branches;
use crate::io::csv_io::RawCheckIn;
use crate::trajectory::reconstruct_trajectory;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub driver_costs: Vec<CostBreakdown>,
    pub branch_summary: Vec<BranchSummary>,
}

impl PipelineOutput {
    pub fn is_empty(&self) -> bool {
        self.driver_costs.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.driver_costs.iter().map(|c| c.total_cost).sum()
    }
}

/// Trajectories for one batch of check-ins. They do not depend on cost
/// parameters, so one batch can be evaluated under any number of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedBatch {
    trajectories: Vec<DriverTrajectory>,
    dropped: usize,
}

impl PreparedBatch {
    pub fn from_raw(rows: Vec<RawCheckIn>) -> Self {
        let total = rows.len();
        let events: Vec<CheckInEvent> = rows
            .into_iter()
            .filter_map(RawCheckIn::into_event)
            .collect();
        let unusable = total - events.len();
        let mut batch = Self::from_events(events);
        batch.dropped += unusable;
        batch
    }

    pub fn from_events(events: Vec<CheckInEvent>) -> Self {
        let span = span!(Level::INFO, "prepare_batch", events = events.len());
        let _guard = span.enter();

        let before = events.len();
        let events: Vec<CheckInEvent> = events.into_iter().filter(has_coordinates).collect();
        let dropped = before - events.len();
        if dropped > 0 {
            warn!("Dropped {} check-ins with missing driver or coordinates", dropped);
        }

        let groups = partition_by_driver(events);
        debug!("Partitioned check-ins into {} drivers", groups.len());

        let trajectories: Vec<DriverTrajectory> = groups
            .par_iter()
            .filter_map(|(_, driver_events)| reconstruct_trajectory(driver_events))
            .collect();

        info!("Reconstructed {} driver trajectories", trajectories.len());
        Self {
            trajectories,
            dropped,
        }
    }

    pub fn trajectories(&self) -> &[DriverTrajectory] {
        &self.trajectories
    }

    /// Check-ins removed for missing driver or coordinates.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Cost every trajectory under `params` and summarise by branch.
    pub fn evaluate(&self, params: &CostParameters) -> PipelineOutput {
        let driver_costs: Vec<CostBreakdown> = self
            .trajectories
            .par_iter()
            .map(|t| compute_cost(t, params))
            .collect();
        let branch_summary = summarize_branches(&driver_costs);

        debug!(
            "Evaluated {} drivers across {} branches",
            driver_costs.len(),
            branch_summary.len()
        );
        PipelineOutput {
            driver_costs,
            branch_summary,
        }
    }
}

fn has_coordinates(event: &CheckInEvent) -> bool {
    !event.driver_id.trim().is_empty()
        && [
            event.latitude,
            event.longitude,
            event.matched_depot_latitude,
            event.matched_depot_longitude,
        ]
        .iter()
        .all(|v| !v.is_nan())
}

/// Check-ins grouped by driver, drivers in id order, each group in input order.
pub fn partition_by_driver(events: Vec<CheckInEvent>) -> Vec<(String, Vec<CheckInEvent>)> {
    events
        .into_iter()
        .into_group_map_by(|e| e.driver_id.clone())
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect()
}

pub fn run_pipeline(events: Vec<CheckInEvent>, params: &CostParameters) -> PipelineOutput {
    PreparedBatch::from_events(events).evaluate(params)
}
