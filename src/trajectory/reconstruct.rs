use tracing::{debug, trace, warn};

use crate::config::constant::SINGLE_POINT_DURATION_HOURS;
use crate::distance::Coordinates;
use crate::domain::types::{CheckInEvent, DeliveryPoint, DriverTrajectory};

/// Build one driver's trajectory from their check-ins, in any order.
///
/// Returns `None` for an empty slice. Branch, depot and delivery date come
/// from the first event as given, not the earliest one; a driver whose
/// check-ins were matched to several branches is logged and otherwise left
/// as is.
pub fn reconstruct_trajectory(events: &[CheckInEvent]) -> Option<DriverTrajectory> {
    let first = events.first()?;
    debug_assert!(
        events.iter().all(|e| e.driver_id == first.driver_id),
        "reconstruct_trajectory called with mixed drivers"
    );

    if let Some(other) = events
        .iter()
        .find(|e| e.matched_branch_name != first.matched_branch_name)
    {
        warn!(
            "Driver {} has check-ins matched to several branches ('{}', '{}'); using '{}'",
            first.driver_id,
            first.matched_branch_name,
            other.matched_branch_name,
            first.matched_branch_name
        );
    }

    let depot = first.depot();

    // Stable: check-ins with equal timestamps keep their input order.
    let mut sorted: Vec<&CheckInEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let points: Vec<DeliveryPoint> = sorted
        .iter()
        .map(|e| DeliveryPoint {
            lat: e.latitude,
            lon: e.longitude,
            time: e.timestamp,
            address: e.delivery_address.clone(),
            receiver_name: e.receiver_name.clone(),
        })
        .collect();

    let segment_distances = segment_distances(&depot, &points);
    let total_distance_km: f64 = segment_distances.iter().sum();
    let duration_hours = duration_hours(&points);

    debug!(
        "Driver {}: {} points, {:.2} km, {:.2} h",
        first.driver_id,
        points.len(),
        total_distance_km,
        duration_hours
    );

    Some(DriverTrajectory {
        driver_id: first.driver_id.clone(),
        delivery_date: first.delivery_date(),
        branch_name: first.matched_branch_name.clone(),
        depot,
        point_count: points.len(),
        points,
        segment_distances,
        total_distance_km,
        duration_hours,
    })
}

/// Depot to first point, then each consecutive pair.
fn segment_distances(depot: &Coordinates, points: &[DeliveryPoint]) -> Vec<f64> {
    let mut segments = Vec::with_capacity(points.len());
    let mut prev = *depot;

    for (i, point) in points.iter().enumerate() {
        let here = point.coords();
        let dist = prev.distance_km(&here);
        trace!("segment {}: {:?} -> {:?} = {:.3} km", i, prev, here, dist);
        segments.push(dist);
        prev = here;
    }

    segments
}

fn duration_hours(points: &[DeliveryPoint]) -> f64 {
    match (points.first(), points.last()) {
        (Some(start), Some(end)) if points.len() >= 2 => {
            (end.time - start.time).num_milliseconds() as f64 / 3_600_000.0
        }
        _ => SINGLE_POINT_DURATION_HOURS,
    }
}
