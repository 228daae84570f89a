use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::distance::Coordinates;

/// One GPS-stamped delivery record, already matched to a branch depot.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInEvent {
    pub driver_id: String,
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub delivery_address: String,
    pub receiver_name: Option<String>,
    pub matched_branch_name: String,
    pub matched_depot_latitude: f64,
    pub matched_depot_longitude: f64,
}

impl CheckInEvent {
    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn depot(&self) -> Coordinates {
        Coordinates::new(self.matched_depot_latitude, self.matched_depot_longitude)
    }

    pub fn delivery_date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryPoint {
    pub lat: f64,
    pub lon: f64,
    pub time: NaiveDateTime,
    pub address: String,
    pub receiver_name: Option<String>,
}

impl DeliveryPoint {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// A driver's day: depot followed by check-ins in time order.
///
/// `segment_distances[0]` is depot to first point, `segment_distances[i]`
/// is point `i - 1` to point `i`. Distances are not rounded here.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverTrajectory {
    pub driver_id: String,
    pub delivery_date: NaiveDate,
    pub branch_name: String,
    pub depot: Coordinates,
    pub points: Vec<DeliveryPoint>,
    pub segment_distances: Vec<f64>,
    pub total_distance_km: f64,
    pub duration_hours: f64,
    pub point_count: usize,
}

/// Per-driver cost record. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub driver_id: String,
    pub delivery_date: NaiveDate,
    pub branch_name: String,
    pub total_distance_km: f64,
    pub duration_hours: f64,
    pub point_count: usize,
    pub fuel_cost: f64,
    pub toll_cost: f64,
    pub mileage_cost: f64,
    pub time_cost: f64,
    pub fixed_cost: f64,
    pub total_cost: f64,
    pub avg_cost_per_point: f64,
    pub cost_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSummary {
    pub branch_name: String,
    pub driver_count: usize,
    pub total_distance_km: f64,
    pub mean_distance_km: f64,
    pub total_points: usize,
    pub total_cost: f64,
    pub mean_cost: f64,
    pub mean_avg_cost_per_point: f64,
    pub mean_cost_efficiency: f64,
}
