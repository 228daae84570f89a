//! CSV boundary: matched check-ins in, cost tables out.

use std::error::Error;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::domain::types::{BranchSummary, CheckInEvent, CostBreakdown};
use crate::utils::parse_timestamp;

pub const DRIVER_COST_COLUMNS: [&str; 14] = [
    "driver_id",
    "delivery_date",
    "branch_name",
    "total_distance_km",
    "duration_hours",
    "point_count",
    "fuel_cost",
    "toll_cost",
    "mileage_cost",
    "time_cost",
    "fixed_cost",
    "total_cost",
    "avg_cost_per_point",
    "cost_efficiency",
];

pub const BRANCH_SUMMARY_COLUMNS: [&str; 9] = [
    "branch_name",
    "driver_count",
    "total_distance_km",
    "mean_distance_km",
    "total_points",
    "total_cost",
    "mean_cost",
    "mean_avg_cost_per_point",
    "mean_cost_efficiency",
];

/// One row of the matched check-in file, before validation. Unparseable
/// numbers read as `None` so a bad cell drops its row, not the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCheckIn {
    pub driver_id: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
    pub delivery_address: Option<String>,
    pub receiver_name: Option<String>,
    pub matched_branch_name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub matched_depot_latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub matched_depot_longitude: Option<f64>,
}

impl RawCheckIn {
    /// `None` when the driver, any coordinate, or the timestamp is missing
    /// or unusable.
    pub fn into_event(self) -> Option<CheckInEvent> {
        let driver_id = self.driver_id.filter(|id| !id.trim().is_empty())?;
        let latitude = self.latitude.filter(|v| !v.is_nan())?;
        let longitude = self.longitude.filter(|v| !v.is_nan())?;
        let matched_depot_latitude = self.matched_depot_latitude.filter(|v| !v.is_nan())?;
        let matched_depot_longitude = self.matched_depot_longitude.filter(|v| !v.is_nan())?;
        let timestamp = self.timestamp.as_deref().and_then(parse_timestamp)?;

        Some(CheckInEvent {
            driver_id,
            timestamp,
            latitude,
            longitude,
            delivery_address: self.delivery_address.unwrap_or_default(),
            receiver_name: self.receiver_name.filter(|n| !n.trim().is_empty()),
            matched_branch_name: self.matched_branch_name.unwrap_or_default(),
            matched_depot_latitude,
            matched_depot_longitude,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub events: Vec<CheckInEvent>,
    pub dropped: usize,
}

pub fn read_checkins<R: Read>(reader: R) -> Result<IngestReport, Box<dyn Error>> {
    // Flexible: a short row reads with its trailing fields missing.
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = IngestReport::default();
    for (idx, row) in reader.deserialize::<RawCheckIn>().enumerate() {
        let raw = match row {
            Ok(raw) => raw,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                trace!("Dropping malformed check-in row {}: {}", idx + 1, err);
                report.dropped += 1;
                continue;
            }
        };

        match raw.into_event() {
            Some(event) => report.events.push(event),
            None => {
                trace!(
                    "Dropping check-in row {} (missing driver, coordinates or time)",
                    idx + 1
                );
                report.dropped += 1;
            }
        }
    }

    if report.dropped > 0 {
        warn!(
            "Dropped {} check-in rows with missing driver, coordinates or timestamp",
            report.dropped
        );
    }
    debug!("Read {} usable check-ins", report.events.len());
    Ok(report)
}

pub fn read_checkins_from_path(path: impl AsRef<Path>) -> Result<IngestReport, Box<dyn Error>> {
    let path = path.as_ref();
    info!("Reading check-ins from {}", path.display());
    read_checkins(File::open(path)?)
}

fn write_rows<W: Write, T: Serialize>(
    writer: W,
    header: &[&str],
    rows: &[T],
) -> Result<(), Box<dyn Error>> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_driver_costs<W: Write>(
    writer: W,
    costs: &[CostBreakdown],
) -> Result<(), Box<dyn Error>> {
    write_rows(writer, &DRIVER_COST_COLUMNS, costs)
}

pub fn write_branch_summary<W: Write>(
    writer: W,
    summaries: &[BranchSummary],
) -> Result<(), Box<dyn Error>> {
    write_rows(writer, &BRANCH_SUMMARY_COLUMNS, summaries)
}
