//! End-to-end pipeline tests
//!
//! Raw check-ins through trajectories, costs and branch summaries.

use std::fs::{self, File};

use chrono::{NaiveDate, NaiveDateTime};

use delivery_cost::domain::{CheckInEvent, CostParameters, ParamKey};
use delivery_cost::fixtures::{generate_checkins, GeneratorConfig};
use delivery_cost::io::{
    read_checkins_from_path, write_branch_summary, write_driver_costs, RawCheckIn,
};
use delivery_cost::pipeline::{partition_by_driver, run_pipeline, sensitivity_sweep, PreparedBatch};

// ============================================================================
// Fixtures
// ============================================================================

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, 20)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn checkin(driver: &str, branch: &str, lat: f64, lon: f64, time: NaiveDateTime) -> CheckInEvent {
    CheckInEvent {
        driver_id: driver.to_string(),
        timestamp: time,
        latitude: lat,
        longitude: lon,
        delivery_address: format!("{lat},{lon}"),
        receiver_name: None,
        matched_branch_name: branch.to_string(),
        matched_depot_latitude: 25.80,
        matched_depot_longitude: 114.90,
    }
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn single_checkin_north_of_depot() {
    let events = vec![checkin("d1", "North", 25.90, 114.90, at(9, 0))];
    let out = run_pipeline(events, &CostParameters::default());

    assert_eq!(out.driver_costs.len(), 1);
    let c = &out.driver_costs[0];
    assert!(close(c.total_distance_km, 11.1, 0.05), "distance {}", c.total_distance_km);
    assert_eq!(c.duration_hours, 0.5);
    assert_eq!(c.point_count, 1);
    assert!(close(c.fuel_cost, 6.66, 0.02), "fuel {}", c.fuel_cost);
    assert!(close(c.toll_cost, 5.0, 0.01), "toll {}", c.toll_cost);
    assert!(close(c.mileage_cost, 11.66, 0.03), "mileage {}", c.mileage_cost);
    assert_eq!(c.time_cost, 12.5);
    assert_eq!(c.fixed_cost, 200.0);
    assert!(close(c.total_cost, 224.16, 0.03), "total {}", c.total_cost);
    assert_eq!(c.avg_cost_per_point, c.total_cost);

    assert_eq!(out.branch_summary.len(), 1);
    assert_eq!(out.branch_summary[0].branch_name, "North");
    assert_eq!(out.branch_summary[0].driver_count, 1);
    assert_eq!(out.branch_summary[0].total_cost, c.total_cost);
}

#[test]
fn empty_batch_gives_empty_tables() {
    let out = run_pipeline(Vec::new(), &CostParameters::default());
    assert!(out.driver_costs.is_empty());
    assert!(out.branch_summary.is_empty());
}

#[test]
fn rows_without_coordinates_are_dropped() {
    let mut missing = checkin("d2", "North", f64::NAN, 114.90, at(9, 0));
    missing.delivery_address = "nowhere".to_string();
    let events = vec![
        checkin("d1", "North", 25.90, 114.90, at(9, 0)),
        missing,
        checkin("", "North", 25.90, 114.90, at(9, 0)),
    ];

    let batch = PreparedBatch::from_events(events);
    assert_eq!(batch.dropped(), 2);
    assert_eq!(batch.trajectories().len(), 1);
    assert_eq!(batch.trajectories()[0].driver_id, "d1");
}

#[test]
fn raw_rows_are_filtered_before_partitioning() {
    let good = RawCheckIn {
        driver_id: Some("d1".into()),
        timestamp: Some("2025-08-20 09:00:00".into()),
        latitude: Some(25.90),
        longitude: Some(114.90),
        matched_branch_name: Some("North".into()),
        matched_depot_latitude: Some(25.80),
        matched_depot_longitude: Some(114.90),
        ..RawCheckIn::default()
    };
    let no_depot = RawCheckIn {
        matched_depot_longitude: None,
        ..good.clone()
    };
    let no_driver = RawCheckIn {
        driver_id: None,
        ..good.clone()
    };

    let batch = PreparedBatch::from_raw(vec![good, no_depot, no_driver]);
    assert_eq!(batch.dropped(), 2);
    assert_eq!(batch.trajectories().len(), 1);
}

#[test]
fn drivers_are_partitioned_independently() {
    let events = vec![
        checkin("b", "South", 25.85, 114.95, at(10, 0)),
        checkin("a", "North", 25.90, 114.90, at(9, 0)),
        checkin("b", "South", 25.86, 114.96, at(8, 30)),
        checkin("a", "North", 25.95, 114.90, at(11, 0)),
    ];

    let groups = partition_by_driver(events.clone());
    let ids: Vec<&str> = groups.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(groups[1].1[0].timestamp, at(10, 0));

    let out = run_pipeline(events, &CostParameters::default());
    assert_eq!(out.driver_costs.len(), 2);
    assert_eq!(out.driver_costs[0].duration_hours, 2.0);
    assert_eq!(out.driver_costs[1].duration_hours, 1.5);
    assert_eq!(out.branch_summary.len(), 2);
}

// ============================================================================
// Properties over a generated batch
// ============================================================================

#[test]
fn branch_totals_match_driver_rows() {
    let events = generate_checkins(&GeneratorConfig::default());
    let out = run_pipeline(events, &CostParameters::default());
    assert!(!out.driver_costs.is_empty());

    for row in &out.branch_summary {
        let members: Vec<_> = out
            .driver_costs
            .iter()
            .filter(|c| c.branch_name == row.branch_name)
            .collect();
        let total: f64 = members.iter().map(|c| c.total_cost).sum();
        let points: usize = members.iter().map(|c| c.point_count).sum();

        assert_eq!(row.driver_count, members.len());
        assert!(close(row.total_cost, total, 0.005));
        assert_eq!(row.total_points, points);
    }

    let summarised: usize = out.branch_summary.iter().map(|r| r.driver_count).sum();
    assert_eq!(summarised, out.driver_costs.len());
}

#[test]
fn cost_identities_hold_for_every_driver() {
    let events = generate_checkins(&GeneratorConfig::default());
    let out = run_pipeline(events, &CostParameters::default());

    for c in &out.driver_costs {
        assert!(close(c.mileage_cost, c.fuel_cost + c.toll_cost, 0.011), "{c:?}");
        assert!(close(c.total_cost, c.mileage_cost + c.time_cost + c.fixed_cost, 0.011), "{c:?}");
        assert!(c.point_count >= 1);
        assert_eq!(c.fixed_cost, 200.0);
        assert!(c.total_cost > 0.0);
    }
}

#[test]
fn input_order_does_not_change_output() {
    let events = generate_checkins(&GeneratorConfig::default());
    let mut reversed = events.clone();
    reversed.reverse();

    let params = CostParameters::default();
    let a = run_pipeline(events, &params);
    let b = run_pipeline(reversed, &params);
    assert_eq!(a.branch_summary.len(), b.branch_summary.len());
    for (x, y) in a.driver_costs.iter().zip(&b.driver_costs) {
        assert_eq!(x.driver_id, y.driver_id);
        assert_eq!(x.total_distance_km, y.total_distance_km);
        assert_eq!(x.duration_hours, y.duration_hours);
    }
}

// ============================================================================
// Parameter hot-swap
// ============================================================================

#[test]
fn same_params_twice_is_bit_identical() {
    let batch = PreparedBatch::from_events(generate_checkins(&GeneratorConfig::default()));
    let params = CostParameters::default();
    assert_eq!(batch.evaluate(&params), batch.evaluate(&params));
}

#[test]
fn swapping_params_matches_fresh_run() {
    let events = generate_checkins(&GeneratorConfig::default());
    let batch = PreparedBatch::from_events(events.clone());
    let pricier = CostParameters::default()
        .with(ParamKey::FuelPrice, 9.0)
        .unwrap();

    let cached = batch.evaluate(&pricier);
    let fresh = run_pipeline(events, &pricier);
    assert_eq!(cached, fresh);

    let base = batch.evaluate(&CostParameters::default());
    for (old, new) in base.driver_costs.iter().zip(&cached.driver_costs) {
        assert_eq!(old.total_distance_km, new.total_distance_km);
        assert_eq!(old.toll_cost, new.toll_cost);
        assert!(new.fuel_cost >= old.fuel_cost);
    }
}

#[test]
fn sweep_raises_cost_for_every_parameter() {
    let batch = PreparedBatch::from_events(generate_checkins(&GeneratorConfig::default()));
    let base = CostParameters::default();
    let results = sensitivity_sweep(&batch, &base, 1.2).unwrap();

    assert_eq!(results.len(), ParamKey::ALL.len());
    let base_total = results[0].base_total_cost;
    for r in &results {
        assert_eq!(r.base_total_cost, base_total);
        assert!(r.cost_change > 0.0, "{:?} did not raise cost", r.key);
        assert!(close(r.scenario_value, r.base_value * 1.2, 1e-9));
    }

    // Fixed cost is 200/day per driver, so +20% depreciation adds 30 per driver.
    let depreciation = results
        .iter()
        .find(|r| r.key == ParamKey::VehicleDepreciation)
        .unwrap();
    let drivers = batch.trajectories().len() as f64;
    assert!(close(depreciation.cost_change, 30.0 * drivers, 0.01 * drivers));
}

#[test]
fn sweep_rejects_invalid_factor() {
    let batch = PreparedBatch::from_events(generate_checkins(&GeneratorConfig::default()));
    assert!(sensitivity_sweep(&batch, &CostParameters::default(), -1.0).is_err());
}

// ============================================================================
// CSV boundary
// ============================================================================

#[test]
fn csv_files_round_trip() {
    let dir = std::env::temp_dir().join(format!("delivery-cost-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let input = dir.join("checkins.csv");
    fs::write(
        &input,
        "driver_id,timestamp,latitude,longitude,delivery_address,receiver_name,matched_branch_name,matched_depot_latitude,matched_depot_longitude\n\
         d1,2025-08-20 09:00:00,25.85,114.90,1 Main St,Shop A,North,25.80,114.90\n\
         d1,2025-08-20 08:00:00,25.90,114.90,2 Main St,,North,25.80,114.90\n\
         d2,2025-08-20 10:00:00,,114.90,3 Main St,,South,25.70,114.80\n",
    )
    .unwrap();

    let report = read_checkins_from_path(&input).unwrap();
    assert_eq!(report.events.len(), 2);
    assert_eq!(report.dropped, 1);

    let out = run_pipeline(report.events, &CostParameters::default());
    assert_eq!(out.driver_costs.len(), 1);
    assert_eq!(out.driver_costs[0].duration_hours, 1.0);

    let costs_path = dir.join("driver_costs.csv");
    write_driver_costs(File::create(&costs_path).unwrap(), &out.driver_costs).unwrap();
    let summary_path = dir.join("branch_summary.csv");
    write_branch_summary(File::create(&summary_path).unwrap(), &out.branch_summary).unwrap();

    let costs_text = fs::read_to_string(&costs_path).unwrap();
    let mut lines = costs_text.lines();
    assert!(lines.next().unwrap().starts_with("driver_id,delivery_date,branch_name,"));
    assert!(lines.next().unwrap().starts_with("d1,2025-08-20,North,"));

    let mut reader = csv::Reader::from_path(&summary_path).unwrap();
    let rows: Vec<delivery_cost::domain::BranchSummary> =
        reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows, out.branch_summary);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn truncated_file_row_is_dropped() {
    let dir = std::env::temp_dir().join(format!("delivery-cost-short-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let input = dir.join("checkins.csv");
    fs::write(
        &input,
        "driver_id,timestamp,latitude,longitude,delivery_address,receiver_name,matched_branch_name,matched_depot_latitude,matched_depot_longitude\n\
         d1,2025-08-20 09:00:00,25.85,114.90,1 Main St,Shop A,North,25.80,114.90\n\
         d2,2025-08-20 09:30:00,25.91,114.91,2 Main St,,North\n\
         d3,2025-08-20 10:00:00,25.72,114.80,3 Main St,,South,25.70,114.80\n",
    )
    .unwrap();

    let report = read_checkins_from_path(&input).unwrap();
    assert_eq!(report.dropped, 1);

    let out = run_pipeline(report.events, &CostParameters::default());
    let drivers: Vec<&str> = out.driver_costs.iter().map(|c| c.driver_id.as_str()).collect();
    assert_eq!(drivers, ["d1", "d3"]);
    assert_eq!(out.branch_summary.len(), 2);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn params_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("delivery-cost-params-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("params.json");

    let params = CostParameters::default()
        .with(ParamKey::DriverHourlyWage, 30.0)
        .unwrap();
    params.save_json(&path).unwrap();
    assert_eq!(CostParameters::load_json(&path).unwrap(), params);

    fs::write(&path, r#"{"fuel_price": 7.5}"#).unwrap();
    assert!(CostParameters::load_json(&path).is_err());
    assert!(CostParameters::load_json(dir.join("missing.json")).is_err());

    fs::remove_dir_all(&dir).ok();
}
