use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::config::constant::SEED;
use crate::domain::types::CheckInEvent;

/// Shape of a generated day of check-ins.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub date: NaiveDate,
    pub branch_count: usize,
    pub drivers_per_branch: usize,
    pub min_points: usize,
    pub max_points: usize,
    /// Region centre the depots are scattered around.
    pub origin: (f64, f64),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: SEED,
            date: NaiveDate::from_ymd_opt(2025, 8, 20).unwrap_or_default(),
            branch_count: 4,
            drivers_per_branch: 5,
            min_points: 1,
            max_points: 12,
            origin: (25.80, 114.90),
        }
    }
}

/// Generates a deterministic, shuffled batch of matched check-ins.
///
/// Each driver starts between 07:00 and 09:00 and checks in every 5 to 40
/// minutes, within about 6 km of their branch depot.
pub fn generate_checkins(config: &GeneratorConfig) -> Vec<CheckInEvent> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut events = Vec::new();

    for b in 0..config.branch_count {
        let branch_name = format!("Branch-{:02}", b + 1);
        let depot_lat = config.origin.0 + rng.gen_range(-0.5..0.5);
        let depot_lon = config.origin.1 + rng.gen_range(-0.5..0.5);

        for d in 0..config.drivers_per_branch {
            let driver_id = format!("driver-{:02}-{:02}", b + 1, d + 1);
            let max_points = config.max_points.max(config.min_points);
            let points = rng.gen_range(config.min_points..=max_points);
            let mut time = start_of_shift(config.date, &mut rng);

            for p in 0..points {
                events.push(CheckInEvent {
                    driver_id: driver_id.clone(),
                    timestamp: time,
                    latitude: depot_lat + rng.gen_range(-0.05..0.05),
                    longitude: depot_lon + rng.gen_range(-0.05..0.05),
                    delivery_address: format!("No. {} Delivery Rd, {}", p + 1, branch_name),
                    receiver_name: rng.gen_bool(0.7).then(|| format!("Store {}-{}", d + 1, p + 1)),
                    matched_branch_name: branch_name.clone(),
                    matched_depot_latitude: depot_lat,
                    matched_depot_longitude: depot_lon,
                });
                time += Duration::minutes(rng.gen_range(5..=40));
            }
        }
    }

    // Raw exports are not time ordered.
    events.shuffle(&mut rng);

    info!(
        "Generated {} check-ins for {} branches x {} drivers",
        events.len(),
        config.branch_count,
        config.drivers_per_branch
    );
    events
}

fn start_of_shift(date: NaiveDate, rng: &mut ChaCha8Rng) -> NaiveDateTime {
    let minutes = rng.gen_range(7 * 60..9 * 60);
    date.and_time(NaiveTime::MIN) + Duration::minutes(minutes)
}
