use serde::{Deserialize, Serialize};

use super::group_by_driver;
use crate::records::{DriverNumber, LapRecord};

/// A driver's fastest lap with the sector and speed measurements of that lap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestLapSummary {
    pub driver_number: DriverNumber,
    pub lap_duration: f64,
    pub duration_sector_1: Option<f64>,
    pub duration_sector_2: Option<f64>,
    pub duration_sector_3: Option<f64>,
    pub i1_speed: Option<f64>,
    pub i2_speed: Option<f64>,
    pub st_speed: Option<f64>,
}

impl BestLapSummary {
    fn from_lap(lap: &LapRecord, lap_duration: f64) -> Self {
        Self {
            driver_number: lap.driver_number.clone(),
            lap_duration,
            duration_sector_1: lap.duration_sector_1,
            duration_sector_2: lap.duration_sector_2,
            duration_sector_3: lap.duration_sector_3,
            i1_speed: lap.i1_speed,
            i2_speed: lap.i2_speed,
            st_speed: lap.st_speed,
        }
    }
}

/// Picks the fastest lap of every driver.
///
/// All fields of a row come from the same lap. When two laps share the best
/// time the first one in input order wins. Rows are returned in driver order.
pub fn best_lap_times(laps: &[LapRecord]) -> Vec<BestLapSummary> {
    group_by_driver(laps)
        .into_values()
        .filter_map(|driver_laps| {
            let mut best: Option<(&LapRecord, f64)> = None;
            for lap in driver_laps {
                let Some(duration) = lap.timed_duration() else {
                    continue;
                };
                if best.is_none_or(|(_, best_duration)| duration < best_duration) {
                    best = Some((lap, duration));
                }
            }
            best.map(|(lap, duration)| BestLapSummary::from_lap(lap, duration))
        })
        .collect()
}
