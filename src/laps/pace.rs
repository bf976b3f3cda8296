// Lap time series for race pace charts

use itertools::Itertools;
use serde::Serialize;

use crate::records::{DriverNumber, LapRecord, SessionResult};

/// Share of the session's fastest lap a lap may take and still count as quick
pub const QUICK_LAP_THRESHOLD: f64 = 1.07;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PacePoint {
    pub lap_number: u32,
    pub lap_duration: f64,
}

/// Lap-by-lap times of one driver, in lap order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DriverPace {
    pub driver_number: DriverNumber,
    pub position: Option<u32>,
    pub laps: Vec<PacePoint>,
}

/// The fastest timed lap of the whole session. Ties go to the first lap seen.
pub fn fastest_lap(laps: &[LapRecord]) -> Option<&LapRecord> {
    let mut fastest: Option<(&LapRecord, f64)> = None;
    for lap in laps {
        if let Some(duration) = lap.timed_duration() {
            if fastest.is_none_or(|(_, best)| duration < best) {
                fastest = Some((lap, duration));
            }
        }
    }
    fastest.map(|(lap, _)| lap)
}

/// Keeps the laps no slower than `threshold` times the session's fastest lap.
///
/// Out laps, in laps and laps behind the safety car fall outside the window.
pub fn quick_laps(laps: &[LapRecord], threshold: f64) -> Vec<LapRecord> {
    let Some(cutoff) = fastest_lap(laps)
        .and_then(|lap| lap.timed_duration())
        .map(|duration| duration * threshold)
    else {
        return Vec::new();
    };
    laps.iter()
        .filter(|lap| lap.timed_duration().is_some_and(|d| d <= cutoff))
        .cloned()
        .collect()
}

/// Quick-lap series for the best classified `driver_count` drivers.
pub fn race_pace(
    laps: &[LapRecord],
    results: &[SessionResult],
    driver_count: usize,
    threshold: f64,
) -> Vec<DriverPace> {
    let quick = quick_laps(laps, threshold);
    results
        .iter()
        .filter(|result| result.position.is_some())
        .sorted_by_key(|result| result.position)
        .unique_by(|result| result.driver_number.clone())
        .take(driver_count)
        .map(|result| DriverPace {
            driver_number: result.driver_number.clone(),
            position: result.position,
            laps: quick
                .iter()
                .filter(|lap| lap.driver_number == result.driver_number)
                .filter_map(|lap| {
                    lap.timed_duration().map(|lap_duration| PacePoint {
                        lap_number: lap.lap_number,
                        lap_duration,
                    })
                })
                .sorted_by_key(|point| point.lap_number)
                .collect(),
        })
        .collect()
}
