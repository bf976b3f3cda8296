pub mod best_lap;
pub mod pace;
pub mod race_aggregate;

use std::collections::BTreeMap;

use log::debug;

use crate::records::{DriverNumber, LapRecord};

pub use best_lap::{BestLapSummary, best_lap_times};
pub use pace::{DriverPace, fastest_lap, quick_laps, race_pace};
pub use race_aggregate::{RaceAggregate, race_lap_times};

/// Cleans raw lap records for aggregation.
///
/// Laps without a recorded duration (retirements, red flags, invalid laps) are
/// dropped and the remainder is ordered by driver number, then lap number.
pub fn process_lap_data(laps: &[LapRecord]) -> Vec<LapRecord> {
    let mut timed_laps: Vec<LapRecord> = laps
        .iter()
        .filter(|lap| lap.timed_duration().is_some())
        .cloned()
        .collect();
    timed_laps.sort_by(|a, b| {
        a.driver_number
            .cmp(&b.driver_number)
            .then(a.lap_number.cmp(&b.lap_number))
    });
    debug!(
        "Kept {} of {} laps with a recorded duration",
        timed_laps.len(),
        laps.len()
    );
    timed_laps
}

/// Groups laps per driver, keeping input order within each group.
pub(crate) fn group_by_driver(laps: &[LapRecord]) -> BTreeMap<&DriverNumber, Vec<&LapRecord>> {
    let mut groups: BTreeMap<&DriverNumber, Vec<&LapRecord>> = BTreeMap::new();
    for lap in laps {
        groups.entry(&lap.driver_number).or_default().push(lap);
    }
    groups
}

/// Smallest present value, ignoring NaN.
pub(crate) fn min_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values
        .flatten()
        .filter(|v| !v.is_nan())
        .min_by(|a, b| a.total_cmp(b))
}
