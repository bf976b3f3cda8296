// Picks the view of a session that the overview shows

use log::info;
use serde::Serialize;

use crate::config::AppConfig;
use crate::laps::{BestLapSummary, RaceAggregate, best_lap_times, process_lap_data, race_lap_times};
use crate::race_table::{ColumnCatalog, RaceTable, build_race_table};
use crate::records::{DriverIdentity, LapRecord, SessionResult};

/// What the overview of a session shows.
///
/// Race-like sessions get the classification merged with lap statistics;
/// every other session gets the best lap of each driver.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOverview {
    Race(RaceTable<RaceAggregate>),
    BestLaps(Vec<BestLapSummary>),
}

impl SessionOverview {
    pub fn is_empty(&self) -> bool {
        match self {
            SessionOverview::Race(table) => table.is_empty(),
            SessionOverview::BestLaps(best_laps) => best_laps.is_empty(),
        }
    }
}

impl Serialize for SessionOverview {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SessionOverview::Race(table) => table.serialize(serializer),
            SessionOverview::BestLaps(best_laps) => best_laps.serialize(serializer),
        }
    }
}

/// Runs the pipeline for one session from its raw laps, drivers and results.
pub fn session_overview(
    session_name: &str,
    laps: &[LapRecord],
    drivers: &[DriverIdentity],
    results: &[SessionResult],
    config: &AppConfig,
    columns: &ColumnCatalog,
) -> SessionOverview {
    let timed_laps = process_lap_data(laps);
    if config.is_race_session(session_name) {
        info!("Building race table for {} session", session_name);
        let aggregates = race_lap_times(&timed_laps);
        SessionOverview::Race(build_race_table(drivers, &aggregates, results, columns))
    } else {
        info!("Listing best laps for {} session", session_name);
        SessionOverview::BestLaps(best_lap_times(&timed_laps))
    }
}
