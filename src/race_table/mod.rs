pub mod columns;

use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::laps::{BestLapSummary, RaceAggregate};
use crate::records::{DriverIdentity, DriverNumber, SessionResult, Sector, SpeedPoint};

pub use columns::{CellValue, ColumnCatalog, ColumnKind, ColumnSpec, ColumnWidth, RaceColumn};

/// Per-driver lap figures that can fill the lap columns of the race table.
pub trait LapStatistics {
    fn driver_number(&self) -> &DriverNumber;
    fn best_lap_duration(&self) -> Option<f64>;
    fn best_sector(&self, sector: Sector) -> Option<f64>;
    fn mean_speed(&self, point: SpeedPoint) -> Option<f64>;
}

impl LapStatistics for RaceAggregate {
    fn driver_number(&self) -> &DriverNumber {
        &self.driver_number
    }

    fn best_lap_duration(&self) -> Option<f64> {
        self.best_lap_duration
    }

    fn best_sector(&self, sector: Sector) -> Option<f64> {
        match sector {
            Sector::One => self.best_sector_1,
            Sector::Two => self.best_sector_2,
            Sector::Three => self.best_sector_3,
        }
    }

    fn mean_speed(&self, point: SpeedPoint) -> Option<f64> {
        match point {
            SpeedPoint::Intermediate1 => self.mean_i1_speed,
            SpeedPoint::Intermediate2 => self.mean_i2_speed,
            SpeedPoint::SpeedTrap => self.mean_st_speed,
        }
    }
}

// A single lap: its sectors are the best sectors and its speeds the means.
impl LapStatistics for BestLapSummary {
    fn driver_number(&self) -> &DriverNumber {
        &self.driver_number
    }

    fn best_lap_duration(&self) -> Option<f64> {
        Some(self.lap_duration)
    }

    fn best_sector(&self, sector: Sector) -> Option<f64> {
        match sector {
            Sector::One => self.duration_sector_1,
            Sector::Two => self.duration_sector_2,
            Sector::Three => self.duration_sector_3,
        }
    }

    fn mean_speed(&self, point: SpeedPoint) -> Option<f64> {
        match point {
            SpeedPoint::Intermediate1 => self.i1_speed,
            SpeedPoint::Intermediate2 => self.i2_speed,
            SpeedPoint::SpeedTrap => self.st_speed,
        }
    }
}

/// One driver's line of the race table. Missing join partners stay `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceTableRow<A> {
    pub driver: DriverIdentity,
    pub result: Option<SessionResult>,
    pub lap_statistics: Option<A>,
}

impl<A: LapStatistics> RaceTableRow<A> {
    pub fn position(&self) -> Option<u32> {
        self.result.as_ref().and_then(|r| r.position)
    }

    pub fn number_of_laps(&self) -> Option<u32> {
        self.result.as_ref().and_then(|r| r.number_of_laps)
    }

    pub fn cell(&self, column: RaceColumn) -> CellValue {
        let result = self.result.as_ref();
        let laps = self.lap_statistics.as_ref();
        match column {
            RaceColumn::Position => self.position().into(),
            RaceColumn::HeadshotUrl => self.driver.headshot_url.as_ref().into(),
            RaceColumn::FullName => self.driver.full_name.as_ref().into(),
            RaceColumn::TeamName => self.driver.team_name.as_ref().into(),
            RaceColumn::Points => result.and_then(|r| r.points).into(),
            RaceColumn::TimeGap => result
                .and_then(|r| r.time_gap.clone())
                .map_or(CellValue::Null, CellValue::Gap),
            RaceColumn::BestLapDuration => laps.and_then(|l| l.best_lap_duration()).into(),
            RaceColumn::BestSector1 => laps.and_then(|l| l.best_sector(Sector::One)).into(),
            RaceColumn::BestSector2 => laps.and_then(|l| l.best_sector(Sector::Two)).into(),
            RaceColumn::BestSector3 => laps.and_then(|l| l.best_sector(Sector::Three)).into(),
            RaceColumn::MeanI1Speed => laps
                .and_then(|l| l.mean_speed(SpeedPoint::Intermediate1))
                .into(),
            RaceColumn::MeanI2Speed => laps
                .and_then(|l| l.mean_speed(SpeedPoint::Intermediate2))
                .into(),
            RaceColumn::MeanStSpeed => laps.and_then(|l| l.mean_speed(SpeedPoint::SpeedTrap)).into(),
            RaceColumn::NumberOfLaps => self.number_of_laps().into(),
        }
    }
}

/// The race leaderboard with the display contract of its columns.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceTable<A> {
    pub rows: Vec<RaceTableRow<A>>,
    pub columns: ColumnCatalog,
}

impl<A: LapStatistics> RaceTable<A> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Cells of every row, formatted per the column catalog, in column order.
    pub fn formatted_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .columns()
                    .iter()
                    .map(|spec| spec.format_cell(&row.cell(spec.column)))
                    .collect()
            })
            .collect()
    }

    /// Serializable views of the rows, each a map of column name to raw cell.
    pub fn records(&self) -> impl Iterator<Item = RaceTableRecord<'_, A>> {
        self.rows.iter().map(|row| RaceTableRecord {
            row,
            columns: &self.columns,
        })
    }
}

/// A row paired with the catalog that decides its column order.
pub struct RaceTableRecord<'a, A> {
    row: &'a RaceTableRow<A>,
    columns: &'a ColumnCatalog,
}

impl<A: LapStatistics> Serialize for RaceTableRecord<'_, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.columns().len() + 1))?;
        map.serialize_entry("driver_number", &self.row.driver.driver_number)?;
        for column in self.columns.order() {
            map.serialize_entry(column.name(), &self.row.cell(column))?;
        }
        map.end()
    }
}

impl<A: LapStatistics> Serialize for RaceTable<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for record in self.records() {
            seq.serialize_element(&record)?;
        }
        seq.end()
    }
}

// Present values first, in the given order; absent values last.
fn cmp_present_first<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Joins driver identities with their session results and lap statistics.
///
/// Both joins are left joins on the driver number: every identity row appears
/// exactly once, with `None` where no result or statistics match. When a
/// table holds several rows for one driver the first one is used. Rows are
/// ordered by position, unclassified drivers last, ties broken by the number
/// of laps completed, most first. The sort is stable.
pub fn build_race_table<A: LapStatistics + Clone>(
    drivers: &[DriverIdentity],
    lap_statistics: &[A],
    results: &[SessionResult],
    columns: &ColumnCatalog,
) -> RaceTable<A> {
    let mut results_by_driver: HashMap<&DriverNumber, &SessionResult> = HashMap::new();
    for result in results {
        results_by_driver.entry(&result.driver_number).or_insert(result);
    }
    let mut laps_by_driver: HashMap<&DriverNumber, &A> = HashMap::new();
    for statistics in lap_statistics {
        laps_by_driver
            .entry(statistics.driver_number())
            .or_insert(statistics);
    }

    let mut rows: Vec<RaceTableRow<A>> = drivers
        .iter()
        .map(|driver| {
            let key = driver.driver_number.as_ref();
            RaceTableRow {
                driver: driver.clone(),
                result: key
                    .and_then(|k| results_by_driver.get(k))
                    .map(|r| (*r).clone()),
                lap_statistics: key
                    .and_then(|k| laps_by_driver.get(k))
                    .map(|l| (*l).clone()),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        cmp_present_first(a.position(), b.position(), false)
            .then_with(|| cmp_present_first(a.number_of_laps(), b.number_of_laps(), true))
    });

    debug!(
        "Built race table with {} rows, {} with results and {} with lap statistics",
        rows.len(),
        rows.iter().filter(|r| r.result.is_some()).count(),
        rows.iter().filter(|r| r.lap_statistics.is_some()).count()
    );

    RaceTable {
        rows,
        columns: columns.clone(),
    }
}
