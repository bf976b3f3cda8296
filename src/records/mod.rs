pub mod loader;
pub mod metadata;

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

pub use metadata::{Meeting, SessionInfo};

/// Identifies a driver within one session.
///
/// The fetch layer is loosely typed, so the number may arrive either as an
/// integer or as text. The two kinds never compare equal: joining tables
/// whose keys disagree in kind simply finds no matches. Whole floats such as
/// `44.0` are numbers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum DriverNumber {
    Number(i64),
    Label(String),
}

impl fmt::Display for DriverNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverNumber::Number(number) => write!(f, "{}", number),
            DriverNumber::Label(label) => write!(f, "{}", label),
        }
    }
}

/// The integer a float holds, if it is whole and fits in an `i64`.
pub(crate) fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

struct DriverNumberVisitor;

impl Visitor<'_> for DriverNumberVisitor {
    type Value = DriverNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, a whole float or a string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<DriverNumber, E> {
        Ok(DriverNumber::Number(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<DriverNumber, E> {
        i64::try_from(value)
            .map(DriverNumber::Number)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<DriverNumber, E> {
        whole_number(value)
            .map(DriverNumber::Number)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Float(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<DriverNumber, E> {
        Ok(DriverNumber::Label(value.to_string()))
    }
}

impl<'de> Deserialize<'de> for DriverNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DriverNumberVisitor)
    }
}

impl From<i64> for DriverNumber {
    fn from(value: i64) -> Self {
        DriverNumber::Number(value)
    }
}

impl From<&str> for DriverNumber {
    fn from(value: &str) -> Self {
        DriverNumber::Label(value.to_string())
    }
}

/// One lap driven by one driver in one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub driver_number: DriverNumber,
    pub lap_number: u32,
    /// Lap time in seconds. Absent for retirements, red flags and invalid laps
    pub lap_duration: Option<f64>,
    /// Sector times in seconds
    pub duration_sector_1: Option<f64>,
    pub duration_sector_2: Option<f64>,
    pub duration_sector_3: Option<f64>,
    /// Speed in km/h at the first intermediate point
    pub i1_speed: Option<f64>,
    /// Speed in km/h at the second intermediate point
    pub i2_speed: Option<f64>,
    /// Speed in km/h at the speed trap
    pub st_speed: Option<f64>,
    pub is_pit_out_lap: Option<bool>,
    pub session_key: Option<i64>,
    pub meeting_key: Option<i64>,
}

impl LapRecord {
    pub fn new(driver_number: i64, lap_number: u32) -> Self {
        Self {
            driver_number: DriverNumber::Number(driver_number),
            lap_number,
            lap_duration: None,
            duration_sector_1: None,
            duration_sector_2: None,
            duration_sector_3: None,
            i1_speed: None,
            i2_speed: None,
            st_speed: None,
            is_pit_out_lap: None,
            session_key: None,
            meeting_key: None,
        }
    }

    pub fn with_duration(mut self, lap_duration: f64) -> Self {
        self.lap_duration = Some(lap_duration);
        self
    }

    pub fn with_sectors(mut self, sector_1: f64, sector_2: f64, sector_3: f64) -> Self {
        self.duration_sector_1 = Some(sector_1);
        self.duration_sector_2 = Some(sector_2);
        self.duration_sector_3 = Some(sector_3);
        self
    }

    pub fn with_speeds(mut self, i1_speed: f64, i2_speed: f64, st_speed: f64) -> Self {
        self.i1_speed = Some(i1_speed);
        self.i2_speed = Some(i2_speed);
        self.st_speed = Some(st_speed);
        self
    }

    /// The lap duration when it holds a usable time.
    ///
    /// A NaN duration is treated the same as a missing one.
    pub fn timed_duration(&self) -> Option<f64> {
        self.lap_duration.filter(|duration| !duration.is_nan())
    }

    pub fn sector(&self, sector: Sector) -> Option<f64> {
        match sector {
            Sector::One => self.duration_sector_1,
            Sector::Two => self.duration_sector_2,
            Sector::Three => self.duration_sector_3,
        }
    }

    pub fn speed(&self, point: SpeedPoint) -> Option<f64> {
        match point {
            SpeedPoint::Intermediate1 => self.i1_speed,
            SpeedPoint::Intermediate2 => self.i2_speed,
            SpeedPoint::SpeedTrap => self.st_speed,
        }
    }
}

/// One of the three timing segments a lap is split into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sector {
    One,
    Two,
    Three,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::One, Sector::Two, Sector::Three];
}

/// Fixed track locations where speed is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeedPoint {
    Intermediate1,
    Intermediate2,
    SpeedTrap,
}

impl SpeedPoint {
    pub const ALL: [SpeedPoint; 3] = [
        SpeedPoint::Intermediate1,
        SpeedPoint::Intermediate2,
        SpeedPoint::SpeedTrap,
    ];
}

/// Static per-session information about a driver.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverIdentity {
    pub driver_number: Option<DriverNumber>,
    pub full_name: Option<String>,
    pub team_name: Option<String>,
    pub headshot_url: Option<String>,
    pub name_acronym: Option<String>,
    pub team_colour: Option<String>,
}

impl DriverIdentity {
    pub fn new(driver_number: i64, full_name: &str, team_name: &str) -> Self {
        Self {
            driver_number: Some(DriverNumber::Number(driver_number)),
            full_name: Some(full_name.to_string()),
            team_name: Some(team_name.to_string()),
            ..Default::default()
        }
    }
}

/// Classification outcome of a driver in a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub driver_number: DriverNumber,
    pub position: Option<u32>,
    pub points: Option<f64>,
    #[serde(alias = "gap_to_leader")]
    pub time_gap: Option<TimeGap>,
    pub number_of_laps: Option<u32>,
    pub dnf: Option<bool>,
    pub dns: Option<bool>,
    pub dsq: Option<bool>,
}

impl SessionResult {
    pub fn new(driver_number: i64) -> Self {
        Self {
            driver_number: DriverNumber::Number(driver_number),
            position: None,
            points: None,
            time_gap: None,
            number_of_laps: None,
            dnf: None,
            dns: None,
            dsq: None,
        }
    }

    pub fn classified(mut self, position: u32, number_of_laps: u32) -> Self {
        self.position = Some(position);
        self.number_of_laps = Some(number_of_laps);
        self
    }
}

/// Gap between a driver and the session leader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeGap {
    /// Gap in seconds
    Seconds(f64),
    /// Lapped or otherwise non-numeric gap, e.g. "+1 LAP"
    Marker(String),
    /// Per-segment gaps, as reported for qualifying sessions
    Segments(Vec<Option<f64>>),
}

impl TimeGap {
    /// The numeric gap that best represents this value, in seconds.
    ///
    /// For segmented gaps this is the last segment the driver took part in.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            TimeGap::Seconds(seconds) => Some(*seconds),
            TimeGap::Marker(_) => None,
            TimeGap::Segments(segments) => segments.iter().rev().find_map(|s| *s),
        }
    }
}
