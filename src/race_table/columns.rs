// Declarative display contract for the race table columns

use std::collections::HashSet;

use serde::{Serialize, Serializer};

use crate::PaddockError;
use crate::records::TimeGap;

/// Columns of the race table, in canonical display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RaceColumn {
    Position,
    HeadshotUrl,
    FullName,
    TeamName,
    Points,
    TimeGap,
    BestLapDuration,
    BestSector1,
    BestSector2,
    BestSector3,
    MeanI1Speed,
    MeanI2Speed,
    MeanStSpeed,
    NumberOfLaps,
}

/// What a column holds, independently of how it is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SemanticType {
    Integer,
    Float,
    Text,
    Image,
    Duration,
}

impl RaceColumn {
    pub const CANONICAL_ORDER: [RaceColumn; 14] = [
        RaceColumn::Position,
        RaceColumn::HeadshotUrl,
        RaceColumn::FullName,
        RaceColumn::TeamName,
        RaceColumn::Points,
        RaceColumn::TimeGap,
        RaceColumn::BestLapDuration,
        RaceColumn::BestSector1,
        RaceColumn::BestSector2,
        RaceColumn::BestSector3,
        RaceColumn::MeanI1Speed,
        RaceColumn::MeanI2Speed,
        RaceColumn::MeanStSpeed,
        RaceColumn::NumberOfLaps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RaceColumn::Position => "position",
            RaceColumn::HeadshotUrl => "headshot_url",
            RaceColumn::FullName => "full_name",
            RaceColumn::TeamName => "team_name",
            RaceColumn::Points => "points",
            RaceColumn::TimeGap => "time_gap",
            RaceColumn::BestLapDuration => "best_lap_duration",
            RaceColumn::BestSector1 => "best_sector_1",
            RaceColumn::BestSector2 => "best_sector_2",
            RaceColumn::BestSector3 => "best_sector_3",
            RaceColumn::MeanI1Speed => "mean_i1_speed",
            RaceColumn::MeanI2Speed => "mean_i2_speed",
            RaceColumn::MeanStSpeed => "mean_st_speed",
            RaceColumn::NumberOfLaps => "number_of_laps",
        }
    }

    pub fn semantic_type(&self) -> SemanticType {
        match self {
            RaceColumn::Position | RaceColumn::Points | RaceColumn::NumberOfLaps => {
                SemanticType::Integer
            }
            RaceColumn::HeadshotUrl => SemanticType::Image,
            RaceColumn::FullName | RaceColumn::TeamName => SemanticType::Text,
            RaceColumn::TimeGap => SemanticType::Duration,
            RaceColumn::BestLapDuration
            | RaceColumn::BestSector1
            | RaceColumn::BestSector2
            | RaceColumn::BestSector3
            | RaceColumn::MeanI1Speed
            | RaceColumn::MeanI2Speed
            | RaceColumn::MeanStSpeed => SemanticType::Float,
        }
    }
}

impl Serialize for RaceColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidth {
    Small,
    Medium,
    Large,
}

/// How a renderer draws a column. Formats are printf-like strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnKind {
    Number { format: &'static str },
    Image,
    Text,
    Time { format: &'static str },
}

/// Parsed numeric display format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// `%d`
    Integer,
    /// `%.Nf`
    Fixed(usize),
}

impl NumberFormat {
    pub fn parse(format: &str) -> Option<Self> {
        if format == "%d" {
            return Some(NumberFormat::Integer);
        }
        let precision = format.strip_prefix("%.")?.strip_suffix('f')?;
        precision.parse::<usize>().ok().map(NumberFormat::Fixed)
    }

    pub fn apply(&self, value: f64) -> String {
        match self {
            NumberFormat::Integer => format!("{}", value.trunc() as i64),
            NumberFormat::Fixed(precision) => format!("{:.*}", precision, value),
        }
    }
}

const ISO8601_FORMAT: &str = "iso8601";

/// Renders a gap in seconds as an ISO-8601 duration, e.g. `PT1M23.456S`.
///
/// Precision is limited to milliseconds, trailing zeros are dropped. Gaps that
/// are not finite or do not fit in an `i64` of milliseconds have no duration.
pub fn iso8601_duration(seconds: f64) -> Option<String> {
    let total_ms = (seconds * 1000.).round();
    if !total_ms.is_finite() || total_ms.abs() >= i64::MAX as f64 {
        return None;
    }
    let total_ms = total_ms as i64;
    let sign = if total_ms < 0 { "-" } else { "" };
    let total_ms = total_ms.unsigned_abs();
    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let millis = total_ms % 60_000;

    let mut duration = format!("{}PT", sign);
    if hours > 0 {
        duration.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        duration.push_str(&format!("{}M", minutes));
    }
    if millis > 0 || (hours == 0 && minutes == 0) {
        let whole = millis / 1000;
        let fraction = millis % 1000;
        if fraction == 0 {
            duration.push_str(&format!("{}S", whole));
        } else {
            let fraction = format!("{:03}", fraction);
            duration.push_str(&format!("{}.{}S", whole, fraction.trim_end_matches('0')));
        }
    }
    Some(duration)
}

/// A single table cell before formatting.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Gap(TimeGap),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Null, CellValue::Float)
    }
}

impl From<Option<u32>> for CellValue {
    fn from(value: Option<u32>) -> Self {
        value.map_or(CellValue::Null, |v| CellValue::Integer(v as i64))
    }
}

impl From<Option<&String>> for CellValue {
    fn from(value: Option<&String>) -> Self {
        value.map_or(CellValue::Null, |v| CellValue::Text(v.clone()))
    }
}

/// Display descriptor of one column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub column: RaceColumn,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: ColumnKind,
    pub width: Option<ColumnWidth>,
    pub pinned: bool,
    pub help: Option<&'static str>,
}

impl ColumnSpec {
    const fn new(column: RaceColumn, label: &'static str, kind: ColumnKind) -> Self {
        Self {
            column,
            label,
            kind,
            width: None,
            pinned: false,
            help: None,
        }
    }

    const fn small(mut self) -> Self {
        self.width = Some(ColumnWidth::Small);
        self
    }

    const fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    const fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Formats a cell the way this column is contracted to display it.
    /// Nulls render as an empty string.
    pub fn format_cell(&self, cell: &CellValue) -> String {
        match (cell, self.kind) {
            (CellValue::Null, _) => String::new(),
            (CellValue::Integer(value), ColumnKind::Number { format }) => NumberFormat::parse(format)
                .map(|f| f.apply(*value as f64))
                .unwrap_or_else(|| value.to_string()),
            (CellValue::Float(value), ColumnKind::Number { format }) => NumberFormat::parse(format)
                .map(|f| f.apply(*value))
                .unwrap_or_else(|| value.to_string()),
            (CellValue::Gap(gap), ColumnKind::Time { .. }) => match gap {
                TimeGap::Marker(marker) => marker.clone(),
                _ => gap.seconds().and_then(iso8601_duration).unwrap_or_default(),
            },
            (CellValue::Integer(value), _) => value.to_string(),
            (CellValue::Float(value), _) => value.to_string(),
            (CellValue::Text(text), _) => text.clone(),
            (CellValue::Gap(gap), _) => gap.seconds().map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.label.is_empty() {
            return Err(format!("column {} has no label", self.column.name()));
        }
        let semantic = self.column.semantic_type();
        match self.kind {
            ColumnKind::Number { format } => {
                if !matches!(semantic, SemanticType::Integer | SemanticType::Float) {
                    return Err(format!("column {} is not numeric", self.column.name()));
                }
                if NumberFormat::parse(format).is_none() {
                    return Err(format!(
                        "column {} has unsupported number format {:?}",
                        self.column.name(),
                        format
                    ));
                }
            }
            ColumnKind::Time { format } => {
                if semantic != SemanticType::Duration {
                    return Err(format!("column {} is not a duration", self.column.name()));
                }
                if format != ISO8601_FORMAT {
                    return Err(format!(
                        "column {} has unsupported time format {:?}",
                        self.column.name(),
                        format
                    ));
                }
            }
            ColumnKind::Image if semantic != SemanticType::Image => {
                return Err(format!("column {} is not an image", self.column.name()));
            }
            ColumnKind::Text if semantic != SemanticType::Text => {
                return Err(format!("column {} is not text", self.column.name()));
            }
            _ => {}
        }
        Ok(())
    }
}

const RACE_TABLE_COLUMNS: [ColumnSpec; 14] = [
    ColumnSpec::new(RaceColumn::Position, "Position", ColumnKind::Number { format: "%d" })
        .small()
        .pinned()
        .help("Position of the driver"),
    ColumnSpec::new(RaceColumn::HeadshotUrl, "Headshot", ColumnKind::Image)
        .small()
        .pinned(),
    ColumnSpec::new(RaceColumn::FullName, "Driver", ColumnKind::Text)
        .pinned()
        .help("Full name of the driver"),
    ColumnSpec::new(RaceColumn::TeamName, "Team", ColumnKind::Text).help("Team name of the driver"),
    ColumnSpec::new(RaceColumn::Points, "Points", ColumnKind::Number { format: "%d" })
        .small()
        .help("Points scored by the driver"),
    ColumnSpec::new(RaceColumn::TimeGap, "Time Gap", ColumnKind::Time { format: ISO8601_FORMAT })
        .help("Time gap from the leader"),
    ColumnSpec::new(
        RaceColumn::BestLapDuration,
        "Best Lap Duration",
        ColumnKind::Number { format: "%.3f" },
    )
    .help("Best lap duration of the driver"),
    ColumnSpec::new(RaceColumn::BestSector1, "Best Sector 1", ColumnKind::Number { format: "%.3f" })
        .help("Best time in sector 1"),
    ColumnSpec::new(RaceColumn::BestSector2, "Best Sector 2", ColumnKind::Number { format: "%.3f" })
        .help("Best time in sector 2"),
    ColumnSpec::new(RaceColumn::BestSector3, "Best Sector 3", ColumnKind::Number { format: "%.3f" })
        .help("Best time in sector 3"),
    ColumnSpec::new(
        RaceColumn::MeanI1Speed,
        "Mean Interval 1 Speed",
        ColumnKind::Number { format: "%.2f" },
    )
    .help("The mean speed of the car, in km/h, at the first intermediate point on the track."),
    ColumnSpec::new(
        RaceColumn::MeanI2Speed,
        "Mean Interval 2 Speed",
        ColumnKind::Number { format: "%.2f" },
    )
    .help("The mean speed of the car, in km/h, at the second intermediate point on the track."),
    ColumnSpec::new(RaceColumn::MeanStSpeed, "Mean ST Speed", ColumnKind::Number { format: "%.2f" })
        .help("The mean speed of the car, in km/h, at the speed trap, where the highest speeds are usually recorded."),
    ColumnSpec::new(RaceColumn::NumberOfLaps, "Laps", ColumnKind::Number { format: "%d" })
        .small()
        .help("Number of laps completed by the driver"),
];

/// Ordered, validated set of column descriptors.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnCatalog {
    columns: Vec<ColumnSpec>,
}

impl ColumnCatalog {
    /// Validates a catalog: every column described exactly once, in canonical
    /// order, labels present, and every format suited to the column it
    /// describes.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, PaddockError> {
        if columns.is_empty() {
            return Err(PaddockError::InvalidColumnCatalog {
                reason: "no columns".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for spec in &columns {
            if !seen.insert(spec.column) {
                return Err(PaddockError::InvalidColumnCatalog {
                    reason: format!("column {} described twice", spec.column.name()),
                });
            }
            spec.validate()
                .map_err(|reason| PaddockError::InvalidColumnCatalog { reason })?;
        }
        if let Some(missing) = RaceColumn::CANONICAL_ORDER
            .iter()
            .find(|column| !seen.contains(*column))
        {
            return Err(PaddockError::InvalidColumnCatalog {
                reason: format!("column {} is not described", missing.name()),
            });
        }
        if !columns
            .iter()
            .map(|spec| spec.column)
            .eq(RaceColumn::CANONICAL_ORDER)
        {
            return Err(PaddockError::InvalidColumnCatalog {
                reason: "columns are not in canonical order".to_string(),
            });
        }
        Ok(Self { columns })
    }

    /// The canonical race table catalog.
    pub fn race_table() -> Result<Self, PaddockError> {
        Self::new(RACE_TABLE_COLUMNS.to_vec())
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn order(&self) -> impl Iterator<Item = RaceColumn> + '_ {
        self.columns.iter().map(|spec| spec.column)
    }

    pub fn get(&self, column: RaceColumn) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.column == column)
    }
}
