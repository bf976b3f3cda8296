use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{DriverIdentity, LapRecord, Meeting, SessionInfo, SessionResult, whole_number};
use crate::PaddockError;

/// A typed row of one of the tables delivered by the fetch layer.
pub trait Record: DeserializeOwned {
    /// Name of the table, as the data source calls it
    const ENTITY: &'static str;
    /// Column used to group or join rows of this table
    const KEY_COLUMN: &'static str;
    /// Whether rows missing the key still take part in the pipeline.
    /// Identity rows are the left side of every join and must all survive.
    const KEEP_KEYLESS_ROWS: bool = false;
}

impl Record for LapRecord {
    const ENTITY: &'static str = "laps";
    const KEY_COLUMN: &'static str = "driver_number";
}

impl Record for DriverIdentity {
    const ENTITY: &'static str = "drivers";
    const KEY_COLUMN: &'static str = "driver_number";
    const KEEP_KEYLESS_ROWS: bool = true;
}

impl Record for SessionResult {
    const ENTITY: &'static str = "session_result";
    const KEY_COLUMN: &'static str = "driver_number";
}

impl Record for Meeting {
    const ENTITY: &'static str = "meetings";
    const KEY_COLUMN: &'static str = "meeting_key";
}

impl Record for SessionInfo {
    const ENTITY: &'static str = "sessions";
    const KEY_COLUMN: &'static str = "session_key";
}

// Integers, whole floats and strings can key a row. Anything else counts as
// no key at all.
fn has_usable_key(row: &Value, column: &str) -> bool {
    match row.get(column) {
        Some(Value::Number(number)) => {
            number.as_i64().is_some() || number.as_f64().and_then(whole_number).is_some()
        }
        Some(Value::String(_)) => true,
        _ => false,
    }
}

/// Decodes raw rows into typed records.
///
/// An empty table decodes to an empty list. A non-empty table in which no row
/// carries the key column at all is a caller contract violation and fails with
/// [`PaddockError::MissingKeyColumn`]; individual rows with a null, missing
/// or unusable key are skipped unless the record type keeps them, in which
/// case the key is cleared.
pub fn decode_rows<T: Record>(rows: Vec<Value>) -> Result<Vec<T>, PaddockError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let has_key_column = rows.iter().any(|row| {
        row.as_object()
            .is_some_and(|fields| fields.contains_key(T::KEY_COLUMN))
    });
    if !has_key_column {
        return Err(PaddockError::MissingKeyColumn {
            entity: T::ENTITY,
            column: T::KEY_COLUMN,
        });
    }

    let mut records = Vec::with_capacity(rows.len());
    let mut keyless = 0;
    for mut row in rows {
        if !has_usable_key(&row, T::KEY_COLUMN) {
            keyless += 1;
            if !T::KEEP_KEYLESS_ROWS {
                continue;
            }
            if let Some(fields) = row.as_object_mut() {
                fields.insert(T::KEY_COLUMN.to_string(), Value::Null);
            }
        }
        let record = serde_json::from_value::<T>(row).map_err(|e| {
            PaddockError::RecordDecodeError {
                entity: T::ENTITY,
                source: e,
            }
        })?;
        records.push(record);
    }
    if keyless > 0 {
        let outcome = if T::KEEP_KEYLESS_ROWS { "kept unmatched" } else { "skipped" };
        warn!(
            "{} {} rows without a usable {} value, {}",
            keyless,
            T::ENTITY,
            T::KEY_COLUMN,
            outcome
        );
    }
    Ok(records)
}

/// Loads a table from a JSON array file, or a JSON Lines file when the
/// extension is `.jsonl`.
pub fn load_records<T: Record>(source_file: &Path) -> Result<Vec<T>, PaddockError> {
    if !source_file.is_file() {
        return Err(PaddockError::InvalidRecordFile {
            path: format!("{:?}", source_file),
        });
    }

    let rows = if is_json_lines(source_file) {
        serde_jsonlines::json_lines(source_file)
            .map_err(|e| PaddockError::RecordLoaderError { source: e })?
            .collect::<Result<Vec<Value>, std::io::Error>>()
            .map_err(|e| PaddockError::RecordLoaderError { source: e })?
    } else {
        let content = fs::read_to_string(source_file)
            .map_err(|e| PaddockError::RecordLoaderError { source: e })?;
        match serde_json::from_str::<Value>(&content).map_err(|e| {
            PaddockError::RecordDecodeError {
                entity: T::ENTITY,
                source: e,
            }
        })? {
            Value::Array(rows) => rows,
            _ => {
                return Err(PaddockError::InvalidRecordFile {
                    path: format!("{:?}", source_file),
                });
            }
        }
    };

    let records = decode_rows::<T>(rows)?;
    info!(
        "Loaded {:?}, found {} {} records",
        source_file,
        records.len(),
        T::ENTITY
    );
    Ok(records)
}

fn is_json_lines(source_file: &Path) -> bool {
    source_file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl"))
}
