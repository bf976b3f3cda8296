// Library interface for paddock
// This allows integration tests and benchmarks to access the pipeline

pub mod config;
pub mod errors;
pub mod laps;
pub mod overview;
pub mod race_table;
pub mod records;
pub mod writer;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::PaddockError;
pub use laps::{BestLapSummary, RaceAggregate, best_lap_times, process_lap_data, race_lap_times};
pub use overview::{SessionOverview, session_overview};
pub use race_table::{ColumnCatalog, LapStatistics, RaceColumn, RaceTable, build_race_table};
pub use records::{DriverIdentity, DriverNumber, LapRecord, SessionResult, TimeGap};
