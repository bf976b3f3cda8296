use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::PaddockError;
use crate::laps::pace::QUICK_LAP_THRESHOLD;

const CONFIG_DIR_NAME: &str = "paddock";
const CONFIG_FILE_NAME: &str = "config.json";

/// Number of drivers shown in race pace charts by default
pub const PACE_DRIVER_COUNT: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Session names that get the race table instead of the best lap list
    pub race_session_names: Vec<String>,
    pub quick_lap_threshold: f64,
    pub pace_driver_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            race_session_names: vec!["Race".to_string(), "Sprint".to_string()],
            quick_lap_threshold: QUICK_LAP_THRESHOLD,
            pace_driver_count: PACE_DRIVER_COUNT,
        }
    }
}

impl AppConfig {
    pub fn is_race_session(&self, session_name: &str) -> bool {
        self.race_session_names.iter().any(|name| name == session_name)
    }

    pub fn default_path() -> Result<PathBuf, PaddockError> {
        Ok(dirs::config_dir()
            .ok_or(PaddockError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Reads the user's config file. `Ok(None)` when there is none yet.
    pub fn from_local_file() -> Result<Option<Self>, PaddockError> {
        let config_path = Self::default_path()?;
        if !config_path.exists() {
            debug!("No config file at {:?}, using defaults", config_path);
            return Ok(None);
        }
        Self::from_file(&config_path).map(Some)
    }

    pub fn from_file(config_path: &PathBuf) -> Result<Self, PaddockError> {
        let file = std::fs::File::open(config_path)
            .map_err(|e| PaddockError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| PaddockError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), PaddockError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &PathBuf) -> Result<(), PaddockError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PaddockError::ConfigIOError { source: e })?;
            }
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| PaddockError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| PaddockError::ConfigSerializeError { source: e })
    }
}
