// Meeting and session metadata used to pick the session being explored

use serde::{Deserialize, Serialize};

/// First season with lap timing available from the data source
pub const FIRST_SEASON: i32 = 2023;

/// A race weekend grouping several sessions at one circuit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub meeting_key: i64,
    pub year: Option<i32>,
    pub circuit_short_name: Option<String>,
    pub meeting_name: Option<String>,
}

impl Meeting {
    /// Label shown when choosing a meeting, e.g. "Monza - Italian Grand Prix".
    pub fn display_name(&self) -> String {
        let circuit = self.circuit_short_name.as_deref().unwrap_or_default();
        match &self.meeting_name {
            Some(name) => format!("{} - {}", circuit, name),
            None => circuit.to_string(),
        }
    }

    /// Default meeting for a season: the second to last one listed, which is
    /// the most recent meeting with a completed weekend during a season.
    pub fn default_selection(meetings: &[Meeting]) -> Option<&Meeting> {
        meetings.get(meetings.len().saturating_sub(2))
    }

    pub fn find_by_display_name<'a>(meetings: &'a [Meeting], name: &str) -> Option<&'a Meeting> {
        meetings.iter().find(|m| m.display_name() == name)
    }
}

/// A timed track activity within a meeting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_key: i64,
    pub session_name: String,
    pub meeting_key: Option<i64>,
}

impl SessionInfo {
    /// Default session for a meeting: the last one listed.
    pub fn default_selection(sessions: &[SessionInfo]) -> Option<&SessionInfo> {
        sessions.last()
    }

    pub fn find_by_name<'a>(sessions: &'a [SessionInfo], name: &str) -> Option<&'a SessionInfo> {
        sessions.iter().find(|s| s.session_name == name)
    }
}

/// Seasons that can be explored, oldest first, up to `latest_season`.
pub fn available_seasons(latest_season: i32) -> Vec<i32> {
    (FIRST_SEASON..=latest_season).collect()
}
