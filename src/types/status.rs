//! Truck operating status classification.

use serde::{Deserialize, Serialize};

/// Mutually exclusive truck operating status.
///
/// MPG is derived only when `MOVING`; idle classification only when `STOPPED`.
/// The source system's legacy "IDLE" status-count key is never produced here —
/// see DESIGN.md Open Question (a).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TruckStatus {
    Moving,
    Stopped,
    Parked,
    Offline,
}

impl TruckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TruckStatus::Moving => "MOVING",
            TruckStatus::Stopped => "STOPPED",
            TruckStatus::Parked => "PARKED",
            TruckStatus::Offline => "OFFLINE",
        }
    }
}

impl std::fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
