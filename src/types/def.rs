//! DEF (diesel exhaust fluid) depletion prediction (SPEC_FULL §4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Predicted DEF depletion for one truck, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DEFPrediction {
    pub current_level_pct: f64,
    pub estimated_liters_remaining: f64,
    pub avg_consumption_liters_per_day: f64,
    pub days_until_empty: f64,
    pub days_until_derate: f64,
    pub last_fill: Option<DateTime<Utc>>,
}

/// Operator-facing urgency banding for a `DEFPrediction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefAlertLevel {
    Ok,
    Medium,
    High,
    Critical,
}

impl DefAlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DefAlertLevel::Ok => "ok",
            DefAlertLevel::Medium => "medium",
            DefAlertLevel::High => "high",
            DefAlertLevel::Critical => "critical",
        }
    }
}
