//! Multi-sensor failure correlation records (SPEC_FULL §4.5).

use serde::{Deserialize, Serialize};

/// A firing of a fixed failure-correlation pattern across the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureCorrelation {
    pub correlation_id: String,
    pub primary_sensor: String,
    pub correlated_sensors: Vec<String>,
    /// `affected_trucks / total_trucks_with_any_issue`, in `[0, 1]`.
    pub strength: f64,
    pub probable_cause: String,
    pub recommended_action: String,
    pub affected_trucks: Vec<String>,
}
