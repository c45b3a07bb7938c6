//! Persisted per-(truck, sensor) EWMA/CUSUM/baseline trend state (SPEC_FULL §4.4/§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of the most recently computed linear trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Persisted EWMA/CUSUM/baseline state for one (truck, sensor) pair.
///
/// Upserted into `cc_algorithm_state` keyed on `(truck_id, sensor_name)`
/// and/or mirrored to the embedded fast-state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmState {
    pub truck_id: String,
    pub sensor_name: String,
    pub ewma_value: f64,
    pub ewma_variance: f64,
    pub cusum_high: f64,
    pub cusum_low: f64,
    pub baseline_mean: f64,
    pub baseline_std: f64,
    pub samples_count: u64,
    pub trend_direction: TrendDirection,
    pub trend_slope: f64,
    pub updated_at: DateTime<Utc>,
}

impl AlgorithmState {
    /// A freshly initialized state seeded from the first observed value.
    pub fn seed(truck_id: impl Into<String>, sensor_name: impl Into<String>, first_value: f64, now: DateTime<Utc>) -> Self {
        Self {
            truck_id: truck_id.into(),
            sensor_name: sensor_name.into(),
            ewma_value: first_value,
            ewma_variance: 0.0,
            cusum_high: 0.0,
            cusum_low: 0.0,
            baseline_mean: first_value,
            baseline_std: 0.0,
            samples_count: 1,
            trend_direction: TrendDirection::Stable,
            trend_slope: 0.0,
            updated_at: now,
        }
    }
}
