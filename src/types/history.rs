//! Append-only operational-store row types (SPEC_FULL §6) that have no
//! natural home among the in-memory aggregator types: anomaly detections,
//! correlation-pattern firings, and DEF history entries all outlive a
//! single generation cycle and carry slightly different fields than their
//! in-memory cousins ([`super::FailureCorrelation`], [`super::DEFPrediction`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of `cc_anomaly_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub truck_id: String,
    pub sensor_name: String,
    pub anomaly_type: String,
    pub severity: String,
    pub sensor_value: f64,
    pub ewma_value: f64,
    pub cusum_value: f64,
    pub threshold: f64,
    pub z_score: f64,
    pub detected_at: DateTime<Utc>,
}

/// One row of `cc_correlation_events`: a firing of a correlation pattern,
/// enriched with the sensor values observed at detection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEvent {
    pub pattern_name: String,
    pub description: String,
    pub confidence: f64,
    pub sensors_involved: Vec<String>,
    pub sensor_values: HashMap<String, f64>,
    pub predicted_component: String,
    pub predicted_failure_days: Option<f64>,
    pub recommended_action: String,
    pub detected_at: DateTime<Utc>,
}

/// One row of `cc_def_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefHistoryEntry {
    pub truck_id: String,
    pub def_level: f64,
    pub fuel_used_since_refill: f64,
    pub estimated_def_used: f64,
    pub consumption_rate: f64,
    pub is_refill_event: bool,
    pub timestamp: DateTime<Utc>,
}
