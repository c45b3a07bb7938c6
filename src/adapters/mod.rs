//! Action Source Adapters: six independent detectors normalized onto a
//! common `ActionItem` shape (SPEC_FULL §4.6).
//!
//! Each adapter's data source is an external collaborator per SPEC_FULL
//! §1/§4.6 (a trained ML model, a DTC text database, a live telemetry
//! stream); this module shapes and prioritizes whatever that collaborator
//! already surfaced, against the typed, already-computed state this crate
//! holds (current snapshots, trend/algorithm state, risk scores) rather than
//! re-implementing the upstream model itself.

mod dtc_events;
mod engine_health;
mod ml_anomaly;
mod normalize;
mod predictive_maintenance;
mod priority;
mod real_time_predictive;
mod sensor_health;
mod steps;

pub use dtc_events::DtcEventsAdapter;
pub use engine_health::EngineHealthAdapter;
pub use ml_anomaly::MlAnomalyAdapter;
pub use normalize::normalize as normalize_component;
pub use predictive_maintenance::PredictiveMaintenanceAdapter;
pub use priority::{score as priority_score, select_action_type, PriorityInputs};
pub use real_time_predictive::RealTimePredictiveAdapter;
pub use sensor_health::SensorHealthAdapter;
pub use steps::action_steps_for;

use crate::config::{FleetConfig, PersistenceGateConfig};
use crate::trend::SensorBuffer;
use crate::types::{ActionItem, SensorSnapshot, TruckConfig, TruckRiskScore};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{source_name} adapter failed: {message}")]
    SourceFailed { source_name: &'static str, message: String },
}

/// Read-only view of the fleet's current state an adapter may consult.
/// Built once per generation cycle and shared across all adapters.
pub struct AdapterContext<'a> {
    pub trucks: &'a [TruckConfig],
    pub latest_snapshots: &'a HashMap<String, SensorSnapshot>,
    pub risk_scores: &'a HashMap<String, TruckRiskScore>,
    pub trend: &'a SensorBuffer,
    pub persistence: &'a PersistenceGateConfig,
    pub config: &'a FleetConfig,
}

/// The common contract every action source adapter implements
/// (SPEC_FULL §4.6). A failing adapter must not abort a generation cycle
/// (SPEC_FULL §4.8) — callers wrap `generate` and isolate errors per adapter.
#[async_trait]
pub trait ActionSourceAdapter: Send + Sync {
    /// Human-readable name used in error messages and `ActionItem.sources`.
    fn name(&self) -> &'static str;

    async fn generate(&self, ctx: &AdapterContext<'_>) -> Result<Vec<ActionItem>, AdapterError>;
}
