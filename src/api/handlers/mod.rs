//! API route handlers for the `/api/command-center` surface (SPEC_FULL §6).
//!
//! Each submodule owns one group of closely related endpoints; all of them
//! share [`ApiState`] and respond through the [`super::envelope`] wrapper.

mod config;
mod dashboard;
mod detect;
mod health;
mod risk;
mod trends;

pub use config::get_config;
pub use dashboard::{get_actions, get_dashboard, get_truck, get_truck_comprehensive};
pub use detect::{get_spn, run_detect};
pub use health::{get_health, get_insights};
pub use risk::{get_correlations, get_def_prediction, get_risk_scores};
pub use trends::{get_trends, record_trend};

use crate::background::TrendSnapshotRecorder;
use crate::pipeline::AppState;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub app: Arc<AppState>,
    pub recorder: Arc<TrendSnapshotRecorder>,
}

impl ApiState {
    pub fn new(app: Arc<AppState>, recorder: Arc<TrendSnapshotRecorder>) -> Self {
        Self { app, recorder }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::acquisition::TankRegistry;
    use crate::aggregator::CommandCenterAggregator;
    use crate::config::{CacheConfig, FleetConfig};
    use crate::storage::{InMemoryDAL, PersistenceLayer, SledFastStateStore};
    use crate::trend::SensorBuffer;
    use crate::types::TruckConfig;

    /// Build an `ApiState` backed entirely by in-memory/embedded
    /// implementations, for router-level handler tests.
    pub fn test_state() -> ApiState {
        if !crate::config::is_initialized() {
            crate::config::init(FleetConfig::default());
        }
        let config = FleetConfig::default();
        let registry = Arc::new(
            TankRegistry::from_trucks(vec![TruckConfig::new("T-1", 1, 200.0, "acme", None)]).unwrap(),
        );
        let aggregator = Arc::new(CommandCenterAggregator::new(&CacheConfig::default()));
        let store: Arc<dyn PersistenceLayer> = Arc::new(InMemoryDAL::new());
        let dir = tempfile::tempdir().unwrap();
        let fast_state = Arc::new(SledFastStateStore::open(dir.path()).unwrap());
        let trend = Arc::new(SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()));
        let app = Arc::new(AppState::new(registry, aggregator, store, fast_state, trend));
        ApiState::new(app, Arc::new(TrendSnapshotRecorder::new()))
    }
}
