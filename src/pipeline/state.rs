//! Shared application state for the Telemetry Loop, State Persistence Loop,
//! and the HTTP layer (SPEC_FULL §5, §9).
//!
//! Per-truck estimator state is exclusively owned by the Telemetry Loop (see
//! [`super::coordinator`]) and never lives here; everything in `AppState` is
//! either immutable after startup or a snapshot readers consult behind a
//! lock held only for the duration of a single update, matching the
//! shared-resource policy of SPEC_FULL §5.

use crate::acquisition::TankRegistry;
use crate::aggregator::CommandCenterAggregator;
use crate::storage::{FastStateStore, PersistenceLayer};
use crate::trend::SensorBuffer;
use crate::types::{SensorSnapshot, TruckRiskScore, TruckStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Process-wide shared state. Constructed once at startup and handed to
/// every worker and HTTP handler as an `Arc<AppState>`.
pub struct AppState {
    /// Immutable-after-startup per-truck registry.
    pub registry: Arc<TankRegistry>,
    /// Latest snapshot per truck, written once per Telemetry Loop cycle.
    pub latest_snapshots: RwLock<HashMap<String, SensorSnapshot>>,
    /// Latest classified status per truck.
    pub truck_statuses: RwLock<HashMap<String, TruckStatus>>,
    /// Risk scores computed from the previous generation cycle's action
    /// items; consulted by adapters building the next cycle (a one-cycle
    /// lag, since risk scoring itself depends on adapter output — see
    /// DESIGN.md).
    pub risk_scores: RwLock<HashMap<String, TruckRiskScore>>,
    /// Bounded per-(truck, sensor) ring and EWMA/CUSUM state. Internally
    /// locked per key, so no outer lock is needed here.
    pub trend: Arc<SensorBuffer>,
    /// Dashboard/actions generation cache and adapter fan-out.
    pub aggregator: Arc<CommandCenterAggregator>,
    /// The operational store (MySQL in production, in-memory in tests).
    pub store: Arc<dyn PersistenceLayer>,
    /// The embedded (or networked) fast key-value store.
    pub fast_state: Arc<dyn FastStateStore>,

    /// Set while a Telemetry Loop cycle is in flight, so a slow cycle causes
    /// the next tick to be skipped rather than queued (SPEC_FULL §5).
    pub telemetry_cycle_in_flight: AtomicBool,
    pub telemetry_cycles_completed: AtomicU64,
    pub telemetry_cycles_skipped: AtomicU64,

    started_at: Instant,
}

impl AppState {
    pub fn new(
        registry: Arc<TankRegistry>,
        aggregator: Arc<CommandCenterAggregator>,
        store: Arc<dyn PersistenceLayer>,
        fast_state: Arc<dyn FastStateStore>,
        trend: Arc<SensorBuffer>,
    ) -> Self {
        Self {
            registry,
            latest_snapshots: RwLock::new(HashMap::new()),
            truck_statuses: RwLock::new(HashMap::new()),
            risk_scores: RwLock::new(HashMap::new()),
            trend,
            aggregator,
            store,
            fast_state,
            telemetry_cycle_in_flight: AtomicBool::new(false),
            telemetry_cycles_completed: AtomicU64::new(0),
            telemetry_cycles_skipped: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// A read-only snapshot of `latest_snapshots`, keyed by `truck_id`.
    pub async fn snapshots_view(&self) -> HashMap<String, SensorSnapshot> {
        self.latest_snapshots.read().await.clone()
    }

    pub async fn statuses_view(&self) -> HashMap<String, TruckStatus> {
        self.truck_statuses.read().await.clone()
    }

    pub async fn risk_scores_view(&self) -> HashMap<String, TruckRiskScore> {
        self.risk_scores.read().await.clone()
    }
}
