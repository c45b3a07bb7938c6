//! Telemetry Loop and State Persistence Loop (SPEC_FULL §5).
//!
//! Grounded on the teacher's acquisition/processing worker pair: a single
//! owner task polls the upstream reader, classifies and estimates each
//! truck, then fans the results out to shared state and the operational
//! store, while a second periodic task snapshots in-flight estimator and
//! trend state so a restart loses at most one flush interval.

use crate::acquisition::{AcquisitionError, TelemetryReader};
use crate::adapters::AdapterContext;
use crate::aggregator::{AggregatorError, DashboardResponse};
use crate::classifier::{self, ClassifierInputs};
use crate::config::{FleetConfig, KalmanConfig, RefuelConfig};
use crate::estimator::engine::{self, EstimatorError};
use crate::risk::{self, RiskInputs};
use crate::trend::AnomalySeverity;
use crate::types::{
    ActionItem, AlgorithmState, AnomalyEvent, EstimatorState, FuelMetric, RefuelEvent,
    SensorSnapshot, TruckConfig, TruckRiskScore,
};

use super::AppState;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sensor fields carried on [`SensorSnapshot`] that the trend engine tracks,
/// paired with the config/trend key they are ingested under.
const TREND_FIELDS: &[(&str, fn(&SensorSnapshot) -> Option<f64>)] = &[
    ("oil_press", |s| s.oil_pressure_psi),
    ("cool_temp", |s| s.coolant_temp_f),
    ("voltage", |s| s.voltage_external),
    ("engine_load", |s| s.engine_load_pct),
    ("rpm", |s| s.rpm),
    ("def_level", |s| s.def_level_pct),
    ("fuel_lvl", |s| s.fuel_level_pct),
    ("speed", |s| s.speed_mph),
    ("oil_temp", |s| s.oil_temp_f),
    ("intake_air_temp", |s| s.intake_air_temp_f),
];

/// Run the Telemetry Loop until the process is shut down.
///
/// Each tick is skipped rather than queued if the previous one is still in
/// flight, so a slow upstream poll never causes ticks to pile up.
pub async fn run_telemetry_loop(
    state: Arc<AppState>,
    mut reader: Box<dyn TelemetryReader>,
    config: Arc<FleetConfig>,
) {
    let mut estimator_states: HashMap<String, EstimatorState> = HashMap::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(config.telemetry.poll_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if state
            .telemetry_cycle_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            state.telemetry_cycles_skipped.fetch_add(1, Ordering::Relaxed);
            warn!("telemetry cycle skipped: previous cycle still in flight");
            continue;
        }

        if let Err(e) = run_one_cycle(&state, reader.as_mut(), &config, &mut estimator_states).await {
            error!("telemetry cycle failed: {e}");
        }

        state.telemetry_cycle_in_flight.store(false, Ordering::SeqCst);
        state.telemetry_cycles_completed.fetch_add(1, Ordering::Relaxed);
    }
}

async fn run_one_cycle(
    state: &AppState,
    reader: &mut dyn TelemetryReader,
    config: &FleetConfig,
    estimator_states: &mut HashMap<String, EstimatorState>,
) -> Result<(), AcquisitionError> {
    let snapshots = reader
        .read_all_trucks(&state.registry, config.telemetry.max_age_secs)
        .await?;

    debug!(count = snapshots.len(), "telemetry cycle: snapshots read");

    let mut new_snapshots = HashMap::with_capacity(snapshots.len());
    let mut new_statuses = HashMap::with_capacity(snapshots.len());

    for snapshot in &snapshots {
        let Some(truck) = state.registry.by_truck_id(&snapshot.truck_id) else {
            warn!(truck_id = %snapshot.truck_id, "snapshot for unknown truck, dropping");
            continue;
        };

        let status = classify_snapshot(snapshot);

        let estimator_state = estimator_states
            .entry(truck.truck_id.clone())
            .or_insert_with(|| {
                EstimatorState::fresh(
                    truck.truck_id.clone(),
                    snapshot.fuel_level_pct.unwrap_or(50.0),
                    config.kalman.variance_floor,
                )
            });

        match step_estimator(estimator_state, snapshot, truck, status, &config.kalman, &config.refuel) {
            Ok((metric, refuel, theft)) => {
                if let Err(e) = state.store.upsert_fuel_metric(&metric).await {
                    error!(truck_id = %truck.truck_id, "failed to upsert fuel metric: {e}");
                }
                if let Some(event) = refuel {
                    if let Err(e) = state.store.insert_refuel_event(&event).await {
                        error!(truck_id = %truck.truck_id, "failed to insert refuel event: {e}");
                    }
                }
                if let Some(severity) = theft {
                    persist_theft_event(state, snapshot, severity).await;
                }
            }
            Err(e) => {
                warn!(truck_id = %truck.truck_id, "estimator step rejected: {e}");
            }
        }

        ingest_trend_fields(state, snapshot, config).await;

        new_snapshots.insert(truck.truck_id.clone(), snapshot.clone());
        new_statuses.insert(truck.truck_id.clone(), status);
    }

    *state.latest_snapshots.write().await = new_snapshots;
    *state.truck_statuses.write().await = new_statuses;

    Ok(())
}

fn classify_snapshot(snapshot: &SensorSnapshot) -> crate::types::TruckStatus {
    let now = Utc::now();
    classifier::classify(ClassifierInputs {
        speed_mph: snapshot.speed_mph,
        rpm: snapshot.rpm,
        fuel_rate_lph: snapshot.fuel_rate_lph,
        data_age_minutes: snapshot.data_age_minutes(now),
        voltage_external: snapshot.voltage_external,
        engine_load_pct: snapshot.engine_load_pct,
        coolant_temp_f: snapshot.coolant_temp_f,
    })
}

/// Run one truck's estimator step and assemble the `FuelMetric` row from it.
fn step_estimator(
    estimator_state: &mut EstimatorState,
    snapshot: &SensorSnapshot,
    truck: &TruckConfig,
    status: crate::types::TruckStatus,
    kalman_cfg: &KalmanConfig,
    refuel_cfg: &RefuelConfig,
) -> Result<(FuelMetric, Option<RefuelEvent>, Option<crate::types::TheftSeverity>), EstimatorError> {
    let outcome = engine::step(estimator_state, snapshot, truck, status, kalman_cfg, refuel_cfg)?;

    let estimated_gallons = FuelMetric::estimated_gallons(estimator_state.mean_pct, truck.capacity_gallons);
    let mpg = outcome
        .consumption_gph
        .and_then(|gph| snapshot.speed_mph.map(|speed| FuelMetric::compute_mpg(status, speed, gph)))
        .flatten();

    let metric = FuelMetric {
        timestamp_utc: snapshot.timestamp,
        truck_id: truck.truck_id.clone(),
        carrier_id: truck.carrier_id.clone(),
        status,
        latitude: snapshot.latitude,
        longitude: snapshot.longitude,
        speed_mph: snapshot.speed_mph,
        sensor_pct: snapshot.fuel_level_pct,
        estimated_pct: estimator_state.mean_pct,
        estimated_gallons,
        estimated_liters: estimated_gallons * crate::types::GALLONS_TO_LITERS,
        consumption_lph: outcome.consumption_gph.map(|g| g * crate::types::GALLONS_TO_LITERS),
        consumption_gph: outcome.consumption_gph,
        mpg,
        rpm: snapshot.rpm,
        engine_hours: snapshot.engine_hours,
        odometer_miles: snapshot.odometer_miles,
        altitude_ft: snapshot.altitude_ft,
        hdop: snapshot.hdop,
        coolant_temp_f: snapshot.coolant_temp_f,
        idle_method: outcome.idle_method,
        idle_mode: if status == crate::types::TruckStatus::Stopped {
            outcome.idle_method.map(|m| format!("{m:?}"))
        } else {
            None
        },
        drift_pct: outcome.drift_pct,
        drift_warning: outcome.drift_warning,
        data_age_minutes: snapshot.data_age_minutes(Utc::now()),
    };

    Ok((metric, outcome.refuel_event, outcome.theft_severity))
}

/// Persist a suspected or confirmed theft as a `fuel_lvl` anomaly, since the
/// operational store has no dedicated theft table (SPEC_FULL §4.2/§6).
async fn persist_theft_event(state: &AppState, snapshot: &SensorSnapshot, severity: crate::types::TheftSeverity) {
    let event = AnomalyEvent {
        truck_id: snapshot.truck_id.clone(),
        sensor_name: "fuel_lvl".to_string(),
        anomaly_type: "THEFT".to_string(),
        severity: match severity {
            crate::types::TheftSeverity::Suspected => "WARNING".to_string(),
            crate::types::TheftSeverity::Confirmed => "CRITICAL".to_string(),
        },
        sensor_value: snapshot.fuel_level_pct.unwrap_or(0.0),
        ewma_value: 0.0,
        cusum_value: 0.0,
        threshold: 0.0,
        z_score: 0.0,
        detected_at: snapshot.timestamp,
    };
    if let Err(e) = state.store.append_anomaly_history(&event).await {
        error!(truck_id = %snapshot.truck_id, "failed to append theft anomaly: {e}");
    }
}

/// Ingest this snapshot's trend-tracked fields into the shared `SensorBuffer`,
/// persisting any anomaly the trend engine declares.
async fn ingest_trend_fields(state: &AppState, snapshot: &SensorSnapshot, config: &FleetConfig) {
    for (sensor, getter) in TREND_FIELDS {
        let Some(value) = getter(snapshot) else { continue };
        if !config.sensor_ranges.is_valid(sensor, value) {
            continue;
        }
        if let Some(record) = state.trend.ingest(&snapshot.truck_id, sensor, value, snapshot.timestamp) {
            persist_anomaly(state, snapshot, sensor, &record).await;
        }
    }
}

async fn persist_anomaly(
    state: &AppState,
    snapshot: &SensorSnapshot,
    sensor: &str,
    record: &crate::trend::AnomalyRecord,
) {
    let baseline = state.trend.snapshot(&snapshot.truck_id, sensor);
    let z_score = baseline
        .as_ref()
        .filter(|alg| alg.baseline_std > 0.0)
        .map(|alg| (record.sensor_value - alg.baseline_mean) / alg.baseline_std)
        .unwrap_or(0.0);

    let event = AnomalyEvent {
        truck_id: snapshot.truck_id.clone(),
        sensor_name: sensor.to_string(),
        anomaly_type: format!("{:?}", record.anomaly_type).to_uppercase(),
        severity: severity_label(record.severity).to_string(),
        sensor_value: record.sensor_value,
        ewma_value: record.ewma_value,
        cusum_value: record.cusum_value,
        threshold: record.threshold,
        z_score,
        detected_at: snapshot.timestamp,
    };

    if let Err(e) = state.store.append_anomaly_history(&event).await {
        error!(truck_id = %snapshot.truck_id, sensor, "failed to append anomaly history: {e}");
    }
}

fn severity_label(severity: AnomalySeverity) -> &'static str {
    match severity {
        AnomalySeverity::Warning => "WARNING",
        AnomalySeverity::Critical => "CRITICAL",
    }
}

/// Run the State Persistence Loop: periodically flush trend state to the
/// fast-state store and the operational store without blocking the
/// Telemetry Loop.
///
/// The flush work is spawned onto its own task each period; a slow flush
/// delays the next flush's scheduling, never a telemetry poll.
pub async fn run_state_persistence_loop(state: Arc<AppState>, config: Arc<FleetConfig>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(config.telemetry.state_flush_interval_secs));
    loop {
        ticker.tick().await;
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            flush_state(&state).await;
        });
    }
}

async fn flush_state(state: &AppState) {
    let snapshots = state.snapshots_view().await;
    let mut flushed = 0usize;
    for truck_id in snapshots.keys() {
        for (sensor, _) in TREND_FIELDS {
            if let Some(alg) = state.trend.snapshot(truck_id, sensor) {
                flush_algorithm_state(state, &alg).await;
                flushed += 1;
            }
        }
    }
    info!(truck_count = snapshots.len(), states_flushed = flushed, "state persistence flush complete");
}

/// Build an `AdapterContext` from the current shared state and run one
/// Command-Center Generation cycle (SPEC_FULL §4.8), then refresh risk
/// scores from its output for the next cycle to consult.
///
/// This is the single entry point HTTP handlers and the Trend-Snapshot
/// Recorder use to obtain a dashboard; the TTL cache inside
/// `AppState.aggregator` means repeated calls within the cache window are
/// cheap.
pub async fn run_generation_cycle(
    state: &AppState,
    config: &FleetConfig,
    bypass_cache: bool,
) -> Result<(DashboardResponse, bool), AggregatorError> {
    let trucks: Vec<TruckConfig> = state.registry.all().cloned().collect();
    let snapshots = state.snapshots_view().await;
    let risk_scores = state.risk_scores_view().await;
    let statuses = state.statuses_view().await;

    let ctx = AdapterContext {
        trucks: &trucks,
        latest_snapshots: &snapshots,
        risk_scores: &risk_scores,
        trend: &state.trend,
        persistence: &config.persistence_gates,
        config,
    };

    let (response, from_cache) = state.aggregator.dashboard(&ctx, &statuses, bypass_cache).await?;

    if !from_cache {
        refresh_risk_scores(state, &response.action_items).await;
    }

    Ok((response, from_cache))
}

async fn flush_algorithm_state(state: &AppState, alg: &AlgorithmState) {
    if let Err(e) = state.fast_state.put_algorithm_state(alg).await {
        error!(truck_id = %alg.truck_id, sensor = %alg.sensor_name, "failed to flush algorithm state: {e}");
    }
    if let Err(e) = state.store.upsert_algorithm_state(alg).await {
        error!(truck_id = %alg.truck_id, sensor = %alg.sensor_name, "failed to upsert algorithm state: {e}");
    }
}

/// Recompute each truck's risk score from a freshly generated dashboard's
/// action items and store it for the *next* generation cycle's
/// `AdapterContext` to consult.
///
/// Risk scoring depends on `ActionItem`s, which are themselves adapter
/// output, so there is an unavoidable one-cycle lag: this cycle's items
/// produce the risk scores that feed the next cycle's adapters, not this
/// one's (see DESIGN.md).
pub async fn refresh_risk_scores(state: &AppState, items: &[ActionItem]) {
    let mut by_truck: HashMap<&str, Vec<&ActionItem>> = HashMap::new();
    for item in items {
        by_truck.entry(item.truck_id.as_str()).or_default().push(item);
    }

    let mut scores: HashMap<String, TruckRiskScore> = HashMap::new();
    for (truck_id, truck_items) in by_truck {
        let owned: Vec<ActionItem> = truck_items.into_iter().cloned().collect();
        let active_sensor_alert_count = owned
            .iter()
            .filter(|i| i.sources.iter().any(|s| s == "Sensor Health Monitor"))
            .count() as u32;

        let score = risk::calculate_risk_score(
            truck_id,
            &owned,
            RiskInputs {
                days_since_maintenance: None,
                active_sensor_alert_count,
            },
        );
        if let Err(e) = state.store.append_risk_history(&score).await {
            error!(truck_id, "failed to append risk history: {e}");
        }
        scores.insert(truck_id.to_string(), score);
    }

    *state.risk_scores.write().await = scores;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::storage::{InMemoryDAL, PersistenceLayer, SledFastStateStore};
    use crate::aggregator::CommandCenterAggregator;
    use crate::acquisition::TankRegistry;
    use crate::types::{Confidence, Priority};

    async fn test_state() -> AppState {
        let config = FleetConfig::default();
        let registry = Arc::new(TankRegistry::from_trucks(vec![TruckConfig::new("T-1", 1, 200.0, "acme", None)]).unwrap());
        let aggregator = Arc::new(CommandCenterAggregator::new(&CacheConfig::default()));
        let store: Arc<dyn PersistenceLayer> = Arc::new(InMemoryDAL::new());
        let dir = tempfile::tempdir().unwrap();
        let fast_state: Arc<dyn crate::storage::FastStateStore> = Arc::new(SledFastStateStore::open(dir.path()).unwrap());
        let trend = Arc::new(crate::trend::SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()));
        AppState::new(registry, aggregator, store, fast_state, trend)
    }

    #[tokio::test]
    async fn refresh_risk_scores_groups_items_by_truck() {
        let state = test_state().await;
        let mut item = ActionItem::new(
            "T-1",
            Priority::Critical,
            90.0,
            "engine",
            "oil pressure",
            "oil_press",
            "Oil pressure critical",
            "detected low oil pressure",
            crate::types::ActionSource::SensorHealth,
        );
        item.confidence = Confidence::High;

        refresh_risk_scores(&state, std::slice::from_ref(&item)).await;

        let scores = state.risk_scores_view().await;
        let score = scores.get("T-1").expect("risk score computed for T-1");
        assert!(score.risk_score > 0.0);
        assert_eq!(score.active_issue_count, 1);
    }

    #[tokio::test]
    async fn telemetry_cycle_skipped_when_already_in_flight() {
        let state = test_state().await;
        state.telemetry_cycle_in_flight.store(true, Ordering::SeqCst);
        assert!(state
            .telemetry_cycle_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err());
    }
}
