//! `PersistenceLayer` trait — pluggable operational-store backend
//! (SPEC_FULL §6, §10.5).
//!
//! Abstracts the eight operational tables so pipeline and API code never
//! depend on a concrete database; an in-memory implementation backs unit
//! and integration tests without a live MySQL instance, and a `sqlx`-backed
//! implementation serves production. Every write method takes one typed
//! struct parameter, never a loose key/value map (SPEC_FULL §9 Open
//! Question c).

use crate::config::ConfigRow;
use crate::types::{AlgorithmState, AnomalyEvent, CorrelationEvent, DefHistoryEntry, FuelMetric, RefuelEvent, TruckRiskScore};
use async_trait::async_trait;

/// Operational-store errors.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Pluggable backend for the eight operational tables of SPEC_FULL §6.
///
/// Implementations must be thread-safe (`Send + Sync`) for shared access
/// across async tasks.
#[async_trait]
pub trait PersistenceLayer: Send + Sync {
    /// Upsert a `fuel_metrics` row, keyed `(timestamp_utc, truck_id)`.
    async fn upsert_fuel_metric(&self, metric: &FuelMetric) -> Result<(), PersistenceError>;

    /// Insert a finalized `refuel_events` row.
    async fn insert_refuel_event(&self, event: &RefuelEvent) -> Result<(), PersistenceError>;

    /// Append a `cc_risk_history` row.
    async fn append_risk_history(&self, score: &TruckRiskScore) -> Result<(), PersistenceError>;

    /// Append a `cc_anomaly_history` row.
    async fn append_anomaly_history(&self, event: &AnomalyEvent) -> Result<(), PersistenceError>;

    /// Upsert a `cc_algorithm_state` row keyed `(truck_id, sensor_name)`.
    async fn upsert_algorithm_state(&self, state: &AlgorithmState) -> Result<(), PersistenceError>;

    /// Fetch the current `cc_algorithm_state` row for a (truck, sensor) pair.
    async fn get_algorithm_state(&self, truck_id: &str, sensor_name: &str) -> Result<Option<AlgorithmState>, PersistenceError>;

    /// Append a `cc_correlation_events` row.
    async fn append_correlation_event(&self, event: &CorrelationEvent) -> Result<(), PersistenceError>;

    /// Append a `cc_def_history` row.
    async fn append_def_history(&self, entry: &DefHistoryEntry) -> Result<(), PersistenceError>;

    /// Fetch all active rows from `command_center_config`, for config
    /// resolution (SPEC_FULL §9).
    async fn list_active_config_rows(&self) -> Result<Vec<ConfigRow>, PersistenceError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// In-memory operational store for testing and minimal deployments.
///
/// Thread-safe via `RwLock`. Not durable — data lost on restart.
pub struct InMemoryDAL {
    fuel_metrics: std::sync::RwLock<Vec<FuelMetric>>,
    refuel_events: std::sync::RwLock<Vec<RefuelEvent>>,
    risk_history: std::sync::RwLock<Vec<TruckRiskScore>>,
    anomaly_history: std::sync::RwLock<Vec<AnomalyEvent>>,
    algorithm_state: std::sync::RwLock<std::collections::HashMap<(String, String), AlgorithmState>>,
    correlation_events: std::sync::RwLock<Vec<CorrelationEvent>>,
    def_history: std::sync::RwLock<Vec<DefHistoryEntry>>,
    config_rows: std::sync::RwLock<Vec<ConfigRow>>,
    max_history: usize,
}

impl InMemoryDAL {
    pub fn new() -> Self {
        Self {
            fuel_metrics: std::sync::RwLock::new(Vec::new()),
            refuel_events: std::sync::RwLock::new(Vec::new()),
            risk_history: std::sync::RwLock::new(Vec::new()),
            anomaly_history: std::sync::RwLock::new(Vec::new()),
            algorithm_state: std::sync::RwLock::new(std::collections::HashMap::new()),
            correlation_events: std::sync::RwLock::new(Vec::new()),
            def_history: std::sync::RwLock::new(Vec::new()),
            config_rows: std::sync::RwLock::new(Vec::new()),
            max_history: 10_000,
        }
    }

    /// Seed the config rows this DAL reports as active, for tests that
    /// exercise config resolution against a `PersistenceLayer`.
    pub fn set_config_rows(&self, rows: Vec<ConfigRow>) {
        #[allow(clippy::unwrap_used)]
        let mut store = self.config_rows.write().unwrap();
        *store = rows;
    }

    pub fn fuel_metric_count(&self) -> usize {
        #[allow(clippy::unwrap_used)]
        self.fuel_metrics.read().unwrap().len()
    }

    pub fn refuel_event_count(&self) -> usize {
        #[allow(clippy::unwrap_used)]
        self.refuel_events.read().unwrap().len()
    }
}

impl Default for InMemoryDAL {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceLayer for InMemoryDAL {
    async fn upsert_fuel_metric(&self, metric: &FuelMetric) -> Result<(), PersistenceError> {
        let mut store = self.fuel_metrics.write().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        store.retain(|m| !(m.timestamp_utc == metric.timestamp_utc && m.truck_id == metric.truck_id));
        store.push(metric.clone());
        if store.len() > self.max_history {
            store.remove(0);
        }
        Ok(())
    }

    async fn insert_refuel_event(&self, event: &RefuelEvent) -> Result<(), PersistenceError> {
        let mut store = self.refuel_events.write().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        store.push(event.clone());
        Ok(())
    }

    async fn append_risk_history(&self, score: &TruckRiskScore) -> Result<(), PersistenceError> {
        let mut store = self.risk_history.write().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        store.push(score.clone());
        if store.len() > self.max_history {
            store.remove(0);
        }
        Ok(())
    }

    async fn append_anomaly_history(&self, event: &AnomalyEvent) -> Result<(), PersistenceError> {
        let mut store = self.anomaly_history.write().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        store.push(event.clone());
        if store.len() > self.max_history {
            store.remove(0);
        }
        Ok(())
    }

    async fn upsert_algorithm_state(&self, state: &AlgorithmState) -> Result<(), PersistenceError> {
        let mut store = self.algorithm_state.write().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        store.insert((state.truck_id.clone(), state.sensor_name.clone()), state.clone());
        Ok(())
    }

    async fn get_algorithm_state(&self, truck_id: &str, sensor_name: &str) -> Result<Option<AlgorithmState>, PersistenceError> {
        let store = self.algorithm_state.read().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(store.get(&(truck_id.to_string(), sensor_name.to_string())).cloned())
    }

    async fn append_correlation_event(&self, event: &CorrelationEvent) -> Result<(), PersistenceError> {
        let mut store = self.correlation_events.write().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        store.push(event.clone());
        if store.len() > self.max_history {
            store.remove(0);
        }
        Ok(())
    }

    async fn append_def_history(&self, entry: &DefHistoryEntry) -> Result<(), PersistenceError> {
        let mut store = self.def_history.write().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        store.push(entry.clone());
        if store.len() > self.max_history {
            store.remove(0);
        }
        Ok(())
    }

    async fn list_active_config_rows(&self) -> Result<Vec<ConfigRow>, PersistenceError> {
        let store = self.config_rows.read().map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(store.iter().filter(|r| r.active).cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

/// `sqlx`-backed operational store against the MySQL schema of SPEC_FULL §6.
///
/// Queries are built with the dynamic `sqlx::query` API rather than the
/// `query!` compile-time-checked macros, since this lineage's development
/// mode never runs the toolchain against a live database.
pub struct MySqlPersistence {
    pool: sqlx::MySqlPool,
}

impl MySqlPersistence {
    /// Connect with a bounded pool, per SPEC_FULL §10.5.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, PersistenceError> {
        let pool = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Borrow the underlying pool, so startup code can build a `TankRegistry`
    /// from the same connection this store uses.
    pub fn pool(&self) -> &sqlx::MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl PersistenceLayer for MySqlPersistence {
    async fn upsert_fuel_metric(&self, metric: &FuelMetric) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO fuel_metrics (
                timestamp_utc, truck_id, carrier_id, status, latitude, longitude, speed_mph,
                sensor_pct, estimated_pct, estimated_gallons, estimated_liters,
                consumption_lph, consumption_gph, mpg, rpm, engine_hours, odometer_miles,
                altitude_ft, hdop, coolant_temp_f, idle_method, idle_mode, drift_pct,
                drift_warning, data_age_minutes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                carrier_id = VALUES(carrier_id), status = VALUES(status),
                latitude = VALUES(latitude), longitude = VALUES(longitude),
                speed_mph = VALUES(speed_mph), sensor_pct = VALUES(sensor_pct),
                estimated_pct = VALUES(estimated_pct), estimated_gallons = VALUES(estimated_gallons),
                estimated_liters = VALUES(estimated_liters), consumption_lph = VALUES(consumption_lph),
                consumption_gph = VALUES(consumption_gph), mpg = VALUES(mpg), rpm = VALUES(rpm),
                engine_hours = VALUES(engine_hours), odometer_miles = VALUES(odometer_miles),
                altitude_ft = VALUES(altitude_ft), hdop = VALUES(hdop),
                coolant_temp_f = VALUES(coolant_temp_f), idle_method = VALUES(idle_method),
                idle_mode = VALUES(idle_mode), drift_pct = VALUES(drift_pct),
                drift_warning = VALUES(drift_warning), data_age_minutes = VALUES(data_age_minutes)",
        )
        .bind(metric.timestamp_utc)
        .bind(&metric.truck_id)
        .bind(&metric.carrier_id)
        .bind(metric.status.as_str())
        .bind(metric.latitude)
        .bind(metric.longitude)
        .bind(metric.speed_mph)
        .bind(metric.sensor_pct)
        .bind(metric.estimated_pct)
        .bind(metric.estimated_gallons)
        .bind(metric.estimated_liters)
        .bind(metric.consumption_lph)
        .bind(metric.consumption_gph)
        .bind(metric.mpg)
        .bind(metric.rpm)
        .bind(metric.engine_hours)
        .bind(metric.odometer_miles)
        .bind(metric.altitude_ft)
        .bind(metric.hdop)
        .bind(metric.coolant_temp_f)
        .bind(metric.idle_method.map(|m| format!("{m:?}").to_uppercase()))
        .bind(&metric.idle_mode)
        .bind(metric.drift_pct)
        .bind(metric.drift_warning)
        .bind(metric.data_age_minutes)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn insert_refuel_event(&self, event: &RefuelEvent) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO refuel_events (
                truck_id, start_timestamp, end_timestamp, pct_before, pct_after,
                gallons_added, classification, detection_source
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.truck_id)
        .bind(event.start_timestamp)
        .bind(event.end_timestamp)
        .bind(event.pct_before)
        .bind(event.pct_after)
        .bind(event.gallons_added)
        .bind(format!("{:?}", event.classification).to_uppercase())
        .bind(format!("{:?}", event.detection_source).to_uppercase())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn append_risk_history(&self, score: &TruckRiskScore) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO cc_risk_history (
                truck_id, risk_score, risk_level, active_issues_count, days_since_maintenance, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&score.truck_id)
        .bind(score.risk_score)
        .bind(score.risk_level.as_str())
        .bind(score.active_issue_count)
        .bind(score.days_since_maintenance)
        .bind(score.computed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn append_anomaly_history(&self, event: &AnomalyEvent) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO cc_anomaly_history (
                truck_id, sensor_name, anomaly_type, severity, sensor_value, ewma_value,
                cusum_value, threshold, z_score, detected_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.truck_id)
        .bind(&event.sensor_name)
        .bind(&event.anomaly_type)
        .bind(&event.severity)
        .bind(event.sensor_value)
        .bind(event.ewma_value)
        .bind(event.cusum_value)
        .bind(event.threshold)
        .bind(event.z_score)
        .bind(event.detected_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn upsert_algorithm_state(&self, state: &AlgorithmState) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO cc_algorithm_state (
                truck_id, sensor_name, ewma_value, ewma_variance, cusum_high, cusum_low,
                baseline_mean, baseline_std, samples_count, trend_direction, trend_slope, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                ewma_value = VALUES(ewma_value), ewma_variance = VALUES(ewma_variance),
                cusum_high = VALUES(cusum_high), cusum_low = VALUES(cusum_low),
                baseline_mean = VALUES(baseline_mean), baseline_std = VALUES(baseline_std),
                samples_count = VALUES(samples_count), trend_direction = VALUES(trend_direction),
                trend_slope = VALUES(trend_slope), updated_at = VALUES(updated_at)",
        )
        .bind(&state.truck_id)
        .bind(&state.sensor_name)
        .bind(state.ewma_value)
        .bind(state.ewma_variance)
        .bind(state.cusum_high)
        .bind(state.cusum_low)
        .bind(state.baseline_mean)
        .bind(state.baseline_std)
        .bind(state.samples_count)
        .bind(format!("{:?}", state.trend_direction).to_uppercase())
        .bind(state.trend_slope)
        .bind(state.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_algorithm_state(&self, truck_id: &str, sensor_name: &str) -> Result<Option<AlgorithmState>, PersistenceError> {
        let row = sqlx::query_as::<_, AlgorithmStateRow>(
            "SELECT truck_id, sensor_name, ewma_value, ewma_variance, cusum_high, cusum_low,
                    baseline_mean, baseline_std, samples_count, trend_direction, trend_slope, updated_at
             FROM cc_algorithm_state WHERE truck_id = ? AND sensor_name = ?",
        )
        .bind(truck_id)
        .bind(sensor_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        row.map(TryInto::try_into).transpose()
    }

    async fn append_correlation_event(&self, event: &CorrelationEvent) -> Result<(), PersistenceError> {
        let sensors_involved = serde_json::to_string(&event.sensors_involved).map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        let sensor_values = serde_json::to_string(&event.sensor_values).map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        sqlx::query(
            "INSERT INTO cc_correlation_events (
                pattern_name, description, confidence, sensors_involved, sensor_values,
                predicted_component, predicted_failure_days, recommended_action, detected_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.pattern_name)
        .bind(&event.description)
        .bind(event.confidence)
        .bind(sensors_involved)
        .bind(sensor_values)
        .bind(&event.predicted_component)
        .bind(event.predicted_failure_days)
        .bind(&event.recommended_action)
        .bind(event.detected_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn append_def_history(&self, entry: &DefHistoryEntry) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO cc_def_history (
                truck_id, def_level, fuel_used_since_refill, estimated_def_used,
                consumption_rate, is_refill_event, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.truck_id)
        .bind(entry.def_level)
        .bind(entry.fuel_used_since_refill)
        .bind(entry.estimated_def_used)
        .bind(entry.consumption_rate)
        .bind(entry.is_refill_event)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn list_active_config_rows(&self) -> Result<Vec<ConfigRow>, PersistenceError> {
        let rows = sqlx::query_as::<_, ConfigRowSql>("SELECT `key`, value, category, active FROM command_center_config WHERE active = TRUE")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn backend_name(&self) -> &'static str {
        "MySQL"
    }
}

#[derive(sqlx::FromRow)]
struct ConfigRowSql {
    key: String,
    value: String,
    category: String,
    active: bool,
}

impl From<ConfigRowSql> for ConfigRow {
    fn from(row: ConfigRowSql) -> Self {
        ConfigRow { key: row.key, value: row.value, category: row.category, active: row.active }
    }
}

#[derive(sqlx::FromRow)]
struct AlgorithmStateRow {
    truck_id: String,
    sensor_name: String,
    ewma_value: f64,
    ewma_variance: f64,
    cusum_high: f64,
    cusum_low: f64,
    baseline_mean: f64,
    baseline_std: f64,
    samples_count: i64,
    trend_direction: String,
    trend_slope: f64,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<AlgorithmStateRow> for AlgorithmState {
    type Error = PersistenceError;

    fn try_from(row: AlgorithmStateRow) -> Result<Self, Self::Error> {
        use crate::types::TrendDirection;
        let trend_direction = match row.trend_direction.as_str() {
            "UP" => TrendDirection::Up,
            "DOWN" => TrendDirection::Down,
            "STABLE" => TrendDirection::Stable,
            other => return Err(PersistenceError::Serialization(format!("unknown trend_direction {other:?}"))),
        };
        Ok(AlgorithmState {
            truck_id: row.truck_id,
            sensor_name: row.sensor_name,
            ewma_value: row.ewma_value,
            ewma_variance: row.ewma_variance,
            cusum_high: row.cusum_high,
            cusum_low: row.cusum_low,
            baseline_mean: row.baseline_mean,
            baseline_std: row.baseline_std,
            samples_count: row.samples_count.max(0) as u64,
            trend_direction,
            trend_slope: row.trend_slope,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RefuelClassification, RefuelDetectionSource, RiskLevel, TrendDirection, TruckStatus};
    use chrono::Utc;

    fn make_risk_score(truck_id: &str) -> TruckRiskScore {
        TruckRiskScore {
            truck_id: truck_id.to_string(),
            risk_score: 42.0,
            risk_level: RiskLevel::Medium,
            contributing_factors: vec!["elevated oil temp".to_string()],
            days_since_maintenance: Some(10.0),
            active_issue_count: 1,
            predicted_failure_days: Some(14.0),
            computed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_risk_history_appends() {
        let dal = InMemoryDAL::new();
        dal.append_risk_history(&make_risk_score("T-1")).await.unwrap();
        dal.append_risk_history(&make_risk_score("T-1")).await.unwrap();
        assert_eq!(dal.risk_history.read().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn in_memory_algorithm_state_upsert_replaces() {
        let dal = InMemoryDAL::new();
        let mut state = AlgorithmState::seed("T-1", "oil_press", 45.0, Utc::now());
        dal.upsert_algorithm_state(&state).await.unwrap();
        state.samples_count = 5;
        state.trend_direction = TrendDirection::Up;
        dal.upsert_algorithm_state(&state).await.unwrap();

        let fetched = dal.get_algorithm_state("T-1", "oil_press").await.unwrap().unwrap();
        assert_eq!(fetched.samples_count, 5);
        assert_eq!(fetched.trend_direction, TrendDirection::Up);
    }

    #[tokio::test]
    async fn in_memory_fuel_metric_upsert_replaces_same_key() {
        let dal = InMemoryDAL::new();
        let now = Utc::now();
        let metric = FuelMetric {
            timestamp_utc: now,
            truck_id: "T-1".to_string(),
            carrier_id: "carrier".to_string(),
            status: TruckStatus::Moving,
            latitude: None,
            longitude: None,
            speed_mph: Some(40.0),
            sensor_pct: Some(50.0),
            estimated_pct: 49.0,
            estimated_gallons: 98.0,
            estimated_liters: 370.9,
            consumption_lph: None,
            consumption_gph: None,
            mpg: None,
            rpm: None,
            engine_hours: None,
            odometer_miles: None,
            altitude_ft: None,
            hdop: None,
            coolant_temp_f: None,
            idle_method: None,
            idle_mode: None,
            drift_pct: 1.0,
            drift_warning: false,
            data_age_minutes: 0.5,
        };
        dal.upsert_fuel_metric(&metric).await.unwrap();
        let mut updated = metric.clone();
        updated.estimated_pct = 52.0;
        dal.upsert_fuel_metric(&updated).await.unwrap();
        assert_eq!(dal.fuel_metric_count(), 1);
    }

    #[tokio::test]
    async fn in_memory_config_rows_filters_inactive() {
        let dal = InMemoryDAL::new();
        dal.set_config_rows(vec![
            ConfigRow { key: "sensor_range_oil_press_min".to_string(), value: "10".to_string(), category: "sensor_range".to_string(), active: true },
            ConfigRow { key: "sensor_range_oil_press_max".to_string(), value: "90".to_string(), category: "sensor_range".to_string(), active: false },
        ]);
        let rows = dal.list_active_config_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, "sensor_range_oil_press_min");
    }

    #[tokio::test]
    async fn trait_object_reports_backend_name() {
        let dal: Box<dyn PersistenceLayer> = Box::new(InMemoryDAL::new());
        assert_eq!(dal.backend_name(), "InMemory");
        dal.insert_refuel_event(&RefuelEvent {
            truck_id: "T-1".to_string(),
            start_timestamp: Utc::now(),
            end_timestamp: Utc::now(),
            pct_before: 10.0,
            pct_after: 90.0,
            gallons_added: 160.0,
            classification: RefuelClassification::Full,
            detection_source: RefuelDetectionSource::GapAware,
        }).await.unwrap();
    }
}
