//! `FleetConfig` — all operator-tunable thresholds as TOML values.
//!
//! Every threshold that would otherwise be a scattered magic number is a
//! field here. Each struct implements `Default` with values matching
//! [`super::defaults`], so a missing config file is zero-change behavior.
//! Grounded on the teacher's `well_config.rs` struct-of-structs-with-
//! `#[serde(default)]` pattern.

use super::defaults as d;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub poll_interval_secs: u64,
    pub max_age_secs: i64,
    pub state_flush_interval_secs: u64,
    pub estimator_state_max_age_secs: i64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: d::TELEMETRY_POLL_INTERVAL_SECS,
            max_age_secs: d::DEFAULT_MAX_AGE_SECS,
            state_flush_interval_secs: d::STATE_FLUSH_INTERVAL_SECS,
            estimator_state_max_age_secs: d::ESTIMATOR_STATE_MAX_AGE_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    pub q_static: f64,
    pub q_moving: f64,
    pub r_measurement_noise: f64,
    pub variance_floor: f64,
    pub anchor_update_variance: f64,
    pub static_anchor_speed_mph: f64,
    pub static_anchor_rpm: f64,
    pub static_anchor_max_age_secs: i64,
    pub static_anchor_min_hold_secs: i64,
    pub micro_anchor_speed_band_mph: f64,
    pub micro_anchor_min_hold_secs: i64,
    pub ecu_max_gal_per_hour: f64,
    pub ecu_degraded_failure_threshold: u32,
    pub ecu_degraded_recovery_secs: i64,
    pub idle_fallback_gph: f64,
    pub drift_resync_pct: f64,
    pub drift_resync_hours: i64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            q_static: d::Q_STATIC,
            q_moving: d::Q_MOVING,
            r_measurement_noise: d::R_MEASUREMENT_NOISE,
            variance_floor: d::VARIANCE_FLOOR,
            anchor_update_variance: d::ANCHOR_UPDATE_VARIANCE,
            static_anchor_speed_mph: d::STATIC_ANCHOR_SPEED_MPH,
            static_anchor_rpm: d::STATIC_ANCHOR_RPM,
            static_anchor_max_age_secs: d::STATIC_ANCHOR_MAX_AGE_SECS,
            static_anchor_min_hold_secs: d::STATIC_ANCHOR_MIN_HOLD_SECS,
            micro_anchor_speed_band_mph: d::MICRO_ANCHOR_SPEED_BAND_MPH,
            micro_anchor_min_hold_secs: d::MICRO_ANCHOR_MIN_HOLD_SECS,
            ecu_max_gal_per_hour: d::ECU_MAX_GAL_PER_HOUR,
            ecu_degraded_failure_threshold: d::ECU_DEGRADED_FAILURE_THRESHOLD,
            ecu_degraded_recovery_secs: d::ECU_DEGRADED_RECOVERY_SECS,
            idle_fallback_gph: d::IDLE_FALLBACK_GPH,
            drift_resync_pct: d::DRIFT_RESYNC_PCT,
            drift_resync_hours: d::DRIFT_RESYNC_HOURS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefuelConfig {
    pub min_pct_jump: f64,
    pub min_gallons: f64,
    pub gap_aware_min_minutes: i64,
    pub gap_aware_max_minutes: i64,
    pub pending_window_minutes: i64,
    pub cooldown_minutes: i64,
    pub anti_noise_pct: f64,
    pub full_threshold_pct: f64,
    pub theft_suspected_pct: f64,
    pub theft_confirmed_pct: f64,
    pub theft_recovery_window_minutes: i64,
}

impl Default for RefuelConfig {
    fn default() -> Self {
        Self {
            min_pct_jump: d::REFUEL_MIN_PCT_JUMP,
            min_gallons: d::REFUEL_MIN_GALLONS,
            gap_aware_min_minutes: d::REFUEL_GAP_AWARE_MIN_MINUTES,
            gap_aware_max_minutes: d::REFUEL_GAP_AWARE_MAX_MINUTES,
            pending_window_minutes: d::REFUEL_PENDING_WINDOW_MINUTES,
            cooldown_minutes: d::REFUEL_COOLDOWN_MINUTES,
            anti_noise_pct: d::REFUEL_ANTI_NOISE_PCT,
            full_threshold_pct: d::REFUEL_FULL_THRESHOLD_PCT,
            theft_suspected_pct: d::THEFT_SUSPECTED_PCT,
            theft_confirmed_pct: d::THEFT_CONFIRMED_PCT,
            theft_recovery_window_minutes: d::THEFT_RECOVERY_WINDOW_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorRangesConfig {
    pub ranges: HashMap<String, SensorRange>,
}

impl Default for SensorRangesConfig {
    fn default() -> Self {
        let mut ranges = HashMap::new();
        ranges.insert("oil_press".into(), SensorRange { min: 0.0, max: 150.0 });
        ranges.insert("cool_temp".into(), SensorRange { min: 0.0, max: 300.0 });
        ranges.insert("voltage".into(), SensorRange { min: 0.0, max: 30.0 });
        ranges.insert("engine_load".into(), SensorRange { min: 0.0, max: 100.0 });
        ranges.insert("rpm".into(), SensorRange { min: 0.0, max: 3500.0 });
        ranges.insert("def_level".into(), SensorRange { min: 0.0, max: 100.0 });
        ranges.insert("fuel_lvl".into(), SensorRange { min: 0.0, max: 100.0 });
        ranges.insert("speed".into(), SensorRange { min: 0.0, max: 120.0 });
        ranges.insert("oil_temp".into(), SensorRange { min: -40.0, max: 300.0 });
        ranges.insert("intake_air_temp".into(), SensorRange { min: -40.0, max: 250.0 });
        Self { ranges }
    }
}

impl SensorRangesConfig {
    pub fn is_valid(&self, sensor: &str, value: f64) -> bool {
        match self.ranges.get(sensor) {
            Some(r) => value.is_finite() && value >= r.min && value <= r.max,
            None => value.is_finite(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PersistenceWindow {
    pub confirmations: u32,
    pub window_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceGateConfig {
    pub windows: HashMap<String, PersistenceWindow>,
}

impl Default for PersistenceGateConfig {
    fn default() -> Self {
        let mut windows = HashMap::new();
        windows.insert("oil_press".into(), PersistenceWindow { confirmations: 2, window_secs: 60 });
        windows.insert("cool_temp".into(), PersistenceWindow { confirmations: 2, window_secs: 120 });
        windows.insert("voltage".into(), PersistenceWindow { confirmations: 2, window_secs: 60 });
        windows.insert("trans_temp".into(), PersistenceWindow { confirmations: 3, window_secs: 300 });
        windows.insert("def_level".into(), PersistenceWindow { confirmations: 3, window_secs: 3600 });
        windows.insert("mpg".into(), PersistenceWindow { confirmations: 5, window_secs: 86400 });
        Self { windows }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub days_urgency: f64,
    pub anomaly: f64,
    pub component_criticality: f64,
    pub cost_factor: f64,
    pub days_urgency_decay_rate: f64,
    pub days_urgency_floor: f64,
    pub cost_factor_denominator: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            days_urgency: d::WEIGHT_DAYS_URGENCY,
            anomaly: d::WEIGHT_ANOMALY,
            component_criticality: d::WEIGHT_COMPONENT_CRITICALITY,
            cost_factor: d::WEIGHT_COST_FACTOR,
            days_urgency_decay_rate: d::DAYS_URGENCY_DECAY_RATE,
            days_urgency_floor: d::DAYS_URGENCY_FLOOR,
            cost_factor_denominator: d::COST_FACTOR_DENOMINATOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefConfig {
    pub derate_threshold_fraction: f64,
    pub min_daily_consumption_lpd: f64,
    pub default_daily_consumption_lpd: f64,
    pub pct_of_diesel: f64,
}

impl Default for DefConfig {
    fn default() -> Self {
        Self {
            derate_threshold_fraction: d::DEF_DERATE_THRESHOLD_FRACTION,
            min_daily_consumption_lpd: d::DEF_MIN_DAILY_CONSUMPTION_LPD,
            default_daily_consumption_lpd: d::DEF_DEFAULT_DAILY_CONSUMPTION_LPD,
            pct_of_diesel: d::DEF_PCT_OF_DIESEL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationPattern {
    pub name: String,
    pub primary_sensor: String,
    pub correlated_sensors: Vec<String>,
    pub min_correlation: f64,
    pub probable_cause: String,
    pub recommended_action: String,
}

impl Default for CorrelationPattern {
    fn default() -> Self {
        Self {
            name: String::new(),
            primary_sensor: String::new(),
            correlated_sensors: Vec::new(),
            min_correlation: 0.5,
            probable_cause: String::new(),
            recommended_action: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub patterns: Vec<CorrelationPattern>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                CorrelationPattern {
                    name: "cooling_system_cascade".into(),
                    primary_sensor: "cool_temp".into(),
                    correlated_sensors: vec!["oil_temp".into(), "engine_load".into()],
                    min_correlation: 0.5,
                    probable_cause: "Coolant system restriction driving secondary thermal load".into(),
                    recommended_action: "Inspect radiator, thermostat, and coolant level".into(),
                },
                CorrelationPattern {
                    name: "electrical_charging_fault".into(),
                    primary_sensor: "pwr_ext".into(),
                    correlated_sensors: vec!["pwr_int".into()],
                    min_correlation: 0.5,
                    probable_cause: "Alternator or charging system fault".into(),
                    recommended_action: "Inspect alternator, belt tension, and battery terminals".into(),
                },
                CorrelationPattern {
                    name: "oil_system_degradation".into(),
                    primary_sensor: "oil_press".into(),
                    correlated_sensors: vec!["oil_temp".into(), "engine_load".into()],
                    min_correlation: 0.4,
                    probable_cause: "Oil pump wear or viscosity breakdown under load".into(),
                    recommended_action: "Schedule oil and filter change, verify pump pressure".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dashboard_ttl_secs: u64,
    pub actions_ttl_secs: u64,
    pub trend_ring_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dashboard_ttl_secs: d::CACHE_TTL_DASHBOARD_SECS,
            actions_ttl_secs: d::CACHE_TTL_ACTIONS_SECS,
            trend_ring_capacity: d::TREND_RING_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: d::DEFAULT_BIND_ADDR.to_string() }
    }
}

/// Root configuration, assembled from baked defaults, an optional TOML file,
/// and (at runtime) `command_center_config` DB-row overrides — see
/// [`super::overrides`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub telemetry: TelemetryConfig,
    pub kalman: KalmanConfig,
    pub refuel: RefuelConfig,
    pub sensor_ranges: SensorRangesConfig,
    pub persistence_gates: PersistenceGateConfig,
    pub priority_weights: PriorityWeights,
    pub def: DefConfig,
    pub correlations: CorrelationConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

impl FleetConfig {
    /// Load config: baked defaults, overridden by a TOML file if present.
    /// A missing file is not an error; a malformed file logs a warning and
    /// preserves defaults (SPEC_FULL §9).
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "loaded fleet config from TOML");
                    cfg
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "malformed config TOML, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "no config file present, using defaults");
                Self::default()
            }
        }
    }
}
