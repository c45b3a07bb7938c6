//! Centralized named constants, grouped by subsystem.
//!
//! These mirror the `Default` impls in [`super::FleetConfig`] and its
//! sub-structs; kept as free constants too where other modules want them
//! without threading a `&FleetConfig` through (e.g. `#[derive(Default)]`
//! struct literals, tests).

/// Telemetry Loop cadence, seconds (SPEC_FULL §4.1/§5).
pub const TELEMETRY_POLL_INTERVAL_SECS: u64 = 20;
/// Default max age of an accepted sensor reading.
pub const DEFAULT_MAX_AGE_SECS: i64 = 3600;
/// State Persistence Loop cadence, seconds (SPEC_FULL §5).
pub const STATE_FLUSH_INTERVAL_SECS: u64 = 60;
/// Reject persisted estimator state older than this on load (SPEC_FULL §4.2).
pub const ESTIMATOR_STATE_MAX_AGE_SECS: i64 = 2 * 3600;

/// Kalman process-noise floor for a stationary truck.
pub const Q_STATIC: f64 = 0.01;
/// Kalman process-noise for a moving truck, ~4x the static floor.
pub const Q_MOVING: f64 = 0.04;
/// Measurement noise used in the Kalman update gain.
pub const R_MEASUREMENT_NOISE: f64 = 9.0;
/// Variance floor; the filter never reports more confidence than this allows.
pub const VARIANCE_FLOOR: f64 = 0.5;
/// Variance set immediately after a refuel or anchor-confirmed resync.
pub const ANCHOR_UPDATE_VARIANCE: f64 = 1.0;

/// Static anchor: speed threshold, mph.
pub const STATIC_ANCHOR_SPEED_MPH: f64 = 2.0;
/// Static anchor: rpm threshold.
pub const STATIC_ANCHOR_RPM: f64 = 400.0;
/// Static anchor: max data age, seconds.
pub const STATIC_ANCHOR_MAX_AGE_SECS: i64 = 30;
/// Static anchor: minimum hold duration before it gates an update, seconds.
pub const STATIC_ANCHOR_MIN_HOLD_SECS: i64 = 30;
/// Micro anchor: speed band half-width, mph.
pub const MICRO_ANCHOR_SPEED_BAND_MPH: f64 = 2.0;
/// Micro anchor: minimum hold duration, seconds (3 min).
pub const MICRO_ANCHOR_MIN_HOLD_SECS: i64 = 180;

/// ECU consumption: max plausible gal/h; larger deltas are rejected.
pub const ECU_MAX_GAL_PER_HOUR: f64 = 40.0;
/// Consecutive ECU validation failures before entering degraded mode.
pub const ECU_DEGRADED_FAILURE_THRESHOLD: u32 = 5;
/// Degraded-mode recovery attempt interval, seconds (10 min).
pub const ECU_DEGRADED_RECOVERY_SECS: i64 = 10 * 60;
/// Idle fallback consumption, gal/h, when no ECU or sensor fuel rate is available.
pub const IDLE_FALLBACK_GPH: f64 = 0.8;

/// Refuel: minimum percent jump to be considered a candidate.
pub const REFUEL_MIN_PCT_JUMP: f64 = 15.0;
/// Refuel: minimum gallons added to be considered a candidate.
pub const REFUEL_MIN_GALLONS: f64 = 5.0;
/// Refuel: gap-aware detection window lower bound, minutes.
pub const REFUEL_GAP_AWARE_MIN_MINUTES: i64 = 5;
/// Refuel: gap-aware detection window upper bound, minutes.
pub const REFUEL_GAP_AWARE_MAX_MINUTES: i64 = 120;
/// Refuel: pending-window accumulation timeout, minutes.
pub const REFUEL_PENDING_WINDOW_MINUTES: i64 = 10;
/// Refuel: cooldown between finalized events, minutes.
pub const REFUEL_COOLDOWN_MINUTES: i64 = 30;
/// Refuel: anti-noise check, percent below ring median beyond which the
/// "before" reading is rejected as a sensor glitch.
pub const REFUEL_ANTI_NOISE_PCT: f64 = 25.0;
/// Full-tank classification threshold, percent.
pub const REFUEL_FULL_THRESHOLD_PCT: f64 = 90.0;

/// Theft: suspected drop threshold, percent, while STOPPED.
pub const THEFT_SUSPECTED_PCT: f64 = 10.0;
/// Theft: confirmed drop threshold, percent, while STOPPED.
pub const THEFT_CONFIRMED_PCT: f64 = 25.0;
/// Theft: recovery window in which a drop is reclassified as sensor noise, minutes.
pub const THEFT_RECOVERY_WINDOW_MINUTES: i64 = 15;

/// Drift/emergency resync: sustained divergence threshold, percent.
pub const DRIFT_RESYNC_PCT: f64 = 30.0;
/// Drift/emergency resync: sustained duration required, hours.
pub const DRIFT_RESYNC_HOURS: i64 = 2;

/// Status classifier thresholds (SPEC_FULL §4.3).
pub const OFFLINE_DATA_AGE_MINUTES: f64 = 15.0;
pub const MOVING_SPEED_MPH: f64 = 2.0;
pub const STOPPED_FUEL_RATE_LPH: f64 = 0.3;
pub const STOPPED_COOLANT_F: f64 = 120.0;
pub const PARKED_SHORE_POWER_VOLTAGE: f64 = 13.2;
pub const PARKED_MIN_VOLTAGE: f64 = 11.5;
pub const PARKED_COOLANT_MIN_F: f64 = 60.0;
pub const PARKED_DATA_AGE_MINUTES: f64 = 5.0;

/// MPG derivation gates (SPEC_FULL §3/§8).
pub const MPG_MIN_SPEED_MPH: f64 = 5.0;
pub const MPG_MIN_GPH: f64 = 0.5;
pub const MPG_MIN: f64 = 2.5;
pub const MPG_MAX: f64 = 15.0;

/// Sensor buffer ring size per (truck, sensor).
pub const SENSOR_RING_SIZE: usize = 10;
/// Fuel-history ring size used for the refuel anti-noise median check.
pub const FUEL_HISTORY_RING_SIZE: usize = 5;

/// EWMA smoothing factor.
pub const EWMA_ALPHA: f64 = 0.3;
/// CUSUM alert threshold, sensor units.
pub const CUSUM_THRESHOLD: f64 = 5.0;

/// Priority scoring weights (SPEC_FULL §4.6), must sum to 1.0.
pub const WEIGHT_DAYS_URGENCY: f64 = 0.45;
pub const WEIGHT_ANOMALY: f64 = 0.20;
pub const WEIGHT_COMPONENT_CRITICALITY: f64 = 0.25;
pub const WEIGHT_COST_FACTOR: f64 = 0.10;
/// Days-urgency exponential decay rate.
pub const DAYS_URGENCY_DECAY_RATE: f64 = 0.04;
/// Days-urgency floor when `days_to_critical` is supplied.
pub const DAYS_URGENCY_FLOOR: f64 = 5.0;
/// Cost-factor normalization denominator, USD.
pub const COST_FACTOR_DENOMINATOR: f64 = 15_000.0;

/// Priority band boundaries.
pub const PRIORITY_CRITICAL_MIN: f64 = 85.0;
pub const PRIORITY_HIGH_MIN: f64 = 65.0;
pub const PRIORITY_MEDIUM_MIN: f64 = 40.0;
pub const PRIORITY_LOW_MIN: f64 = 20.0;

/// DEF: derate threshold as a fraction of tank capacity.
pub const DEF_DERATE_THRESHOLD_FRACTION: f64 = 0.05;
/// DEF: floor on daily consumption, L/day, to avoid division by zero.
pub const DEF_MIN_DAILY_CONSUMPTION_LPD: f64 = 0.1;
/// DEF: default daily average consumption absent mileage/MPG inputs, L/day.
pub const DEF_DEFAULT_DAILY_CONSUMPTION_LPD: f64 = 4.0;
/// DEF fraction of diesel consumption, used when deriving from daily miles/MPG.
pub const DEF_PCT_OF_DIESEL: f64 = 0.03;

/// Command-center cache TTLs, seconds.
pub const CACHE_TTL_DASHBOARD_SECS: u64 = 30;
pub const CACHE_TTL_ACTIONS_SECS: u64 = 15;

/// Trend-snapshot ring capacity.
pub const TREND_RING_CAPACITY: usize = 1000;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
