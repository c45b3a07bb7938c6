//! One poll cycle's worth of raw sensor readings for a single truck.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single reading set returned by the Telemetry Reader for one truck.
///
/// Every numeric field is optional: absent means "no fresh reading within the
/// parameter's freshness budget", not zero. `timestamp` is always UTC-aware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub truck_id: String,
    pub unit_id: i64,
    pub timestamp: DateTime<Utc>,
    pub epoch_seconds: i64,

    pub fuel_level_pct: Option<f64>,
    pub speed_mph: Option<f64>,
    pub rpm: Option<f64>,
    pub odometer_miles: Option<f64>,
    pub fuel_rate_lph: Option<f64>,
    pub coolant_temp_f: Option<f64>,
    pub oil_temp_f: Option<f64>,
    pub intake_air_temp_f: Option<f64>,
    pub oil_pressure_psi: Option<f64>,
    pub voltage_external: Option<f64>,
    pub voltage_internal: Option<f64>,
    pub engine_load_pct: Option<f64>,
    pub def_level_pct: Option<f64>,
    pub engine_hours: Option<f64>,
    pub total_fuel_used_gal: Option<f64>,
    pub total_idle_fuel_gal: Option<f64>,
    pub idle_hours: Option<f64>,
    pub satellites: Option<f64>,
    pub hdop: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub course: Option<f64>,
    pub dtc_codes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SensorSnapshot {
    /// Build an otherwise-empty snapshot for `truck_id`/`unit_id` at `timestamp`.
    /// Used by the reader to seed a snapshot before filling in per-parameter values.
    pub fn empty(truck_id: impl Into<String>, unit_id: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            truck_id: truck_id.into(),
            unit_id,
            timestamp,
            epoch_seconds: timestamp.timestamp(),
            fuel_level_pct: None,
            speed_mph: None,
            rpm: None,
            odometer_miles: None,
            fuel_rate_lph: None,
            coolant_temp_f: None,
            oil_temp_f: None,
            intake_air_temp_f: None,
            oil_pressure_psi: None,
            voltage_external: None,
            voltage_internal: None,
            engine_load_pct: None,
            def_level_pct: None,
            engine_hours: None,
            total_fuel_used_gal: None,
            total_idle_fuel_gal: None,
            idle_hours: None,
            satellites: None,
            hdop: None,
            altitude_ft: None,
            course: None,
            dtc_codes: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Age of this snapshot relative to `now`, in whole minutes (never negative).
    pub fn data_age_minutes(&self, now: DateTime<Utc>) -> f64 {
        let secs = (now - self.timestamp).num_seconds().max(0) as f64;
        secs / 60.0
    }
}

/// The upstream parameter-name whitelist queried from the `sensors` table.
///
/// Order is not significant; this is the full set of `p` values the reader
/// will ever ask for.
pub const WHITELISTED_PARAMETERS: &[&str] = &[
    "fuel_lvl",
    "speed",
    "rpm",
    "odom",
    "fuel_rate",
    "cool_temp",
    "hdop",
    "altitude",
    "obd_speed",
    "engine_hours",
    "pwr_ext",
    "oil_press",
    "total_fuel_used",
    "total_idle_fuel",
    "engine_load",
    "air_temp",
    "oil_temp",
    "def_level",
    "intake_air_temp",
    "dtc",
    "idle_hours",
    "sats",
    "pwr_int",
    "course",
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn data_age_minutes_never_negative() {
        let now = Utc::now();
        let snap = SensorSnapshot::empty("T-1", 1, now + Duration::seconds(5));
        assert_eq!(snap.data_age_minutes(now), 0.0);
    }

    #[test]
    fn data_age_minutes_computed_correctly() {
        let now = Utc::now();
        let snap = SensorSnapshot::empty("T-1", 1, now - Duration::minutes(7));
        assert!((snap.data_age_minutes(now) - 7.0).abs() < 0.05);
    }
}
