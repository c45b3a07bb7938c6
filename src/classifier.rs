//! Status Classifier: the 8-rule first-match decision tree that labels a
//! truck MOVING / STOPPED / PARKED / OFFLINE (SPEC_FULL §4.3).
//!
//! MPG is derived only for MOVING; idle-consumption classification only for
//! STOPPED — callers gate on the returned label rather than re-deriving it.

use crate::types::TruckStatus;

/// The subset of a [`crate::types::SensorSnapshot`] the classifier reads,
/// plus the data-age figure computed against the current poll time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierInputs {
    pub speed_mph: Option<f64>,
    pub rpm: Option<f64>,
    pub fuel_rate_lph: Option<f64>,
    pub data_age_minutes: f64,
    pub voltage_external: Option<f64>,
    pub engine_load_pct: Option<f64>,
    pub coolant_temp_f: Option<f64>,
}

const OFFLINE_DATA_AGE_MINUTES: f64 = crate::config::defaults::OFFLINE_DATA_AGE_MINUTES;
const MOVING_SPEED_MPH: f64 = crate::config::defaults::MOVING_SPEED_MPH;
const STOPPED_FUEL_RATE_LPH: f64 = crate::config::defaults::STOPPED_FUEL_RATE_LPH;
const STOPPED_COOLANT_F: f64 = crate::config::defaults::STOPPED_COOLANT_F;
const PARKED_SHORE_POWER_VOLTAGE: f64 = crate::config::defaults::PARKED_SHORE_POWER_VOLTAGE;
const PARKED_MIN_VOLTAGE: f64 = crate::config::defaults::PARKED_MIN_VOLTAGE;
const PARKED_COOLANT_MIN_F: f64 = crate::config::defaults::PARKED_COOLANT_MIN_F;
const PARKED_DATA_AGE_MINUTES: f64 = crate::config::defaults::PARKED_DATA_AGE_MINUTES;

/// Classify a truck's current status. First matching rule wins (SPEC_FULL §4.3).
///
/// The legacy "IDLE" status-count key some upstream dashboards carry is never
/// produced here — see DESIGN.md Open Question (a); STOPPED is the sole
/// canonical label for an engine-on, non-moving truck.
pub fn classify(inputs: ClassifierInputs) -> TruckStatus {
    if inputs.data_age_minutes > OFFLINE_DATA_AGE_MINUTES {
        return TruckStatus::Offline;
    }
    let Some(speed) = inputs.speed_mph else {
        return TruckStatus::Offline;
    };
    if speed > MOVING_SPEED_MPH {
        return TruckStatus::Moving;
    }

    let engine_on = inputs.rpm.map(|r| r > 0.0).unwrap_or(false)
        || inputs.fuel_rate_lph.map(|r| r > STOPPED_FUEL_RATE_LPH).unwrap_or(false)
        || inputs.engine_load_pct.map(|l| l > 0.0).unwrap_or(false)
        || inputs.coolant_temp_f.map(|c| c > STOPPED_COOLANT_F).unwrap_or(false);
    if engine_on {
        return TruckStatus::Stopped;
    }

    if let Some(voltage) = inputs.voltage_external {
        if voltage > PARKED_SHORE_POWER_VOLTAGE {
            return TruckStatus::Parked;
        }
        if voltage > PARKED_MIN_VOLTAGE {
            return TruckStatus::Parked;
        }
    }

    if let Some(coolant) = inputs.coolant_temp_f {
        if coolant > PARKED_COOLANT_MIN_F && coolant <= STOPPED_COOLANT_F {
            return TruckStatus::Parked;
        }
    }

    if inputs.data_age_minutes < PARKED_DATA_AGE_MINUTES {
        return TruckStatus::Parked;
    }

    TruckStatus::Offline
}
