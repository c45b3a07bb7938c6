//! The derived, per-cycle upserted fuel metric row.

use super::status::TruckStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which method produced the idle fuel-consumption figure, when `status = STOPPED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdleMethod {
    Ecu,
    SensorFuelRate,
    Fallback,
}

/// One cycle's derived metrics for one truck, upserted keyed on
/// `(timestamp_utc, truck_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelMetric {
    pub timestamp_utc: DateTime<Utc>,
    pub truck_id: String,
    pub carrier_id: String,
    pub status: TruckStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_mph: Option<f64>,
    pub sensor_pct: Option<f64>,
    pub estimated_pct: f64,
    pub estimated_gallons: f64,
    pub estimated_liters: f64,
    pub consumption_lph: Option<f64>,
    pub consumption_gph: Option<f64>,
    pub mpg: Option<f64>,
    pub rpm: Option<f64>,
    pub engine_hours: Option<f64>,
    pub odometer_miles: Option<f64>,
    pub altitude_ft: Option<f64>,
    pub hdop: Option<f64>,
    pub coolant_temp_f: Option<f64>,
    pub idle_method: Option<IdleMethod>,
    pub idle_mode: Option<String>,
    pub drift_pct: f64,
    pub drift_warning: bool,
    pub data_age_minutes: f64,
}

impl FuelMetric {
    /// `estimated_gallons` derived from `estimated_pct` and a truck's capacity.
    pub fn estimated_gallons(estimated_pct: f64, capacity_gallons: f64) -> f64 {
        (estimated_pct / 100.0) * capacity_gallons
    }

    /// MPG is only ever present per SPEC_FULL §4.2/§8: MOVING, speed > 5mph,
    /// gph > 0.5, and the computed value lands in [2.5, 15].
    pub fn compute_mpg(status: TruckStatus, speed_mph: f64, gph: f64) -> Option<f64> {
        if status != TruckStatus::Moving || speed_mph <= 5.0 || gph <= 0.5 {
            return None;
        }
        let mpg = speed_mph / gph;
        if (2.5..=15.0).contains(&mpg) {
            Some(mpg)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_gallons_formula() {
        assert!((FuelMetric::estimated_gallons(50.0, 200.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn mpg_absent_when_not_moving() {
        assert_eq!(FuelMetric::compute_mpg(TruckStatus::Stopped, 10.0, 1.0), None);
    }

    #[test]
    fn mpg_absent_when_out_of_band() {
        // speed/gph = 20 / 1.0 = 20, above the 15 cap
        assert_eq!(FuelMetric::compute_mpg(TruckStatus::Moving, 20.0, 1.0), None);
    }

    #[test]
    fn mpg_present_in_band() {
        let mpg = FuelMetric::compute_mpg(TruckStatus::Moving, 60.0, 6.0);
        assert_eq!(mpg, Some(10.0));
    }
}
