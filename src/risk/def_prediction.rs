//! DEF (diesel exhaust fluid) depletion prediction and alert banding
//! (SPEC_FULL §4.5).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `predict_def_depletion`; the alert banding and recommendation strings are
//! an addition the original's bare day-counts didn't carry.

use crate::config::DefConfig;
use crate::types::{DefAlertLevel, DEFPrediction};

const DIESEL_GAL_TO_LITERS: f64 = crate::types::GALLONS_TO_LITERS;
/// DEF tank capacity; not yet exposed per-truck, so a fleet-wide default is
/// used until a truck-specific tank size is plumbed through.
const DEF_TANK_CAPACITY_LITERS: f64 = 75.0;

/// Predict DEF depletion for one truck given its current level and, when
/// available, recent driving data to refine the daily consumption estimate.
pub fn predict(
    current_level_pct: f64,
    daily_miles: Option<f64>,
    avg_mpg: Option<f64>,
    cfg: &DefConfig,
) -> DEFPrediction {
    let current_liters = (current_level_pct / 100.0) * DEF_TANK_CAPACITY_LITERS;

    let daily_def_liters = match (daily_miles, avg_mpg) {
        (Some(miles), Some(mpg)) if mpg > 0.0 => {
            let daily_diesel_gallons = miles / mpg;
            let daily_diesel_liters = daily_diesel_gallons * DIESEL_GAL_TO_LITERS;
            daily_diesel_liters * cfg.pct_of_diesel
        }
        _ => cfg.default_daily_consumption_lpd,
    }
    .max(cfg.min_daily_consumption_lpd);

    let days_until_empty = current_liters / daily_def_liters;

    let derate_threshold_liters = cfg.derate_threshold_fraction * DEF_TANK_CAPACITY_LITERS;
    let liters_until_derate = current_liters - derate_threshold_liters;
    let days_until_derate = (liters_until_derate / daily_def_liters).max(0.0);

    DEFPrediction {
        current_level_pct,
        estimated_liters_remaining: current_liters,
        avg_consumption_liters_per_day: daily_def_liters,
        days_until_empty,
        days_until_derate,
        last_fill: None,
    }
}

/// One alert band plus a short operator-facing recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefAlert {
    pub level: DefAlertLevel,
    pub recommendation: &'static str,
}

/// Band a `DEFPrediction`'s `days_until_derate` into an alert level with a
/// short recommendation string.
pub fn alert_for(prediction: &DEFPrediction) -> DefAlert {
    let days = prediction.days_until_derate;
    if days <= 1.0 {
        DefAlert {
            level: DefAlertLevel::Critical,
            recommendation: "Schedule DEF refill within 24h — derate imminent",
        }
    } else if days <= 3.0 {
        DefAlert {
            level: DefAlertLevel::High,
            recommendation: "Refill DEF within 3 days to avoid derate",
        }
    } else if days <= 7.0 {
        DefAlert {
            level: DefAlertLevel::Medium,
            recommendation: "Plan a DEF refill this week",
        }
    } else {
        DefAlert {
            level: DefAlertLevel::Ok,
            recommendation: "DEF level normal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_consumption_used_without_driving_data() {
        let cfg = DefConfig::default();
        let prediction = predict(50.0, None, None, &cfg);
        assert!(prediction.days_until_empty > 0.0);
        assert!(prediction.estimated_liters_remaining > 0.0);
    }

    #[test]
    fn driving_data_refines_daily_consumption() {
        let cfg = DefConfig::default();
        let without = predict(50.0, None, None, &cfg);
        let with = predict(50.0, Some(400.0), Some(6.0), &cfg);
        assert_ne!(without.avg_consumption_liters_per_day, with.avg_consumption_liters_per_day);
    }

    #[test]
    fn zero_consumption_floored_to_avoid_division_by_zero() {
        let mut cfg = DefConfig::default();
        cfg.default_daily_consumption_lpd = 0.0;
        let prediction = predict(50.0, None, None, &cfg);
        assert!(prediction.days_until_empty.is_finite());
    }

    #[test]
    fn alert_bands_match_day_thresholds() {
        let cfg = DefConfig::default();
        let critical = predict(2.0, None, None, &cfg);
        assert_eq!(alert_for(&critical).level, DefAlertLevel::Critical);

        let ok = predict(95.0, None, None, &cfg);
        assert_eq!(alert_for(&ok).level, DefAlertLevel::Ok);
    }
}
