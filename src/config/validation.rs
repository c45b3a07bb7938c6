//! Startup validation of a loaded [`FleetConfig`].

use super::FleetConfig;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("priority weights must sum to ~1.0, got {0:.4}")]
    PriorityWeightsDoNotSumToOne(f64),
    #[error("sensor range for '{0}' has min >= max ({1} >= {2})")]
    InvalidSensorRange(String, f64, f64),
    #[error("persistence window for '{0}' requires at least 1 confirmation")]
    InvalidPersistenceWindow(String),
    #[error("cache TTL for '{0}' must be > 0")]
    InvalidCacheTtl(&'static str),
    #[error("server bind_addr is empty")]
    EmptyBindAddr,
}

/// Validate a config, returning every violation found (not just the first).
pub fn validate(cfg: &FleetConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    let weight_sum = cfg.priority_weights.days_urgency
        + cfg.priority_weights.anomaly
        + cfg.priority_weights.component_criticality
        + cfg.priority_weights.cost_factor;
    if (weight_sum - 1.0).abs() > 0.01 {
        errors.push(ConfigValidationError::PriorityWeightsDoNotSumToOne(weight_sum));
    }

    for (sensor, range) in &cfg.sensor_ranges.ranges {
        if range.min >= range.max {
            errors.push(ConfigValidationError::InvalidSensorRange(
                sensor.clone(),
                range.min,
                range.max,
            ));
        }
    }

    for (sensor, window) in &cfg.persistence_gates.windows {
        if window.confirmations == 0 {
            errors.push(ConfigValidationError::InvalidPersistenceWindow(sensor.clone()));
        }
    }

    if cfg.cache.dashboard_ttl_secs == 0 {
        errors.push(ConfigValidationError::InvalidCacheTtl("dashboard"));
    }
    if cfg.cache.actions_ttl_secs == 0 {
        errors.push(ConfigValidationError::InvalidCacheTtl("actions"));
    }

    if cfg.server.bind_addr.trim().is_empty() {
        errors.push(ConfigValidationError::EmptyBindAddr);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&FleetConfig::default()).is_ok());
    }

    #[test]
    fn bad_weight_sum_detected() {
        let mut cfg = FleetConfig::default();
        cfg.priority_weights.anomaly = 0.9;
        let errs = validate(&cfg).unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ConfigValidationError::PriorityWeightsDoNotSumToOne(_))));
    }

    #[test]
    fn bad_sensor_range_detected() {
        let mut cfg = FleetConfig::default();
        cfg.sensor_ranges
            .ranges
            .insert("oil_press".into(), super::super::SensorRange { min: 100.0, max: 10.0 });
        let errs = validate(&cfg).unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidSensorRange(..))));
    }

    #[test]
    fn empty_bind_addr_detected() {
        let mut cfg = FleetConfig::default();
        cfg.server.bind_addr = "  ".into();
        let errs = validate(&cfg).unwrap_err();
        assert!(errs.iter().any(|e| matches!(e, ConfigValidationError::EmptyBindAddr)));
    }
}
