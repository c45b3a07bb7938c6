//! Multi-sensor failure correlation detection (SPEC_FULL §4.5).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `detect_failure_correlations`: a fixed catalog of (primary sensor,
//! correlated sensors, min_correlation) patterns, each firing for a truck
//! when it has an open action matching the primary and the fraction of its
//! open actions matching the correlated set clears `min_correlation`.

use crate::config::CorrelationPattern;
use crate::types::{ActionItem, FailureCorrelation};
use std::collections::HashMap;

/// Evaluate every pattern in `patterns` against `items` (already normalized
/// `ActionItem`s across the whole fleet) and return one `FailureCorrelation`
/// per pattern that fired.
pub fn detect(items: &[ActionItem], patterns: &[CorrelationPattern]) -> Vec<FailureCorrelation> {
    let mut issues_by_truck: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in items {
        issues_by_truck
            .entry(item.truck_id.as_str())
            .or_default()
            .push(item.normalized_component.as_str());
    }
    let total_trucks_with_issues = issues_by_truck.len();

    let mut correlations = Vec::new();
    for pattern in patterns {
        let mut affected_trucks = Vec::new();
        for (truck_id, issues) in &issues_by_truck {
            let has_primary = issues.iter().any(|i| i.contains(pattern.primary_sensor.as_str()));
            if !has_primary {
                continue;
            }
            let correlated_count = pattern
                .correlated_sensors
                .iter()
                .filter(|sensor| issues.iter().any(|i| i.contains(sensor.as_str())))
                .count();
            if correlated_count == 0 || pattern.correlated_sensors.is_empty() {
                continue;
            }
            let strength = correlated_count as f64 / pattern.correlated_sensors.len() as f64;
            if strength >= pattern.min_correlation {
                affected_trucks.push((*truck_id).to_string());
            }
        }

        if affected_trucks.is_empty() {
            continue;
        }

        let overall_strength = if total_trucks_with_issues > 0 {
            affected_trucks.len() as f64 / total_trucks_with_issues as f64
        } else {
            0.0
        };

        correlations.push(FailureCorrelation {
            correlation_id: format!("CORR-{}-{}", pattern.name.to_uppercase(), uuid::Uuid::new_v4().simple()),
            primary_sensor: pattern.primary_sensor.clone(),
            correlated_sensors: pattern.correlated_sensors.clone(),
            strength: overall_strength,
            probable_cause: pattern.probable_cause.clone(),
            recommended_action: pattern.recommended_action.clone(),
            affected_trucks,
        });
    }

    correlations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionSource;

    fn pattern() -> CorrelationPattern {
        CorrelationPattern {
            name: "cooling_system_cascade".into(),
            primary_sensor: "cool_temp".into(),
            correlated_sensors: vec!["oil_temp".into(), "engine_load".into()],
            min_correlation: 0.5,
            probable_cause: "Coolant system restriction".into(),
            recommended_action: "Inspect radiator".into(),
        }
    }

    fn item(truck_id: &str, component: &str) -> ActionItem {
        ActionItem::new(
            truck_id,
            crate::types::Priority::High,
            70.0,
            "mechanical",
            component,
            component,
            "title",
            "desc",
            ActionSource::SensorHealth,
        )
    }

    #[test]
    fn pattern_fires_when_primary_and_half_correlated_match() {
        let items = vec![item("T-1", "cool_temp"), item("T-1", "oil_temp")];
        let fired = detect(&items, &[pattern()]);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].affected_trucks, vec!["T-1".to_string()]);
    }

    #[test]
    fn pattern_does_not_fire_without_primary() {
        let items = vec![item("T-1", "oil_temp"), item("T-1", "engine_load")];
        assert!(detect(&items, &[pattern()]).is_empty());
    }

    #[test]
    fn pattern_does_not_fire_below_min_correlation() {
        let mut p = pattern();
        p.correlated_sensors = vec!["oil_temp".into(), "engine_load".into(), "trans_temp".into()];
        let items = vec![item("T-1", "cool_temp"), item("T-1", "oil_temp")];
        // 1/3 correlated sensors present = 0.33 < 0.5 min_correlation
        assert!(detect(&items, &[p]).is_empty());
    }
}
