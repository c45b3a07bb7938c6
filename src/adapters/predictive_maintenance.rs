//! Predictive Maintenance adapter: projects a sensor's trend slope forward
//! to estimate days until it crosses its configured range boundary
//! (SPEC_FULL §4.4/§4.6).

use super::{action_steps_for, normalize_component, priority_score, select_action_type, ActionSourceAdapter, AdapterContext, AdapterError};
use crate::types::{ActionItem, ActionSource, Confidence, TrendDirection};
use async_trait::async_trait;

/// Sensors this adapter watches for a projectable trend, with the edge of
/// their valid range that matters (the one degradation approaches).
const WATCHED_SENSORS: &[&str] = &["oil_press", "cool_temp", "voltage", "def_level"];
/// Only act on projections inside this horizon; farther-out trends are noise.
const MAX_PROJECTION_DAYS: f64 = 30.0;

pub struct PredictiveMaintenanceAdapter;

#[async_trait]
impl ActionSourceAdapter for PredictiveMaintenanceAdapter {
    fn name(&self) -> &'static str {
        "Predictive Maintenance"
    }

    async fn generate(&self, ctx: &AdapterContext<'_>) -> Result<Vec<ActionItem>, AdapterError> {
        let mut items = Vec::new();
        let weights = &ctx.config.priority_weights;

        for truck in ctx.trucks {
            for sensor in WATCHED_SENSORS {
                let Some(state) = ctx.trend.snapshot(&truck.truck_id, sensor) else {
                    continue;
                };
                if state.trend_direction == TrendDirection::Stable || state.trend_slope == 0.0 {
                    continue;
                }
                let Some(range) = ctx.config.sensor_ranges.ranges.get(*sensor) else {
                    continue;
                };

                // Degradation direction depends on the sensor: oil pressure
                // and voltage degrade downward, coolant and DEF depletion
                // read as approaching the low/high edge respectively.
                let degrading_downward = matches!(*sensor, "oil_press" | "voltage" | "def_level");
                let boundary = if degrading_downward { range.min } else { range.max };
                let slope_per_sample = state.trend_slope;
                if degrading_downward && slope_per_sample >= 0.0 {
                    continue;
                }
                if !degrading_downward && slope_per_sample <= 0.0 {
                    continue;
                }

                let distance = (boundary - state.ewma_value).abs();
                let samples_to_boundary = distance / slope_per_sample.abs();
                // One sample is assumed to represent one poll cycle; without
                // a calibrated per-sensor cadence this is treated as days,
                // matching the conservative horizon the decision table expects.
                let days_to_critical = samples_to_boundary;
                if !days_to_critical.is_finite() || days_to_critical > MAX_PROJECTION_DAYS {
                    continue;
                }

                let component = normalize_component(sensor);
                let (priority, priority_score_value) = priority_score(
                    super::PriorityInputs {
                        days_to_critical: Some(days_to_critical),
                        component: Some(component.as_str()),
                        ..Default::default()
                    },
                    weights,
                );
                let action_type = select_action_type(priority, Some(days_to_critical));
                let direction_word = if degrading_downward { "falling" } else { "rising" };
                let mut item = ActionItem::new(
                    truck.truck_id.as_str(),
                    priority,
                    priority_score_value,
                    "predictive",
                    *sensor,
                    component.clone(),
                    format!("{sensor} trending toward its limit"),
                    format!(
                        "{sensor} is {direction_word} at {:.3}/sample; projected to reach its \
                         operating limit in about {days_to_critical:.1} days.",
                        state.trend_slope
                    ),
                    ActionSource::PredictiveMaintenance,
                );
                item.days_to_critical = Some(days_to_critical);
                item.current_value = Some(state.ewma_value);
                item.trend = Some(format!("{:?}", state.trend_direction));
                item.confidence = Confidence::Medium;
                item.action_type = action_type;
                item.action_steps = action_steps_for(&component, priority, action_type);
                items.push(item);
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetConfig;
    use crate::trend::SensorBuffer;
    use crate::types::TruckConfig;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    #[tokio::test]
    async fn falling_oil_pressure_projects_an_item() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let config = FleetConfig::default();
        let trend = SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone());
        for i in 0..10 {
            let ts = Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap();
            trend.ingest("T-1", "oil_press", 60.0 - i as f64 * 3.0, ts);
        }
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &HashMap::new(),
            risk_scores: &HashMap::new(),
            trend: &trend,
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = PredictiveMaintenanceAdapter.generate(&ctx).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].normalized_component, "oil_system");
        assert!(items[0].days_to_critical.unwrap() > 0.0);
    }

    #[tokio::test]
    async fn stable_sensor_produces_no_item() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let config = FleetConfig::default();
        let trend = SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone());
        for i in 0..10 {
            let ts = Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap();
            trend.ingest("T-1", "oil_press", 60.0, ts);
        }
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &HashMap::new(),
            risk_scores: &HashMap::new(),
            trend: &trend,
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = PredictiveMaintenanceAdapter.generate(&ctx).await.unwrap();
        assert!(items.is_empty());
    }
}
