//! Engine Health adapter: compound engine-vitals checks (sustained high load
//! with elevated oil temperature) that single-sensor thresholds miss
//! (SPEC_FULL §4.6).

use super::{action_steps_for, normalize_component, priority_score, select_action_type, ActionSourceAdapter, AdapterContext, AdapterError};
use crate::types::{ActionItem, ActionSource, Confidence};
use async_trait::async_trait;

const HIGH_LOAD_PCT: f64 = 90.0;
const ELEVATED_OIL_TEMP_F: f64 = 250.0;
const CRITICAL_OIL_TEMP_F: f64 = 270.0;

pub struct EngineHealthAdapter;

#[async_trait]
impl ActionSourceAdapter for EngineHealthAdapter {
    fn name(&self) -> &'static str {
        "Engine Health"
    }

    async fn generate(&self, ctx: &AdapterContext<'_>) -> Result<Vec<ActionItem>, AdapterError> {
        let mut items = Vec::new();
        let weights = &ctx.config.priority_weights;

        for truck in ctx.trucks {
            let Some(snapshot) = ctx.latest_snapshots.get(&truck.truck_id) else {
                continue;
            };
            let (Some(load), Some(oil_temp)) = (snapshot.engine_load_pct, snapshot.oil_temp_f) else {
                continue;
            };
            if load < HIGH_LOAD_PCT || oil_temp < ELEVATED_OIL_TEMP_F {
                continue;
            }

            let critical = oil_temp >= CRITICAL_OIL_TEMP_F;
            let component = normalize_component("engine");
            let (priority, priority_score_value) = priority_score(
                super::PriorityInputs {
                    anomaly_score: Some(if critical { 0.9 } else { 0.65 }),
                    component: Some(component.as_str()),
                    ..Default::default()
                },
                weights,
            );
            let action_type = select_action_type(priority, None);
            let mut item = ActionItem::new(
                truck.truck_id.as_str(),
                priority,
                priority_score_value,
                "mechanical",
                "engine",
                component.clone(),
                "Sustained high load with elevated oil temperature",
                format!(
                    "Engine load at {load:.0}% with oil temperature {oil_temp:.0}°F — sustained \
                     heavy load is compounding thermal stress."
                ),
                ActionSource::DbAlerts,
            );
            item.current_value = Some(oil_temp);
            item.confidence = Confidence::Medium;
            item.action_type = action_type;
            item.action_steps = action_steps_for(&component, priority, action_type);
            items.push(item);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetConfig;
    use crate::trend::SensorBuffer;
    use crate::types::{SensorSnapshot, TruckConfig};
    use chrono::Utc;
    use std::collections::HashMap;

    #[tokio::test]
    async fn high_load_and_oil_temp_produce_item() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let mut snap = SensorSnapshot::empty("T-1", 1, Utc::now());
        snap.engine_load_pct = Some(95.0);
        snap.oil_temp_f = Some(260.0);
        let mut snapshots = HashMap::new();
        snapshots.insert("T-1".to_string(), snap);
        let config = FleetConfig::default();
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &snapshots,
            risk_scores: &HashMap::new(),
            trend: &SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()),
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = EngineHealthAdapter.generate(&ctx).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn high_load_alone_does_not_trigger() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let mut snap = SensorSnapshot::empty("T-1", 1, Utc::now());
        snap.engine_load_pct = Some(95.0);
        snap.oil_temp_f = Some(200.0);
        let mut snapshots = HashMap::new();
        snapshots.insert("T-1".to_string(), snap);
        let config = FleetConfig::default();
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &snapshots,
            risk_scores: &HashMap::new(),
            trend: &SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()),
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = EngineHealthAdapter.generate(&ctx).await.unwrap();
        assert!(items.is_empty());
    }
}
