//! ML Anomaly Detection adapter: flags trucks whose sensor behavior has
//! drifted furthest from its learned baseline, expressed as a composite
//! anomaly score in `[0, 100]` (SPEC_FULL §4.6).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `analyze_fleet_anomalies` integration (an external isolation-forest
//! model gating on `anomaly_score >= 60`). This crate has no bundled model;
//! the composite score here is derived from the same CUSUM state the trend
//! engine already maintains, normalized against the configured threshold,
//! which is the closest in-crate proxy for "how far has this truck drifted
//! from normal" without an external collaborator to call into.

use super::{action_steps_for, normalize_component, priority_score, select_action_type, ActionSourceAdapter, AdapterContext, AdapterError};
use crate::config::defaults::CUSUM_THRESHOLD;
use crate::types::{ActionItem, ActionSource, Confidence};
use async_trait::async_trait;

/// Sensors considered when composing a truck's anomaly score.
const WATCHED_SENSORS: &[&str] = &["oil_press", "cool_temp", "voltage", "def_level", "fuel_rate_gph"];
/// Matches the upstream model's `anomaly_score >= 60` gate.
const ANOMALY_SCORE_THRESHOLD: f64 = 60.0;

pub struct MlAnomalyAdapter;

#[async_trait]
impl ActionSourceAdapter for MlAnomalyAdapter {
    fn name(&self) -> &'static str {
        "ML Anomaly Detection"
    }

    async fn generate(&self, ctx: &AdapterContext<'_>) -> Result<Vec<ActionItem>, AdapterError> {
        let mut items = Vec::new();
        let weights = &ctx.config.priority_weights;

        for truck in ctx.trucks {
            let mut worst: Option<(&str, f64)> = None;
            for sensor in WATCHED_SENSORS {
                let Some(state) = ctx.trend.snapshot(&truck.truck_id, sensor) else {
                    continue;
                };
                let deviation = state.cusum_high.max(state.cusum_low);
                let score = (deviation / CUSUM_THRESHOLD * 100.0).min(100.0);
                if worst.map(|(_, best)| score > best).unwrap_or(true) {
                    worst = Some((sensor, score));
                }
            }

            let Some((sensor, anomaly_score)) = worst else {
                continue;
            };
            if anomaly_score < ANOMALY_SCORE_THRESHOLD {
                continue;
            }

            let component = normalize_component(sensor);
            let (priority, priority_score_value) = priority_score(
                super::PriorityInputs {
                    anomaly_score: Some(anomaly_score),
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
                "anomaly",
                sensor,
                component.clone(),
                format!("Anomalous behavior detected (score {anomaly_score:.0})"),
                format!("{sensor} readings have drifted outside their learned baseline."),
                ActionSource::MlAnomaly,
            );
            item.current_value = Some(anomaly_score);
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
    use crate::types::TruckConfig;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    #[tokio::test]
    async fn sustained_deviation_produces_anomaly_item() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let config = FleetConfig::default();
        let trend = SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone());
        for i in 0..30 {
            let ts = Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap();
            let spike = if i > 20 { 40.0 } else { 14.0 };
            trend.ingest("T-1", "oil_press", spike, ts);
        }
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &HashMap::new(),
            risk_scores: &HashMap::new(),
            trend: &trend,
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = MlAnomalyAdapter.generate(&ctx).await.unwrap();
        assert!(!items.is_empty());
        assert_eq!(items[0].category, "anomaly");
    }

    #[tokio::test]
    async fn stable_truck_produces_no_item() {
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
        let items = MlAnomalyAdapter.generate(&ctx).await.unwrap();
        assert!(items.is_empty());
    }
}
