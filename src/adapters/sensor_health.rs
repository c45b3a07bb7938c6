//! Sensor Health adapter: flags current-reading threshold breaches
//! (coolant, oil pressure/temp, battery voltage) independent of any trend
//! (SPEC_FULL §4.6). Grounded on `original_source/fleet_command_center.py`'s
//! `SENSOR_VALID_RANGES`-adjacent health checks.

use super::{action_steps_for, normalize_component, priority_score, select_action_type, ActionSourceAdapter, AdapterContext, AdapterError};
use crate::types::{ActionItem, ActionSource, Confidence};
use async_trait::async_trait;

const COOLANT_WARN_F: f64 = 230.0;
const COOLANT_CRITICAL_F: f64 = 250.0;
const OIL_PRESSURE_WARN_PSI: f64 = 20.0;
const OIL_PRESSURE_CRITICAL_PSI: f64 = 10.0;
const VOLTAGE_WARN: f64 = 11.8;
const VOLTAGE_CRITICAL: f64 = 11.0;

pub struct SensorHealthAdapter;

#[async_trait]
impl ActionSourceAdapter for SensorHealthAdapter {
    fn name(&self) -> &'static str {
        "Sensor Health Monitor"
    }

    async fn generate(&self, ctx: &AdapterContext<'_>) -> Result<Vec<ActionItem>, AdapterError> {
        let mut items = Vec::new();
        let weights = &ctx.config.priority_weights;

        for truck in ctx.trucks {
            let Some(snapshot) = ctx.latest_snapshots.get(&truck.truck_id) else {
                continue;
            };

            if let Some(coolant) = snapshot.coolant_temp_f {
                if coolant >= COOLANT_WARN_F {
                    let critical = coolant >= COOLANT_CRITICAL_F;
                    items.push(build_item(truck.truck_id.as_str(), "cool_temp", coolant, critical, "°F", weights));
                }
            }
            if let Some(pressure) = snapshot.oil_pressure_psi {
                if pressure > 0.0 && pressure <= OIL_PRESSURE_WARN_PSI {
                    let critical = pressure <= OIL_PRESSURE_CRITICAL_PSI;
                    items.push(build_item(truck.truck_id.as_str(), "oil_press", pressure, critical, "psi", weights));
                }
            }
            if let Some(voltage) = snapshot.voltage_internal {
                if voltage <= VOLTAGE_WARN && voltage > 0.0 {
                    let critical = voltage <= VOLTAGE_CRITICAL;
                    items.push(build_item(truck.truck_id.as_str(), "voltage", voltage, critical, "V", weights));
                }
            }
        }

        Ok(items)
    }
}

fn build_item(
    truck_id: &str,
    sensor: &str,
    value: f64,
    critical: bool,
    unit: &str,
    weights: &crate::config::PriorityWeights,
) -> ActionItem {
    let component = normalize_component(sensor);
    let anomaly_score = if critical { 0.95 } else { 0.6 };
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
        truck_id,
        priority,
        priority_score_value,
        "sensor",
        sensor,
        component.clone(),
        format!("{sensor} out of healthy range"),
        format!("{sensor} reads {value:.1}{unit}, outside the normal operating band."),
        ActionSource::SensorHealth,
    );
    item.current_value = Some(value);
    item.confidence = if critical { Confidence::High } else { Confidence::Medium };
    item.action_type = action_type;
    item.action_steps = action_steps_for(&component, priority, action_type);
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetConfig;
    use crate::trend::SensorBuffer;
    use crate::types::{SensorSnapshot, TruckConfig};
    use chrono::Utc;
    use std::collections::HashMap;

    fn snapshot_with_coolant(value: f64) -> SensorSnapshot {
        let mut snap = SensorSnapshot::empty("T-1", 1, Utc::now());
        snap.coolant_temp_f = Some(value);
        snap
    }

    #[tokio::test]
    async fn overheating_coolant_produces_item() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let mut snapshots = HashMap::new();
        snapshots.insert("T-1".to_string(), snapshot_with_coolant(255.0));
        let config = FleetConfig::default();
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &snapshots,
            risk_scores: &HashMap::new(),
            trend: &SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()),
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = SensorHealthAdapter.generate(&ctx).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].normalized_component, "cooling_system");
    }

    #[tokio::test]
    async fn healthy_truck_produces_no_items() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let mut snapshots = HashMap::new();
        snapshots.insert("T-1".to_string(), snapshot_with_coolant(180.0));
        let config = FleetConfig::default();
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &snapshots,
            risk_scores: &HashMap::new(),
            trend: &SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()),
            persistence: &config.persistence_gates,
            config: &config,
        };
        let items = SensorHealthAdapter.generate(&ctx).await.unwrap();
        assert!(items.is_empty());
    }
}
