//! Real-Time Predictive adapter: the fleet's most trusted source, firing
//! only when a fixed failure-correlation pattern's primary sensor *and* a
//! quorum of its correlated sensors are degrading together, not just one in
//! isolation (SPEC_FULL §4.5/§4.6).
//!
//! Grounded on `original_source/fleet_command_center.py`'s Real-Time
//! Predictive Engine integration (source #6, hierarchy weight 100): live
//! multi-sensor analysis that predicts failures ahead of a single-sensor
//! trend crossing its own threshold. This crate has no bundled engine; the
//! same correlation catalog `risk::correlation` scores after the fact is
//! evaluated here directly against live trend state, which is the
//! in-crate equivalent signal.

use super::{action_steps_for, normalize_component, priority_score, select_action_type, ActionSourceAdapter, AdapterContext, AdapterError};
use crate::types::{ActionItem, ActionSource, Confidence, TrendDirection};
use async_trait::async_trait;

pub struct RealTimePredictiveAdapter;

#[async_trait]
impl ActionSourceAdapter for RealTimePredictiveAdapter {
    fn name(&self) -> &'static str {
        "Real-Time Predictive"
    }

    async fn generate(&self, ctx: &AdapterContext<'_>) -> Result<Vec<ActionItem>, AdapterError> {
        let mut items = Vec::new();
        let weights = &ctx.config.priority_weights;

        for truck in ctx.trucks {
            for pattern in &ctx.config.correlations.patterns {
                let Some(primary) = ctx.trend.snapshot(&truck.truck_id, &pattern.primary_sensor) else {
                    continue;
                };
                if primary.trend_direction == TrendDirection::Stable {
                    continue;
                }

                let degrading_correlated = pattern
                    .correlated_sensors
                    .iter()
                    .filter(|sensor| {
                        ctx.trend
                            .snapshot(&truck.truck_id, sensor)
                            .is_some_and(|state| state.trend_direction != TrendDirection::Stable)
                    })
                    .count();
                if pattern.correlated_sensors.is_empty() {
                    continue;
                }
                let quorum = degrading_correlated as f64 / pattern.correlated_sensors.len() as f64;
                if quorum < pattern.min_correlation {
                    continue;
                }

                let confidence_pct = (60.0 + quorum * 40.0).min(100.0);
                let component = normalize_component(&pattern.primary_sensor);
                let (priority, priority_score_value) = priority_score(
                    super::PriorityInputs {
                        anomaly_score: Some(confidence_pct),
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
                    "predictive",
                    pattern.primary_sensor.as_str(),
                    component.clone(),
                    format!("Correlated failure pattern: {}", pattern.name),
                    format!(
                        "{} trending with {degrading_correlated}/{} correlated signals — probable cause: {}.",
                        pattern.primary_sensor,
                        pattern.correlated_sensors.len(),
                        pattern.probable_cause
                    ),
                    ActionSource::RealTimePredictive,
                );
                item.current_value = Some(primary.ewma_value);
                item.trend = Some(format!("{:?}", primary.trend_direction));
                item.confidence = if confidence_pct >= 85.0 { Confidence::High } else { Confidence::Medium };
                item.action_type = action_type;
                item.action_steps = {
                    let mut steps = action_steps_for(&component, priority, action_type);
                    steps.push(pattern.recommended_action.clone());
                    steps
                };
                items.push(item);
            }
        }

        Ok(items)
    }
}
