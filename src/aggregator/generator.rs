//! Command-Center Aggregator: one generation cycle (SPEC_FULL §4.8).
//!
//! Grounded on `original_source/fleet_command_center.py`'s
//! `generate_command_center_dashboard`: fan out to every adapter in
//! isolation, dedup, sort, summarize, and assemble the response the HTTP
//! layer serves.

use super::cost::{self, CostProjection};
use super::health::{self, HealthStatus, UrgencySummary};
use super::insights::{self, Insight};
use crate::adapters::{
    ActionSourceAdapter, AdapterContext, DtcEventsAdapter, EngineHealthAdapter, MlAnomalyAdapter,
    PredictiveMaintenanceAdapter, RealTimePredictiveAdapter, SensorHealthAdapter,
};
use crate::types::{ActionItem, Priority, TruckStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("no trucks in tank registry")]
    EmptyFleet,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FleetHealth {
    pub score: u32,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FleetTotals {
    pub total_trucks: usize,
    pub ok_trucks: u32,
}

/// Per-status truck counts. `idle` mirrors `stopped` for callers still
/// reading the legacy counting key (SPEC_FULL §4.3/§9 Open Question a);
/// the classifier itself never emits IDLE.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SensorStatusCounts {
    pub moving: u32,
    pub stopped: u32,
    pub parked: u32,
    pub offline: u32,
    pub idle: u32,
}

pub fn status_counts(statuses: &HashMap<String, TruckStatus>) -> SensorStatusCounts {
    let mut counts = SensorStatusCounts::default();
    for status in statuses.values() {
        match status {
            TruckStatus::Moving => counts.moving += 1,
            TruckStatus::Stopped => counts.stopped += 1,
            TruckStatus::Parked => counts.parked += 1,
            TruckStatus::Offline => counts.offline += 1,
        }
    }
    counts.idle = counts.stopped;
    counts
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub generated_at: DateTime<Utc>,
    pub version: &'static str,
    pub fleet_health: FleetHealth,
    pub totals: FleetTotals,
    pub urgency_summary: UrgencySummary,
    pub sensor_status: SensorStatusCounts,
    pub cost_projection: CostProjection,
    pub action_items: Vec<ActionItem>,
    pub critical_items: Vec<ActionItem>,
    pub high_items: Vec<ActionItem>,
    pub insights: Vec<Insight>,
    pub data_quality: HashMap<String, bool>,
}

const RESPONSE_VERSION: &str = "2";
/// A truck's latest snapshot is considered fresh for data-quality purposes
/// within this many minutes, matching the reader's default `max_age`.
const DATA_QUALITY_FRESH_MINUTES: f64 = 60.0;

/// Runs all six action-source adapters, merges their output, and assembles
/// the full dashboard response. A failing adapter is logged and excluded;
/// it never aborts the cycle.
pub async fn generate(ctx: &AdapterContext<'_>, truck_statuses: &HashMap<String, TruckStatus>) -> Result<DashboardResponse, AggregatorError> {
    if ctx.trucks.is_empty() {
        return Err(AggregatorError::EmptyFleet);
    }

    let adapters: Vec<Box<dyn ActionSourceAdapter>> = vec![
        Box::new(PredictiveMaintenanceAdapter),
        Box::new(MlAnomalyAdapter),
        Box::new(SensorHealthAdapter),
        Box::new(DtcEventsAdapter),
        Box::new(EngineHealthAdapter),
        Box::new(RealTimePredictiveAdapter),
    ];

    let mut collected = Vec::new();
    for adapter in &adapters {
        match adapter.generate(ctx).await {
            Ok(items) => collected.extend(items),
            Err(err) => warn!(adapter = adapter.name(), error = %err, "adapter failed, excluding from cycle"),
        }
    }

    let mut items = super::dedup::dedup(collected);
    items.sort_by(|a, b| {
        b.priority_score
            .total_cmp(&a.priority_score)
            .then_with(|| a.truck_id.cmp(&b.truck_id))
            .then_with(|| a.normalized_component.cmp(&b.normalized_component))
    });

    let total_trucks = ctx.trucks.len();
    let urgency = health::urgency_summary(&items);
    let ok = health::ok_trucks(total_trucks, &items);
    let score = health::fleet_health_score(total_trucks, &items);
    let fleet_insights = insights::generate(total_trucks, &items);
    let projection = cost::project(&items);
    let sensor_status = status_counts(truck_statuses);

    let now = Utc::now();
    let data_quality = ctx
        .trucks
        .iter()
        .map(|truck| {
            let fresh = ctx
                .latest_snapshots
                .get(&truck.truck_id)
                .is_some_and(|snap| snap.data_age_minutes(now) <= DATA_QUALITY_FRESH_MINUTES);
            (truck.truck_id.clone(), fresh)
        })
        .collect();

    let critical_items: Vec<ActionItem> = items.iter().filter(|i| i.priority == Priority::Critical).cloned().collect();
    let high_items: Vec<ActionItem> = items.iter().filter(|i| i.priority == Priority::High).cloned().collect();

    Ok(DashboardResponse {
        generated_at: now,
        version: RESPONSE_VERSION,
        fleet_health: FleetHealth { score, status: HealthStatus::from_score(score) },
        totals: FleetTotals { total_trucks, ok_trucks: ok },
        urgency_summary: urgency,
        sensor_status,
        cost_projection: projection,
        action_items: items,
        critical_items,
        high_items,
        insights: fleet_insights,
        data_quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetConfig;
    use crate::trend::SensorBuffer;
    use crate::types::TruckConfig;

    #[tokio::test]
    async fn empty_fleet_is_an_error() {
        let config = FleetConfig::default();
        let ctx = AdapterContext {
            trucks: &[],
            latest_snapshots: &HashMap::new(),
            risk_scores: &HashMap::new(),
            trend: &SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()),
            persistence: &config.persistence_gates,
            config: &config,
        };
        let result = generate(&ctx, &HashMap::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn healthy_fleet_yields_affirmative_insight_and_full_score() {
        let truck = TruckConfig::new("T-1", 1, 200.0, "carrier", None);
        let config = FleetConfig::default();
        let ctx = AdapterContext {
            trucks: std::slice::from_ref(&truck),
            latest_snapshots: &HashMap::new(),
            risk_scores: &HashMap::new(),
            trend: &SensorBuffer::new(config.sensor_ranges.clone(), config.persistence_gates.clone()),
            persistence: &config.persistence_gates,
            config: &config,
        };
        let response = generate(&ctx, &HashMap::new()).await.unwrap();
        assert_eq!(response.urgency_summary.total_issues, 0);
        assert_eq!(response.fleet_health.score, 100);
        assert!(!response.insights.is_empty());
    }

    #[test]
    fn status_counts_mirrors_stopped_into_idle() {
        let mut statuses = HashMap::new();
        statuses.insert("T-1".to_string(), TruckStatus::Stopped);
        let counts = status_counts(&statuses);
        assert_eq!(counts.stopped, 1);
        assert_eq!(counts.idle, 1);
    }
}
