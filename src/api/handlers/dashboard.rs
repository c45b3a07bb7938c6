//! `/dashboard`, `/actions`, `/truck/{id}`, `/truck/{id}/comprehensive`
//! (SPEC_FULL §6, §4.8).

use super::ApiState;
use crate::api::envelope::{self, ApiError};
use crate::pipeline::run_generation_cycle;
use crate::types::{ActionItem, Priority};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BypassCacheQuery {
    #[serde(default)]
    pub bypass_cache: bool,
}

#[derive(Debug, Serialize)]
struct DashboardPayload {
    #[serde(flatten)]
    dashboard: crate::aggregator::DashboardResponse,
    cached: bool,
}

pub async fn get_dashboard(State(state): State<ApiState>, Query(params): Query<BypassCacheQuery>) -> Result<Response, ApiError> {
    let config = crate::config::get();
    let (dashboard, cached) = run_generation_cycle(&state.app, &config, params.bypass_cache).await?;
    Ok(envelope::ok(DashboardPayload { dashboard, cached }))
}

#[derive(Debug, Deserialize)]
pub struct ActionsQuery {
    pub priority: Option<String>,
    pub category: Option<String>,
    pub truck_id: Option<String>,
    pub limit: Option<usize>,
}

fn parse_priority(raw: &str) -> Option<Priority> {
    match raw.to_uppercase().as_str() {
        "CRITICAL" => Some(Priority::Critical),
        "HIGH" => Some(Priority::High),
        "MEDIUM" => Some(Priority::Medium),
        "LOW" => Some(Priority::Low),
        "NONE" => Some(Priority::None),
        _ => None,
    }
}

pub async fn get_actions(State(state): State<ApiState>, Query(params): Query<ActionsQuery>) -> Result<Response, ApiError> {
    let config = crate::config::get();
    let (dashboard, _cached) = run_generation_cycle(&state.app, &config, false).await?;

    let wanted_priority = match &params.priority {
        Some(raw) => Some(parse_priority(raw).ok_or_else(|| ApiError::BadRequest(format!("unknown priority: {raw}")))?),
        None => None,
    };

    let mut items: Vec<ActionItem> = dashboard
        .action_items
        .into_iter()
        .filter(|item| wanted_priority.map_or(true, |p| item.priority == p))
        .filter(|item| params.category.as_deref().map_or(true, |c| item.category.eq_ignore_ascii_case(c)))
        .filter(|item| params.truck_id.as_deref().map_or(true, |t| item.truck_id == t))
        .collect();

    if let Some(limit) = params.limit {
        items.truncate(limit);
    }

    Ok(envelope::ok(items))
}

#[derive(Debug, Serialize)]
struct TruckSummary {
    truck_id: String,
    overall_priority: Priority,
    action_items: Vec<ActionItem>,
}

pub async fn get_truck(State(state): State<ApiState>, Path(truck_id): Path<String>) -> Result<Response, ApiError> {
    if state.app.registry.by_truck_id(&truck_id).is_none() {
        return Err(ApiError::NotFound(format!("unknown truck: {truck_id}")));
    }

    let config = crate::config::get();
    let (dashboard, _cached) = run_generation_cycle(&state.app, &config, false).await?;

    let items: Vec<ActionItem> = dashboard.action_items.into_iter().filter(|i| i.truck_id == truck_id).collect();
    let overall_priority = items.iter().map(|i| i.priority).max().unwrap_or(Priority::None);

    Ok(envelope::ok(TruckSummary { truck_id, overall_priority, action_items: items }))
}

#[derive(Debug, Deserialize)]
pub struct ComprehensiveQuery {
    pub dtc_string: Option<String>,
}

#[derive(Debug, Serialize)]
struct ComprehensiveHealth {
    truck_id: String,
    predictive_score: f64,
    driver_score: f64,
    component_score: f64,
    dtc_score: f64,
    overall_score: f64,
    status: &'static str,
}

/// Blended health score (SPEC_FULL §6): `0.3·predictive + 0.2·driver +
/// 0.3·component + 0.2·dtc`.
///
/// The four sub-scores have no single source in the spec's component
/// design, so each is derived from an already-computed signal this crate
/// owns: predictive from the truck's current risk score (inverted, since
/// risk and health move in opposite directions), driver from its current
/// operating status, component from the fraction of its configured sensors
/// currently reading within range, and dtc from whether `dtc_string` (or
/// the latest snapshot's own DTC field) carries any active codes.
pub async fn get_truck_comprehensive(
    State(state): State<ApiState>,
    Path(truck_id): Path<String>,
    Query(params): Query<ComprehensiveQuery>,
) -> Result<Response, ApiError> {
    let Some(_truck) = state.app.registry.by_truck_id(&truck_id).cloned() else {
        return Err(ApiError::NotFound(format!("unknown truck: {truck_id}")));
    };

    let config = crate::config::get();
    let risk_scores = state.app.risk_scores_view().await;
    let predictive_score = risk_scores.get(&truck_id).map_or(100.0, |r| (100.0 - r.risk_score).clamp(0.0, 100.0));

    let snapshots = state.app.snapshots_view().await;
    let snapshot = snapshots.get(&truck_id);

    let statuses = state.app.statuses_view().await;
    let driver_score = match statuses.get(&truck_id) {
        Some(crate::types::TruckStatus::Moving) => 100.0,
        Some(crate::types::TruckStatus::Stopped) => 90.0,
        Some(crate::types::TruckStatus::Parked) => 80.0,
        Some(crate::types::TruckStatus::Offline) | None => 50.0,
    };

    let component_score = snapshot.map_or(100.0, |snap| {
        let checks: &[(&str, Option<f64>)] = &[
            ("oil_press", snap.oil_pressure_psi),
            ("cool_temp", snap.coolant_temp_f),
            ("voltage", snap.voltage_external),
            ("def_level", snap.def_level_pct),
        ];
        let present: Vec<bool> = checks
            .iter()
            .filter_map(|(sensor, value)| value.map(|v| config.sensor_ranges.is_valid(sensor, v)))
            .collect();
        if present.is_empty() {
            100.0
        } else {
            100.0 * present.iter().filter(|ok| **ok).count() as f64 / present.len() as f64
        }
    });

    let dtc_codes = params.dtc_string.or_else(|| snapshot.and_then(|s| s.dtc_codes.clone()));
    let dtc_score = if dtc_codes.as_deref().is_some_and(|s| !s.trim().is_empty()) { 40.0 } else { 100.0 };

    let overall_score = ((0.3 * predictive_score + 0.2 * driver_score + 0.3 * component_score + 0.2 * dtc_score) * 10.0).round() / 10.0;
    let status = if overall_score >= 80.0 {
        "healthy"
    } else if overall_score >= 60.0 {
        "attention"
    } else if overall_score >= 40.0 {
        "warning"
    } else {
        "critical"
    };

    Ok(envelope::ok(ComprehensiveHealth {
        truck_id,
        predictive_score,
        driver_score,
        component_score,
        dtc_score,
        overall_score,
        status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::test_state;

    #[tokio::test]
    async fn unknown_truck_is_not_found() {
        let state = test_state();
        let result = get_truck(State(state), Path("T-404".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn known_truck_with_no_issues_has_none_priority() {
        let state = test_state();
        let response = get_truck(State(state), Path("T-1".to_string())).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[test]
    fn parse_priority_is_case_insensitive() {
        assert_eq!(parse_priority("critical"), Some(Priority::Critical));
        assert_eq!(parse_priority("HIGH"), Some(Priority::High));
        assert_eq!(parse_priority("bogus"), None);
    }
}
