//! `/insights` and `/health` (SPEC_FULL §6, §4.8).

use super::ApiState;
use crate::api::envelope::{self, ApiError};
use crate::pipeline::run_generation_cycle;
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
struct InsightsPayload {
    insights: Vec<crate::aggregator::Insight>,
    fleet_health: crate::aggregator::FleetHealth,
    data_quality: HashMap<String, bool>,
}

pub async fn get_insights(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let config = crate::config::get();
    let (dashboard, _cached) = run_generation_cycle(&state.app, &config, false).await?;
    Ok(envelope::ok(InsightsPayload {
        insights: dashboard.insights,
        fleet_health: dashboard.fleet_health,
        data_quality: dashboard.data_quality,
    }))
}

#[derive(Debug, Serialize)]
struct HealthPayload {
    status: &'static str,
    uptime_secs: u64,
    telemetry_cycles_completed: u64,
    telemetry_cycles_skipped: u64,
    fast_state_backend: &'static str,
    data_quality: HashMap<String, bool>,
}

/// Liveness and data-quality snapshot. Reuses the current dashboard's
/// `data_quality` map rather than bypassing the cache, so this endpoint
/// never forces an out-of-band generation cycle.
pub async fn get_health(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let config = crate::config::get();
    let (dashboard, _cached) = run_generation_cycle(&state.app, &config, false).await?;

    Ok(envelope::ok(HealthPayload {
        status: "ok",
        uptime_secs: state.app.uptime_secs(),
        telemetry_cycles_completed: state.app.telemetry_cycles_completed.load(std::sync::atomic::Ordering::Relaxed),
        telemetry_cycles_skipped: state.app.telemetry_cycles_skipped.load(std::sync::atomic::Ordering::Relaxed),
        fast_state_backend: state.app.fast_state.backend_name(),
        data_quality: dashboard.data_quality,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::test_state;

    #[tokio::test]
    async fn health_reports_ok_status() {
        let state = test_state();
        let response = get_health(State(state)).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn insights_nonempty_for_healthy_fleet() {
        let state = test_state();
        let response = get_insights(State(state)).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
