//! `/trends` and `/trends/record` (SPEC_FULL §6).

use super::ApiState;
use crate::api::envelope::{self, ApiError};
use crate::background::{record_now, FleetHealthSnapshot};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    #[serde(default = "default_hours")]
    pub hours: f64,
}

fn default_hours() -> f64 {
    24.0
}

pub async fn get_trends(State(state): State<ApiState>, Query(params): Query<TrendsQuery>) -> Result<Response, ApiError> {
    if !(1.0..=168.0).contains(&params.hours) {
        return Err(ApiError::BadRequest(format!("hours must be within [1, 168], got {}", params.hours)));
    }
    let snapshots: Vec<FleetHealthSnapshot> = state.recorder.since(params.hours);
    Ok(envelope::ok(snapshots))
}

pub async fn record_trend(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let config = crate::config::get();
    let snapshot = record_now(&state.app, &config, &state.recorder).await?;
    Ok(envelope::ok(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::test_state;

    #[tokio::test]
    async fn hours_out_of_band_is_bad_request() {
        let state = test_state();
        let result = get_trends(State(state), Query(TrendsQuery { hours: 200.0 })).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn record_then_query_returns_the_snapshot() {
        let state = test_state();
        record_trend(State(state.clone())).await.unwrap();
        let response = get_trends(State(state), Query(TrendsQuery { hours: 1.0 })).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
