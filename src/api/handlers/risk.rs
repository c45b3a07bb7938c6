//! `/risk-scores`, `/correlations`, `/def-prediction/{id}` (SPEC_FULL §6, §4.5).

use super::ApiState;
use crate::api::envelope::{self, ApiError};
use crate::pipeline::run_generation_cycle;
use crate::risk::{def_alert_for, detect_correlations, predict_def_depletion, top_risk_trucks};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TopNQuery {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    10
}

pub async fn get_risk_scores(State(state): State<ApiState>, Query(params): Query<TopNQuery>) -> Result<Response, ApiError> {
    if !(1..=50).contains(&params.top_n) {
        return Err(ApiError::BadRequest(format!("top_n must be within [1, 50], got {}", params.top_n)));
    }
    let scores: Vec<_> = state.app.risk_scores_view().await.into_values().collect();
    Ok(envelope::ok(top_risk_trucks(scores, params.top_n)))
}

pub async fn get_correlations(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let config = crate::config::get();
    let (dashboard, _cached) = run_generation_cycle(&state.app, &config, false).await?;
    let correlations = detect_correlations(&dashboard.action_items, &config.correlations.patterns);
    Ok(envelope::ok(correlations))
}

#[derive(Debug, Deserialize)]
pub struct DefPredictionQuery {
    pub current_level: f64,
    pub daily_miles: Option<f64>,
    pub avg_mpg: Option<f64>,
}

#[derive(Debug, Serialize)]
struct DefPredictionPayload {
    #[serde(flatten)]
    prediction: crate::types::DEFPrediction,
    alert_level: &'static str,
    recommendation: &'static str,
}

pub async fn get_def_prediction(
    State(state): State<ApiState>,
    Path(truck_id): Path<String>,
    Query(params): Query<DefPredictionQuery>,
) -> Result<Response, ApiError> {
    if state.app.registry.by_truck_id(&truck_id).is_none() {
        return Err(ApiError::NotFound(format!("unknown truck: {truck_id}")));
    }
    if !(0.0..=100.0).contains(&params.current_level) {
        return Err(ApiError::BadRequest(format!("current_level must be within [0, 100], got {}", params.current_level)));
    }

    let config = crate::config::get();
    let prediction = predict_def_depletion(params.current_level, params.daily_miles, params.avg_mpg, &config.def);
    let alert = def_alert_for(&prediction);

    Ok(envelope::ok(DefPredictionPayload {
        prediction,
        alert_level: alert.level.as_str(),
        recommendation: alert.recommendation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::test_state;

    #[tokio::test]
    async fn top_n_out_of_band_is_bad_request() {
        let state = test_state();
        let result = get_risk_scores(State(state), Query(TopNQuery { top_n: 0 })).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn def_prediction_for_unknown_truck_is_not_found() {
        let state = test_state();
        let result = get_def_prediction(
            State(state),
            Path("T-404".to_string()),
            Query(DefPredictionQuery { current_level: 50.0, daily_miles: None, avg_mpg: None }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn def_prediction_for_known_truck_succeeds() {
        let state = test_state();
        let response = get_def_prediction(
            State(state),
            Path("T-1".to_string()),
            Query(DefPredictionQuery { current_level: 50.0, daily_miles: Some(400.0), avg_mpg: Some(6.0) }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
