//! `POST /detect` and `GET /spn/{spn}` (SPEC_FULL §6, §4.4, §4.6).

use super::ApiState;
use crate::adapters::{normalize_component, priority_score, select_action_type, PriorityInputs};
use crate::api::envelope::{self, ApiError};
use crate::risk::spn_lookup;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DetectQuery {
    pub truck_id: String,
    pub sensor_name: String,
    pub current_value: f64,
    pub baseline_value: f64,
    pub component: Option<String>,
}

#[derive(Debug, Serialize)]
struct DetectionResult {
    sensor_name: String,
    current_value: f64,
    baseline_value: f64,
    deviation: f64,
    deviation_ratio: f64,
    anomalous: bool,
}

#[derive(Debug, Serialize)]
struct DecisionResult {
    priority: crate::types::Priority,
    priority_score: f64,
    action_type: crate::types::ActionType,
}

#[derive(Debug, Serialize)]
struct DetectPayload {
    truck_id: String,
    detection: DetectionResult,
    decision: DecisionResult,
}

/// Ad hoc single-reading detection against a caller-supplied baseline (not
/// the buffered ring's own EWMA baseline — this is a standalone probe, not a
/// committed ingest), plus the priority/action_type decision that reading
/// would produce if it became an action item.
pub async fn run_detect(State(state): State<ApiState>, Query(params): Query<DetectQuery>) -> Result<Response, ApiError> {
    if state.app.registry.by_truck_id(&params.truck_id).is_none() {
        return Err(ApiError::NotFound(format!("unknown truck: {}", params.truck_id)));
    }

    let config = crate::config::get();
    let range_width = config
        .sensor_ranges
        .ranges
        .get(&params.sensor_name)
        .map(|r| r.max - r.min)
        .filter(|w| *w > 0.0)
        .unwrap_or(100.0);

    let deviation = params.current_value - params.baseline_value;
    let deviation_ratio = (deviation.abs() / range_width).min(1.0);
    let anomalous = deviation_ratio > 0.1;

    let component = params.component.as_deref().unwrap_or(&params.sensor_name);
    let normalized = normalize_component(component);
    let (priority, priority_score_value) = priority_score(
        PriorityInputs { anomaly_score: Some(deviation_ratio * 100.0), component: Some(normalized.as_str()), ..Default::default() },
        &config.priority_weights,
    );
    let action_type = select_action_type(priority, None);

    Ok(envelope::ok(DetectPayload {
        truck_id: params.truck_id,
        detection: DetectionResult {
            sensor_name: params.sensor_name,
            current_value: params.current_value,
            baseline_value: params.baseline_value,
            deviation,
            deviation_ratio,
            anomalous,
        },
        decision: DecisionResult { priority, priority_score: priority_score_value, action_type },
    }))
}

pub async fn get_spn(Path(spn): Path<u32>) -> Result<Response, ApiError> {
    spn_lookup(spn).map(envelope::ok).ok_or_else(|| ApiError::NotFound(format!("unknown SPN: {spn}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::test_state;

    #[tokio::test]
    async fn detect_for_unknown_truck_is_not_found() {
        let state = test_state();
        let params = DetectQuery {
            truck_id: "T-404".to_string(),
            sensor_name: "oil_press".to_string(),
            current_value: 10.0,
            baseline_value: 50.0,
            component: None,
        };
        assert!(run_detect(State(state), Query(params)).await.is_err());
    }

    #[tokio::test]
    async fn large_deviation_is_flagged_anomalous() {
        let state = test_state();
        let params = DetectQuery {
            truck_id: "T-1".to_string(),
            sensor_name: "oil_press".to_string(),
            current_value: 5.0,
            baseline_value: 60.0,
            component: Some("oil_press".to_string()),
        };
        let response = run_detect(State(state), Query(params)).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn known_spn_resolves() {
        let response = get_spn(Path(110)).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_spn_is_not_found() {
        assert!(get_spn(Path(999_999)).await.is_err());
    }
}
