//! Route table for the `/api/command-center` surface (SPEC_FULL §6).

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

pub fn command_center_routes(state: ApiState) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/actions", get(handlers::get_actions))
        .route("/truck/:id", get(handlers::get_truck))
        .route("/truck/:id/comprehensive", get(handlers::get_truck_comprehensive))
        .route("/insights", get(handlers::get_insights))
        .route("/health", get(handlers::get_health))
        .route("/trends", get(handlers::get_trends))
        .route("/trends/record", post(handlers::record_trend))
        .route("/risk-scores", get(handlers::get_risk_scores))
        .route("/correlations", get(handlers::get_correlations))
        .route("/def-prediction/:id", get(handlers::get_def_prediction))
        .route("/detect", post(handlers::run_detect))
        .route("/spn/:spn", get(handlers::get_spn))
        .route("/config", get(handlers::get_config))
        .with_state(state)
}
