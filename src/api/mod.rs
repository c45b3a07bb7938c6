//! HTTP API (SPEC_FULL §6, §10.6): the `/api/command-center` surface served
//! over `axum`, with `tower-http` layers for tracing, compression, and CORS.
//! Every response goes through [`envelope`]'s success/error wrapper.

pub mod envelope;
pub mod handlers;
mod routes;

pub use envelope::ApiError;
pub use handlers::ApiState;

use axum::Router;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// Build the full application router.
pub fn create_app(state: ApiState) -> Router {
    Router::new()
        .nest("/api/command-center", routes::command_center_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
