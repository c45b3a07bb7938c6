//! `GET /config` (SPEC_FULL §6, §9).

use crate::api::envelope::{self, ApiError};
use axum::response::Response;

/// The fully resolved config (baked defaults → TOML → active DB overrides),
/// exactly as every other component currently reads it via `config::get()`.
pub async fn get_config() -> Result<Response, ApiError> {
    Ok(envelope::ok(crate::config::get()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_the_resolved_config() {
        if !crate::config::is_initialized() {
            crate::config::init(crate::config::FleetConfig::default());
        }
        let response = get_config().await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
