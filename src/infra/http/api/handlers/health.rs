//! Liveness handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::infra::http::api::error::{ApiError, codes};
use crate::infra::http::api::state::ApiState;

use super::envelope;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub database: &'static str,
    pub cache: &'static str,
}

/// Pings the store; the cache only reports its state since the service
/// runs without it.
pub async fn health(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    state.health.ping().await.map_err(|err| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            "Database unavailable",
            Some(err.to_string()),
        )
    })?;

    let status = HealthStatus {
        database: "ok",
        cache: if state.cache.is_available() {
            "available"
        } else {
            "unavailable"
        },
    };

    Ok(envelope(StatusCode::OK, "ok", status))
}
