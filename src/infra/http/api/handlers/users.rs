//! Users handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use catalog_api_types::CreateUserRequest;

use crate::application::users::CreateUserCommand;
use crate::infra::http::api::error::{ApiError, service_to_api};
use crate::infra::http::api::extract::{PathId, ValidatedJson};
use crate::infra::http::api::state::ApiState;

use super::envelope;

pub async fn list_users(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.users.list_all().await.map_err(service_to_api)?;
    Ok(envelope(StatusCode::OK, "get users success", users))
}

pub async fn get_user(
    State(state): State<ApiState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.find_by_id(id).await.map_err(service_to_api)?;
    Ok(envelope(StatusCode::OK, "get user success", user))
}

pub async fn create_user(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateUserCommand {
        username: payload.username,
        email: payload.email,
    };

    let user = state
        .users
        .create(command)
        .await
        .map_err(service_to_api)?;

    Ok(envelope(StatusCode::CREATED, "user created successfully", user))
}
