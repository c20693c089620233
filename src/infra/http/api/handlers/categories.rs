//! Categories handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use catalog_api_types::{CreateCategoryRequest, UpdateCategoryRequest};

use crate::application::categories::{CreateCategoryCommand, UpdateCategoryCommand};
use crate::infra::http::api::error::{ApiError, service_to_api};
use crate::infra::http::api::extract::{PathId, ValidatedJson};
use crate::infra::http::api::state::ApiState;

use super::{empty_envelope, envelope};

pub async fn list_categories(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.categories.list_all().await.map_err(service_to_api)?;
    Ok(envelope(StatusCode::OK, "get categories success", categories))
}

pub async fn get_category(
    State(state): State<ApiState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .find_by_id(id)
        .await
        .map_err(service_to_api)?;
    Ok(envelope(StatusCode::OK, "get category success", category))
}

pub async fn create_category(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateCategoryCommand {
        name: payload.name,
        description: payload.description,
    };

    let category = state
        .categories
        .create(command)
        .await
        .map_err(service_to_api)?;

    Ok(envelope(
        StatusCode::CREATED,
        "category created successfully",
        category,
    ))
}

pub async fn update_category(
    State(state): State<ApiState>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateCategoryCommand {
        name: payload.name,
        description: payload.description,
    };

    let category = state
        .categories
        .edit(id, command)
        .await
        .map_err(service_to_api)?;

    Ok(envelope(
        StatusCode::OK,
        "category updated successfully",
        category,
    ))
}

pub async fn delete_category(
    State(state): State<ApiState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    state.categories.delete(id).await.map_err(service_to_api)?;
    Ok(empty_envelope(StatusCode::OK, "category deleted successfully"))
}
