//! Products handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use catalog_api_types::{CreateProductRequest, ProductListQuery, UpdateProductRequest};

use crate::application::pagination::PageQuery;
use crate::application::products::{CreateProductCommand, ProductListParams};
use crate::domain::products::{ProductFilter, ProductPatch};
use crate::infra::http::api::error::{ApiError, service_to_api};
use crate::infra::http::api::extract::{ApiQuery, PathId, ValidatedJson};
use crate::infra::http::api::state::ApiState;

use super::{empty_envelope, envelope};

pub async fn list_products(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = ProductListParams {
        filter: ProductFilter {
            name: query.name,
            category_id: query.category_id,
            price_min: query.price_min,
            price_max: query.price_max,
            stock_min: query.stock_min,
            stock_max: query.stock_max,
        },
        sort_by: query.sort_by,
        sort_order: query.sort_order,
    };

    let page = state
        .products
        .list_paginated(params, PageQuery::new(query.page, query.limit))
        .await
        .map_err(service_to_api)?;

    Ok(envelope(StatusCode::OK, "get products success", page))
}

pub async fn list_all_products(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.products.list_all().await.map_err(service_to_api)?;
    Ok(envelope(StatusCode::OK, "get products success", products))
}

pub async fn product_report(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.products.report().await.map_err(service_to_api)?;
    Ok(envelope(StatusCode::OK, "get product report success", report))
}

pub async fn get_product(
    State(state): State<ApiState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.products.find_by_id(id).await.map_err(service_to_api)?;
    Ok(envelope(StatusCode::OK, "get product success", product))
}

pub async fn create_product(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Presence of the numeric fields is guaranteed by validation.
    let command = CreateProductCommand {
        name: payload.name,
        description: payload.description,
        price: payload.price.unwrap_or_default(),
        stock_quantity: payload.stock_quantity.unwrap_or_default(),
        is_active: payload.is_active,
        category_id: payload.category_id.unwrap_or_default(),
    };

    let product = state
        .products
        .create(command)
        .await
        .map_err(service_to_api)?;

    Ok(envelope(
        StatusCode::CREATED,
        "product created successfully",
        product,
    ))
}

pub async fn update_product(
    State(state): State<ApiState>,
    PathId(id): PathId,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = ProductPatch {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock_quantity: payload.stock_quantity,
        is_active: payload.is_active,
        category_id: payload.category_id,
    };

    let product = state
        .products
        .edit(id, patch)
        .await
        .map_err(service_to_api)?;

    Ok(envelope(
        StatusCode::OK,
        "Product updated successfully",
        product,
    ))
}

pub async fn delete_product(
    State(state): State<ApiState>,
    PathId(id): PathId,
) -> Result<impl IntoResponse, ApiError> {
    state.products.delete(id).await.map_err(service_to_api)?;
    Ok(empty_envelope(StatusCode::OK, "Product deleted successfully"))
}
