//! API handlers organized by resource type.

mod categories;
mod health;
mod products;
mod users;

pub use categories::*;
pub use health::*;
pub use products::*;
pub use users::*;

use axum::Json;
use axum::http::StatusCode;
use catalog_api_types::ApiResponse;

/// Wraps `data` in the success envelope with a matching HTTP status.
pub(crate) fn envelope<T>(
    status: StatusCode,
    message: &str,
    data: T,
) -> (StatusCode, Json<ApiResponse<T>>) {
    (status, Json(ApiResponse::new(status.as_u16(), message, data)))
}

pub(crate) fn empty_envelope(
    status: StatusCode,
    message: &str,
) -> (StatusCode, Json<ApiResponse<()>>) {
    (status, Json(ApiResponse::empty(status.as_u16(), message)))
}
