pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::RequestContext;

use std::time::Duration;

use axum::{Router, middleware as axum_middleware, routing::get};

/// Full application router: `/health` plus the versioned API, wrapped in
/// request-id, response logging and timeout middleware (outermost first).
pub fn build_router(state: ApiState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(api::handlers::health))
        .merge(build_api_router())
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            request_timeout,
            middleware::enforce_timeout,
        ))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
