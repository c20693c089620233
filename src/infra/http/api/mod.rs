pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/v1/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/api/v1/products/all", get(handlers::list_all_products))
        .route("/api/v1/products/report", get(handlers::product_report))
        .route(
            "/api/v1/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/api/v1/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/v1/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/v1/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/v1/users/{id}", get(handlers::get_user))
}
