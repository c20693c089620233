//! Wire types shared by the catalog HTTP API and its clients.

mod validation;

use serde::{Deserialize, Serialize};

pub use validation::{FieldErrors, Rule, Validate};

/// Success envelope wrapped around every non-error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn empty(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// Query string accepted by the paginated product listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub stock_min: Option<i32>,
    pub stock_max: Option<i32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<i64>,
    pub stock_quantity: Option<i32>,
    #[serde(default)]
    pub is_active: bool,
    pub category_id: Option<i64>,
}

impl Validate for CreateProductRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require_text("name", &self.name);
        errors.require_text("description", &self.description);
        errors.require_gt("price", self.price, 0);
        errors.require_gte("stock_quantity", self.stock_quantity.map(i64::from), 0);
        errors.require_gt("category_id", self.category_id, 0);
        errors.into_result()
    }
}

/// Partial product update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock_quantity: Option<i32>,
    pub is_active: Option<bool>,
    pub category_id: Option<i64>,
}

impl Validate for UpdateProductRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.optional_text("name", self.name.as_deref());
        errors.optional_text("description", self.description.as_deref());
        errors.optional_gt("price", self.price, 0);
        errors.optional_gte("stock_quantity", self.stock_quantity.map(i64::from), 0);
        errors.optional_gt("category_id", self.category_id, 0);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Validate for CreateCategoryRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require_text("name", &self.name);
        errors.require_text("description", &self.description);
        errors.into_result()
    }
}

/// Blank or absent fields leave the stored category untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdateCategoryRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require_text("username", &self.username);
        errors.require_email("email", &self.email);
        errors.into_result()
    }
}
