//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A product joined with the category it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub category_id: i64,
    pub category: CategoryRecord,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Aggregate snapshot over the whole catalog. Also the cached payload, so it
/// round-trips through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    pub total_products: i64,
    pub total_stock: i64,
    pub average_price: f64,
    pub products: Vec<ProductReportItem>,
}

impl ProductReport {
    pub fn empty() -> Self {
        Self {
            total_products: 0,
            total_stock: 0,
            average_price: 0.0,
            products: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReportItem {
    pub id: i64,
    pub name: String,
    pub category_name: String,
    pub price: i64,
    pub stock_quantity: i32,
}
