//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::{CountedPage, PageQuery};
use crate::domain::entities::{CategoryRecord, ProductRecord, ProductReport, UserRecord};
use crate::domain::products::{ProductFields, ProductFilter, ProductSort};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Listing predicate with the sort already resolved against the allow-list.
#[derive(Debug, Clone, Default)]
pub struct ProductQueryFilter {
    pub filter: ProductFilter,
    pub sort: ProductSort,
}

#[derive(Debug, Clone)]
pub struct UpdateProductParams {
    pub id: i64,
    pub fields: ProductFields,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryParams {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateCategoryParams {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub email: String,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepoError>;
    async fn list_products(
        &self,
        filter: &ProductQueryFilter,
        page: PageQuery,
    ) -> Result<CountedPage<ProductRecord>, RepoError>;
    async fn product_report(&self) -> Result<ProductReport, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError>;
}

#[async_trait]
pub trait ProductsWriteRepo: Send + Sync {
    async fn create_product(&self, fields: ProductFields) -> Result<ProductRecord, RepoError>;
    async fn update_product(&self, params: UpdateProductParams)
    -> Result<ProductRecord, RepoError>;
    async fn delete_product(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<CategoryRecord>, RepoError>;
}

#[async_trait]
pub trait CategoriesWriteRepo: Send + Sync {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;
    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;
    async fn delete_category(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<UserRecord>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
