use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, instrument, warn};

use crate::application::error::{ServiceError, ensure_positive_id};
use crate::application::pagination::{PageQuery, Paginated};
use crate::application::repos::{
    ProductQueryFilter, ProductsRepo, ProductsWriteRepo, UpdateProductParams,
};
use crate::cache::{CacheKey, CacheStore, NullCache};
use crate::domain::entities::{ProductRecord, ProductReport};
use crate::domain::products::{ProductFields, ProductFilter, ProductPatch, ProductSort};

pub(crate) const METRIC_REPORT_CACHE_HIT: &str = "catalog_report_cache_hit_total";
pub(crate) const METRIC_REPORT_CACHE_MISS: &str = "catalog_report_cache_miss_total";
pub(crate) const METRIC_CACHE_ERROR: &str = "catalog_cache_error_total";
pub(crate) const METRIC_REPORT_INVALIDATED: &str = "catalog_report_cache_invalidation_total";

const DEFAULT_REPORT_TTL: Duration = Duration::from_secs(5 * 60);
const ENTITY: &str = "product";

#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub category_id: i64,
}

/// Listing request before sort resolution.
#[derive(Debug, Clone, Default)]
pub struct ProductListParams {
    pub filter: ProductFilter,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Clone)]
pub struct ProductService {
    reader: Arc<dyn ProductsRepo>,
    writer: Arc<dyn ProductsWriteRepo>,
    cache: Arc<dyn CacheStore>,
    report_ttl: Duration,
}

impl ProductService {
    pub fn new(reader: Arc<dyn ProductsRepo>, writer: Arc<dyn ProductsWriteRepo>) -> Self {
        Self {
            reader,
            writer,
            cache: Arc::new(NullCache),
            report_ttl: DEFAULT_REPORT_TTL,
        }
    }

    /// Attach the cache that backs the product report.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>, report_ttl: Duration) -> Self {
        self.cache = cache;
        self.report_ttl = report_ttl;
        self
    }

    pub async fn list_all(&self) -> Result<Vec<ProductRecord>, ServiceError> {
        self.reader.list_all().await.map_err(ServiceError::from)
    }

    pub async fn list_paginated(
        &self,
        params: ProductListParams,
        page: PageQuery,
    ) -> Result<Paginated<ProductRecord>, ServiceError> {
        let page = page.normalize();
        let query = ProductQueryFilter {
            filter: params.filter.normalized(),
            sort: ProductSort::resolve(params.sort_by.as_deref(), params.sort_order.as_deref()),
        };

        let result = self.reader.list_products(&query, page).await?;
        Ok(Paginated::from_page(result, page))
    }

    /// Cache-aside read of the catalog report. Cache trouble of any kind
    /// falls through to the store and never fails the call.
    #[instrument(skip(self))]
    pub async fn report(&self) -> Result<ProductReport, ServiceError> {
        if let Some(report) = self.cached_report().await {
            counter!(METRIC_REPORT_CACHE_HIT).increment(1);
            return Ok(report);
        }
        counter!(METRIC_REPORT_CACHE_MISS).increment(1);

        let report = self.reader.product_report().await?;
        self.store_report(&report).await;
        Ok(report)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<ProductRecord, ServiceError> {
        ensure_positive_id(id)?;
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound { entity: ENTITY })
    }

    pub async fn create(
        &self,
        command: CreateProductCommand,
    ) -> Result<ProductRecord, ServiceError> {
        let fields = ProductFields {
            name: command.name.trim().to_string(),
            description: command.description.trim().to_string(),
            price: command.price,
            stock_quantity: command.stock_quantity,
            is_active: command.is_active,
            category_id: command.category_id,
        };
        fields.check().map_err(ServiceError::ConstraintViolation)?;

        let product = self.writer.create_product(fields).await?;
        invalidate_report(self.cache.as_ref()).await;
        Ok(product)
    }

    pub async fn edit(&self, id: i64, patch: ProductPatch) -> Result<ProductRecord, ServiceError> {
        ensure_positive_id(id)?;

        let existing = self.find_by_id(id).await?;
        let mut fields = patch.apply(ProductFields::from(&existing));
        fields.name = fields.name.trim().to_string();
        fields.description = fields.description.trim().to_string();
        fields.check().map_err(ServiceError::ConstraintViolation)?;

        let product = self
            .writer
            .update_product(UpdateProductParams { id, fields })
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        invalidate_report(self.cache.as_ref()).await;
        Ok(product)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        ensure_positive_id(id)?;
        self.writer
            .delete_product(id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        invalidate_report(self.cache.as_ref()).await;
        Ok(())
    }

    async fn cached_report(&self) -> Option<ProductReport> {
        if !self.cache.is_available() {
            return None;
        }

        let key = CacheKey::ProductReport;
        let bytes = match self.cache.get(key.as_str()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %key, "Report cache miss");
                return None;
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "op" => "get").increment(1);
                warn!(
                    target: "catalog::cache",
                    key = %key,
                    error = %err,
                    "Failed to read cached report"
                );
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(report) => Some(report),
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "op" => "decode").increment(1);
                warn!(
                    target: "catalog::cache",
                    key = %key,
                    error = %err,
                    "Discarding undecodable cached report"
                );
                None
            }
        }
    }

    async fn store_report(&self, report: &ProductReport) {
        if !self.cache.is_available() {
            return;
        }

        let key = CacheKey::ProductReport;
        let bytes = match serde_json::to_vec(report) {
            Ok(bytes) => bytes,
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "op" => "encode").increment(1);
                warn!(
                    target: "catalog::cache",
                    key = %key,
                    error = %err,
                    "Failed to encode report for caching"
                );
                return;
            }
        };

        if let Err(err) = self.cache.set(key.as_str(), &bytes, self.report_ttl).await {
            counter!(METRIC_CACHE_ERROR, "op" => "set").increment(1);
            warn!(
                target: "catalog::cache",
                key = %key,
                error = %err,
                "Failed to cache report"
            );
        }
    }
}

/// Best-effort drop of the cached report after a write that changes what it
/// would contain.
pub(crate) async fn invalidate_report(cache: &dyn CacheStore) {
    if !cache.is_available() {
        return;
    }

    let key = CacheKey::ProductReport;
    match cache.delete(key.as_str()).await {
        Ok(()) => {
            counter!(METRIC_REPORT_INVALIDATED).increment(1);
            debug!(key = %key, "Invalidated cached report");
        }
        Err(err) => {
            counter!(METRIC_CACHE_ERROR, "op" => "delete").increment(1);
            warn!(
                target: "catalog::cache",
                key = %key,
                error = %err,
                "Failed to invalidate cached report"
            );
        }
    }
}
