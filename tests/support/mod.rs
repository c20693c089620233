#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower::ServiceExt;

use catalog::application::categories::CategoryService;
use catalog::application::pagination::{CountedPage, PageQuery};
use catalog::application::products::ProductService;
use catalog::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, CreateUserParams, HealthRepo,
    ProductQueryFilter, ProductsRepo, ProductsWriteRepo, RepoError, UpdateCategoryParams,
    UpdateProductParams, UsersRepo,
};
use catalog::application::users::UserService;
use catalog::cache::{CacheStore, MemoryCache};
use catalog::domain::entities::{
    CategoryRecord, ProductRecord, ProductReport, ProductReportItem, UserRecord,
};
use catalog::domain::products::{ProductFields, SortColumn, SortOrder};
use catalog::infra::http::{ApiState, build_router};

#[derive(Default)]
struct Tables {
    categories: Vec<CategoryRecord>,
    products: Vec<ProductRecord>,
    users: Vec<UserRecord>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category(&self, id: i64) -> Result<CategoryRecord, RepoError> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
            .ok_or_else(|| RepoError::InvalidInput {
                message: "violates foreign key constraint \"products_category_id_fkey\""
                    .to_string(),
            })
    }
}

/// Postgres stand-in with the same filtering, ordering and constraint
/// behaviour as the real repositories.
#[derive(Default)]
pub struct InMemoryCatalog {
    tables: Mutex<Tables>,
    report_calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }
}

fn matches(product: &ProductRecord, query: &ProductQueryFilter) -> bool {
    let filter = &query.filter;
    filter.name.as_ref().is_none_or(|name| {
        product
            .name
            .to_lowercase()
            .contains(&name.to_lowercase())
    }) && filter.category_id.is_none_or(|id| product.category_id == id)
        && filter.price_min.is_none_or(|min| product.price >= min)
        && filter.price_max.is_none_or(|max| product.price <= max)
        && filter.stock_min.is_none_or(|min| product.stock_quantity >= min)
        && filter.stock_max.is_none_or(|max| product.stock_quantity <= max)
}

fn compare(a: &ProductRecord, b: &ProductRecord, column: SortColumn) -> CmpOrdering {
    let primary = match column {
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::Price => a.price.cmp(&b.price),
        SortColumn::StockQuantity => a.stock_quantity.cmp(&b.stock_quantity),
        SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        SortColumn::CategoryId => a.category_id.cmp(&b.category_id),
    };
    primary.then(a.id.cmp(&b.id))
}

#[async_trait]
impl ProductsRepo for InMemoryCatalog {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepoError> {
        Ok(self.tables.lock().await.products.clone())
    }

    async fn list_products(
        &self,
        filter: &ProductQueryFilter,
        page: PageQuery,
    ) -> Result<CountedPage<ProductRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<ProductRecord> = tables
            .products
            .iter()
            .filter(|product| matches(product, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let ordering = compare(a, b, filter.sort.column);
            match filter.sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(CountedPage { items, total })
    }

    async fn product_report(&self) -> Result<ProductReport, RepoError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        let products = &tables.products;
        if products.is_empty() {
            return Ok(ProductReport::empty());
        }

        let total_stock = products.iter().map(|p| i64::from(p.stock_quantity)).sum();
        let price_sum: i64 = products.iter().map(|p| p.price).sum();
        Ok(ProductReport {
            total_products: products.len() as i64,
            total_stock,
            average_price: price_sum as f64 / products.len() as f64,
            products: products
                .iter()
                .map(|p| ProductReportItem {
                    id: p.id,
                    name: p.name.clone(),
                    category_name: p.category.name.clone(),
                    price: p.price,
                    stock_quantity: p.stock_quantity,
                })
                .collect(),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl ProductsWriteRepo for InMemoryCatalog {
    async fn create_product(&self, fields: ProductFields) -> Result<ProductRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let category = tables.category(fields.category_id)?;
        let now = OffsetDateTime::now_utc();
        let product = ProductRecord {
            id: tables.next_id(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            stock_quantity: fields.stock_quantity,
            is_active: fields.is_active,
            category_id: fields.category_id,
            category,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let category = tables.category(params.fields.category_id)?;
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == params.id)
            .ok_or(RepoError::NotFound)?;

        let fields = params.fields;
        product.name = fields.name;
        product.description = fields.description;
        product.price = fields.price;
        product.stock_quantity = fields.stock_quantity;
        product.is_active = fields.is_active;
        product.category_id = fields.category_id;
        product.category = category;
        product.updated_at = OffsetDateTime::now_utc();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoriesRepo for InMemoryCatalog {
    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(self.tables.lock().await.categories.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CategoryRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl CategoriesWriteRepo for InMemoryCatalog {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let now = OffsetDateTime::now_utc();
        let category = CategoryRecord {
            id: tables.next_id(),
            name: params.name,
            description: params.description,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.id == params.id)
            .ok_or(RepoError::NotFound)?;
        category.name = params.name;
        category.description = params.description;
        category.updated_at = OffsetDateTime::now_utc();
        let updated = category.clone();
        // Products embed their category the way the SQL join would return it.
        for product in tables.products.iter_mut().filter(|p| p.category_id == updated.id) {
            product.category = updated.clone();
        }
        Ok(updated)
    }

    async fn delete_category(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.products.iter().any(|p| p.category_id == id) {
            return Err(RepoError::InvalidInput {
                message: "violates foreign key constraint \"products_category_id_fkey\""
                    .to_string(),
            });
        }
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UsersRepo for InMemoryCatalog {
    async fn list_all(&self) -> Result<Vec<UserRecord>, RepoError> {
        Ok(self.tables.lock().await.users.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == params.username || u.email == params.email)
        {
            return Err(RepoError::Duplicate {
                constraint: "users_email_key".to_string(),
            });
        }
        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: tables.next_id(),
            username: params.username,
            email: params.email,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl HealthRepo for InMemoryCatalog {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<InMemoryCatalog>,
    pub cache: Arc<dyn CacheStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(cache: Arc<dyn CacheStore>) -> Self {
        Self::with_timeout(cache, Duration::from_secs(5))
    }

    pub fn with_timeout(cache: Arc<dyn CacheStore>, request_timeout: Duration) -> Self {
        let catalog = InMemoryCatalog::new();
        let products = ProductService::new(catalog.clone(), catalog.clone())
            .with_cache(cache.clone(), Duration::from_secs(300));
        let state = ApiState {
            products: Arc::new(products),
            categories: Arc::new(
                CategoryService::new(catalog.clone(), catalog.clone()).with_cache(cache.clone()),
            ),
            users: Arc::new(UserService::new(catalog.clone())),
            health: catalog.clone(),
            cache: cache.clone(),
        };

        Self {
            router: build_router(state, request_timeout),
            catalog,
            cache,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }
}
