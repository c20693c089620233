//! Postgres-backed repository implementations.

mod categories;
mod products;
mod users;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{HealthRepo, RepoError};
use crate::domain::products::ProductFilter;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Appends the listing predicate; shared by the page query and its count
    /// so both see exactly the same rows.
    fn apply_product_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q ProductFilter) {
        if let Some(name) = filter.name.as_ref() {
            qb.push(" AND p.name ILIKE ");
            qb.push_bind(util::contains_pattern(name));
        }

        if let Some(category_id) = filter.category_id {
            qb.push(" AND p.category_id = ");
            qb.push_bind(category_id);
        }

        if let Some(price_min) = filter.price_min {
            qb.push(" AND p.price >= ");
            qb.push_bind(price_min);
        }

        if let Some(price_max) = filter.price_max {
            qb.push(" AND p.price <= ");
            qb.push_bind(price_max);
        }

        if let Some(stock_min) = filter.stock_min {
            qb.push(" AND p.stock_quantity >= ");
            qb.push_bind(stock_min);
        }

        if let Some(stock_max) = filter.stock_max {
            qb.push(" AND p.stock_quantity <= ");
            qb.push_bind(stock_max);
        }
    }
}

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}
