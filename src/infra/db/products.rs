use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;

use crate::{
    application::pagination::{CountedPage, PageQuery},
    application::repos::{
        ProductQueryFilter, ProductsRepo, ProductsWriteRepo, RepoError, UpdateProductParams,
    },
    domain::entities::{CategoryRecord, ProductRecord, ProductReport, ProductReportItem},
    domain::products::ProductFields,
};

use super::{PostgresRepositories, map_sqlx_error, util::convert_count};

/// Column list for a product row joined with its category as `c`.
macro_rules! product_columns {
    () => {
        "p.id, p.name, p.description, p.price, p.stock_quantity, p.is_active, \
         p.category_id, p.created_at, p.updated_at, \
         c.name AS category_name, c.description AS category_description, \
         c.created_at AS category_created_at, c.updated_at AS category_updated_at"
    };
}

const SELECT_PRODUCTS: &str = concat!(
    "SELECT ",
    product_columns!(),
    " FROM products p INNER JOIN categories c ON c.id = p.category_id"
);

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: i64,
    stock_quantity: i32,
    is_active: bool,
    category_id: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    category_name: String,
    category_description: String,
    category_created_at: OffsetDateTime,
    category_updated_at: OffsetDateTime,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            is_active: row.is_active,
            category_id: row.category_id,
            category: CategoryRecord {
                id: row.category_id,
                name: row.category_name,
                description: row.category_description,
                created_at: row.category_created_at,
                updated_at: row.category_updated_at,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReportTotalsRow {
    total_products: i64,
    total_stock: i64,
    average_price: f64,
}

#[derive(sqlx::FromRow)]
struct ReportItemRow {
    id: i64,
    name: String,
    category_name: String,
    price: i64,
    stock_quantity: i32,
}

impl From<ReportItemRow> for ProductReportItem {
    fn from(row: ReportItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category_name: row.category_name,
            price: row.price,
            stock_quantity: row.stock_quantity,
        }
    }
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, RepoError> {
        let sql = format!("{SELECT_PRODUCTS} ORDER BY p.id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ProductRecord::from).collect())
    }

    async fn list_products(
        &self,
        filter: &ProductQueryFilter,
        page: PageQuery,
    ) -> Result<CountedPage<ProductRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM products p WHERE 1=1");
        Self::apply_product_filter(&mut count_qb, &filter.filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::new(SELECT_PRODUCTS);
        qb.push(" WHERE 1=1");
        Self::apply_product_filter(&mut qb, &filter.filter);

        let order = filter.sort.order.as_sql();
        qb.push(format!(
            " ORDER BY p.{} {order}, p.id {order}",
            filter.sort.column.as_str()
        ));
        qb.push(" LIMIT ");
        qb.push_bind(page.limit);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows: Vec<ProductRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(CountedPage {
            items: rows.into_iter().map(ProductRecord::from).collect(),
            total: convert_count(total)?,
        })
    }

    async fn product_report(&self) -> Result<ProductReport, RepoError> {
        let totals = sqlx::query_as::<_, ReportTotalsRow>(
            r#"
            SELECT
                COUNT(*) AS total_products,
                COALESCE(SUM(stock_quantity), 0)::BIGINT AS total_stock,
                COALESCE(AVG(price), 0)::DOUBLE PRECISION AS average_price
            FROM products
            "#,
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let items = sqlx::query_as::<_, ReportItemRow>(
            r#"
            SELECT p.id, p.name, c.name AS category_name, p.price, p.stock_quantity
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            ORDER BY p.id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ProductReport {
            total_products: totals.total_products,
            total_stock: totals.total_stock,
            average_price: totals.average_price,
            products: items.into_iter().map(ProductReportItem::from).collect(),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        let sql = format!("{SELECT_PRODUCTS} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(ProductRecord::from))
    }
}

#[async_trait]
impl ProductsWriteRepo for PostgresRepositories {
    async fn create_product(&self, fields: ProductFields) -> Result<ProductRecord, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>(concat!(
            "WITH p AS (",
            "INSERT INTO products (name, description, price, stock_quantity, is_active, category_id) ",
            "VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
            ") SELECT ",
            product_columns!(),
            " FROM p INNER JOIN categories c ON c.id = p.category_id"
        ))
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.price)
        .bind(fields.stock_quantity)
        .bind(fields.is_active)
        .bind(fields.category_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_product(
        &self,
        params: UpdateProductParams,
    ) -> Result<ProductRecord, RepoError> {
        let UpdateProductParams { id, fields } = params;

        let row = sqlx::query_as::<_, ProductRow>(concat!(
            "WITH p AS (",
            "UPDATE products SET name = $2, description = $3, price = $4, ",
            "stock_quantity = $5, is_active = $6, category_id = $7, updated_at = NOW() ",
            "WHERE id = $1 RETURNING *",
            ") SELECT ",
            product_columns!(),
            " FROM p INNER JOIN categories c ON c.id = p.category_id"
        ))
        .bind(id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.price)
        .bind(fields.stock_quantity)
        .bind(fields.is_active)
        .bind(fields.category_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(ProductRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
