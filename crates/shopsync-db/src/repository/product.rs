//! # Product Repository
//!
//! Cached catalog products, keyed by `(site_id, product_id)`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use shopsync_core::{Product, SiteId, StockStatus};

use crate::error::DbResult;
use crate::table::{KeyValue, LocalTable, SqliteQuery};

const INSERT_SQL: &str = r#"
    INSERT INTO products (
        id, site_id, product_id, name, slug, permalink,
        product_type, status, sku,
        price, regular_price, sale_price,
        stock_status, manage_stock, stock_quantity,
        date_created, date_modified,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18)
"#;

const UPDATE_SQL: &str = r#"
    UPDATE products SET
        name = ?2,
        slug = ?3,
        permalink = ?4,
        product_type = ?5,
        status = ?6,
        sku = ?7,
        price = ?8,
        regular_price = ?9,
        sale_price = ?10,
        stock_status = ?11,
        manage_stock = ?12,
        stock_quantity = ?13,
        date_created = ?14,
        date_modified = ?15,
        updated_at = ?16
    WHERE id = ?1
"#;

impl LocalTable for Product {
    const TABLE: &'static str = "products";
    const KEY_COLUMN: &'static str = "product_id";
    const ORDER_BY: &'static str = "name COLLATE NOCASE ASC, product_id ASC";

    fn key_value(key: &Self::Key) -> KeyValue {
        KeyValue::Integer(*key)
    }

    fn insert_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q> {
        sqlx::query(INSERT_SQL)
            .bind(row_id)
            .bind(self.site_id)
            .bind(self.product_id)
            .bind(self.name.as_str())
            .bind(self.slug.as_str())
            .bind(self.permalink.as_str())
            .bind(self.product_type)
            .bind(self.status)
            .bind(self.sku.as_deref())
            .bind(self.price.as_str())
            .bind(self.regular_price.as_deref())
            .bind(self.sale_price.as_deref())
            .bind(self.stock_status)
            .bind(self.manage_stock)
            .bind(self.stock_quantity)
            .bind(self.date_created)
            .bind(self.date_modified)
            .bind(now)
    }

    fn update_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q> {
        sqlx::query(UPDATE_SQL)
            .bind(row_id)
            .bind(self.name.as_str())
            .bind(self.slug.as_str())
            .bind(self.permalink.as_str())
            .bind(self.product_type)
            .bind(self.status)
            .bind(self.sku.as_deref())
            .bind(self.price.as_str())
            .bind(self.regular_price.as_deref())
            .bind(self.sale_price.as_deref())
            .bind(self.stock_status)
            .bind(self.manage_stock)
            .bind(self.stock_quantity)
            .bind(self.date_created)
            .bind(self.date_modified)
            .bind(now)
    }
}

/// Repository for cached products.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let all = repo.list(site).await?;
/// let hoodie = repo.get(site, 1042).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the products of a site, ordered by name.
    pub async fn list(&self, site_id: SiteId) -> DbResult<Vec<Product>> {
        let products = super::list_for_site::<Product>(&self.pool, site_id).await?;
        debug!(site_id = %site_id, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by remote id.
    pub async fn get(&self, site_id: SiteId, product_id: i64) -> DbResult<Option<Product>> {
        super::get_by_key::<Product>(&self.pool, site_id, &product_id).await
    }

    /// Counts the products of a site.
    pub async fn count(&self, site_id: SiteId) -> DbResult<i64> {
        super::count_for_site::<Product>(&self.pool, site_id).await
    }

    /// Local row ids of a site, ordered by product id.
    pub async fn row_ids(&self, site_id: SiteId) -> DbResult<Vec<String>> {
        super::row_ids_for_site::<Product>(&self.pool, site_id).await
    }

    /// Lists the products of a site with the given stock status.
    pub async fn list_by_stock_status(
        &self,
        site_id: SiteId,
        stock_status: StockStatus,
    ) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE site_id = ?1 AND stock_status = ?2
            ORDER BY name COLLATE NOCASE ASC, product_id ASC
            "#,
        )
        .bind(site_id)
        .bind(stock_status)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}
