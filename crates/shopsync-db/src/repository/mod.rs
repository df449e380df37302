//! # Repository Module
//!
//! Read-only access to the cached rows, for view models and the CLI.
//! Writes go through [`WriteSession`](crate::session::WriteSession) only.
//!
//! ## Available Repositories
//!
//! - [`SitePluginRepository`] - Plugins installed per site
//! - [`ProductRepository`] - Catalog products per site
//! - [`CouponRepository`] - Coupons per site

pub mod coupon;
pub mod plugin;
pub mod product;

pub use coupon::CouponRepository;
pub use plugin::SitePluginRepository;
pub use product::ProductRepository;

use sqlx::SqlitePool;

use shopsync_core::SiteId;

use crate::error::DbResult;
use crate::table::{KeyValue, LocalTable};

// =============================================================================
// Shared Queries
// =============================================================================

pub(crate) async fn list_for_site<T: LocalTable>(pool: &SqlitePool, site_id: SiteId) -> DbResult<Vec<T>> {
    let sql = format!(
        "SELECT * FROM {} WHERE site_id = ?1 ORDER BY {}",
        T::TABLE,
        T::ORDER_BY
    );

    Ok(sqlx::query_as::<_, T>(&sql)
        .bind(site_id)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn get_by_key<T: LocalTable>(
    pool: &SqlitePool,
    site_id: SiteId,
    key: &T::Key,
) -> DbResult<Option<T>> {
    let sql = format!(
        "SELECT * FROM {} WHERE site_id = ?1 AND {} = ?2",
        T::TABLE,
        T::KEY_COLUMN
    );

    let query = sqlx::query_as::<_, T>(&sql).bind(site_id);
    let query = match T::key_value(key) {
        KeyValue::Text(value) => query.bind(value),
        KeyValue::Integer(value) => query.bind(value),
    };

    Ok(query.fetch_optional(pool).await?)
}

pub(crate) async fn count_for_site<T: LocalTable>(pool: &SqlitePool, site_id: SiteId) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE site_id = ?1", T::TABLE);

    Ok(sqlx::query_scalar::<_, i64>(&sql)
        .bind(site_id)
        .fetch_one(pool)
        .await?)
}

/// Local row ids of a site, ordered by natural key.
pub(crate) async fn row_ids_for_site<T: LocalTable>(
    pool: &SqlitePool,
    site_id: SiteId,
) -> DbResult<Vec<String>> {
    let sql = format!(
        "SELECT id FROM {} WHERE site_id = ?1 ORDER BY {}",
        T::TABLE,
        T::KEY_COLUMN
    );

    Ok(sqlx::query_scalar::<_, String>(&sql)
        .bind(site_id)
        .fetch_all(pool)
        .await?)
}
