//! # Coupon Repository
//!
//! Cached coupons, keyed by `(site_id, coupon_id)`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use shopsync_core::{Coupon, SiteId};

use crate::error::DbResult;
use crate::table::{KeyValue, LocalTable, SqliteQuery};

const INSERT_SQL: &str = r#"
    INSERT INTO coupons (
        id, site_id, coupon_id, code, amount, discount_type, description,
        date_expires, usage_count, usage_limit, individual_use, free_shipping,
        date_modified, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
"#;

const UPDATE_SQL: &str = r#"
    UPDATE coupons SET
        code = ?2,
        amount = ?3,
        discount_type = ?4,
        description = ?5,
        date_expires = ?6,
        usage_count = ?7,
        usage_limit = ?8,
        individual_use = ?9,
        free_shipping = ?10,
        date_modified = ?11,
        updated_at = ?12
    WHERE id = ?1
"#;

impl LocalTable for Coupon {
    const TABLE: &'static str = "coupons";
    const KEY_COLUMN: &'static str = "coupon_id";
    const ORDER_BY: &'static str = "code COLLATE NOCASE ASC, coupon_id ASC";

    fn key_value(key: &Self::Key) -> KeyValue {
        KeyValue::Integer(*key)
    }

    fn insert_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q> {
        sqlx::query(INSERT_SQL)
            .bind(row_id)
            .bind(self.site_id)
            .bind(self.coupon_id)
            .bind(self.code.as_str())
            .bind(self.amount.as_str())
            .bind(self.discount_type)
            .bind(self.description.as_str())
            .bind(self.date_expires)
            .bind(self.usage_count)
            .bind(self.usage_limit)
            .bind(self.individual_use)
            .bind(self.free_shipping)
            .bind(self.date_modified)
            .bind(now)
    }

    fn update_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q> {
        sqlx::query(UPDATE_SQL)
            .bind(row_id)
            .bind(self.code.as_str())
            .bind(self.amount.as_str())
            .bind(self.discount_type)
            .bind(self.description.as_str())
            .bind(self.date_expires)
            .bind(self.usage_count)
            .bind(self.usage_limit)
            .bind(self.individual_use)
            .bind(self.free_shipping)
            .bind(self.date_modified)
            .bind(now)
    }
}

/// Repository for cached coupons.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Lists the coupons of a site, ordered by code.
    pub async fn list(&self, site_id: SiteId) -> DbResult<Vec<Coupon>> {
        let coupons = super::list_for_site::<Coupon>(&self.pool, site_id).await?;
        debug!(site_id = %site_id, count = coupons.len(), "Listed coupons");
        Ok(coupons)
    }

    /// Gets a coupon by remote id.
    pub async fn get(&self, site_id: SiteId, coupon_id: i64) -> DbResult<Option<Coupon>> {
        super::get_by_key::<Coupon>(&self.pool, site_id, &coupon_id).await
    }

    /// Counts the coupons of a site.
    pub async fn count(&self, site_id: SiteId) -> DbResult<i64> {
        super::count_for_site::<Coupon>(&self.pool, site_id).await
    }

    /// Local row ids of a site, ordered by coupon id.
    pub async fn row_ids(&self, site_id: SiteId) -> DbResult<Vec<String>> {
        super::row_ids_for_site::<Coupon>(&self.pool, site_id).await
    }

    /// Finds a coupon by code (case-insensitive, as the store treats codes).
    pub async fn find_by_code(&self, site_id: SiteId, code: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "SELECT * FROM coupons WHERE site_id = ?1 AND code = ?2 COLLATE NOCASE LIMIT 1",
        )
        .bind(site_id)
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopsync_core::DiscountType;

    #[tokio::test]
    async fn test_round_trip_and_code_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let site = SiteId::new(3);

        let mut coupon = Coupon::new(site, 88, "Summer10");
        coupon.discount_type = DiscountType::Percent;
        coupon.amount = "10.00".to_string();
        coupon.usage_limit = Some(100);

        let mut session = db.begin_write().await.unwrap();
        session.insert(&coupon).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(db.coupons().get(site, 88).await.unwrap(), Some(coupon.clone()));
        assert_eq!(db.coupons().find_by_code(site, "summer10").await.unwrap(), Some(coupon));
        assert_eq!(db.coupons().find_by_code(SiteId::new(4), "summer10").await.unwrap(), None);
    }
}
