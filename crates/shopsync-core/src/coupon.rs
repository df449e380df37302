//! # Coupons
//!
//! Discount coupons defined for a site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ResourceKind, SiteId, SiteResource};

/// How a coupon's amount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percent,
    #[default]
    FixedCart,
    FixedProduct,
    #[serde(other)]
    Other,
}

/// A discount coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Coupon {
    pub site_id: SiteId,

    /// Remote coupon id; the natural key.
    pub coupon_id: i64,

    pub code: String,

    /// Amount as a decimal string.
    pub amount: String,
    pub discount_type: DiscountType,
    pub description: String,
    pub date_expires: Option<DateTime<Utc>>,
    pub usage_count: i64,
    pub usage_limit: Option<i64>,
    pub individual_use: bool,
    pub free_shipping: bool,
    pub date_modified: DateTime<Utc>,
}

impl Coupon {
    /// Creates a fixed-cart coupon with the given id and code.
    pub fn new(site_id: SiteId, coupon_id: i64, code: impl Into<String>) -> Self {
        Coupon {
            site_id,
            coupon_id,
            code: code.into(),
            amount: "0".to_string(),
            discount_type: DiscountType::default(),
            description: String::new(),
            date_expires: None,
            usage_count: 0,
            usage_limit: None,
            individual_use: false,
            free_shipping: false,
            date_modified: Utc::now(),
        }
    }

    /// Returns true when the coupon has an expiry at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.date_expires.is_some_and(|expires| expires <= now)
    }

    /// Returns true when a usage limit exists and has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.usage_count >= limit)
    }
}

impl SiteResource for Coupon {
    type Key = i64;

    const KIND: ResourceKind = ResourceKind::Coupon;

    fn site_id(&self) -> SiteId {
        self.site_id
    }

    fn key(&self) -> i64 {
        self.coupon_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut coupon = Coupon::new(SiteId::new(3), 1, "SUMMER");
        assert!(!coupon.is_expired(now));

        coupon.date_expires = Some(now - Duration::days(1));
        assert!(coupon.is_expired(now));

        coupon.date_expires = Some(now + Duration::days(1));
        assert!(!coupon.is_expired(now));
    }

    #[test]
    fn test_usage_limit() {
        let mut coupon = Coupon::new(SiteId::new(3), 1, "ONCE");
        coupon.usage_limit = Some(1);
        assert!(!coupon.is_exhausted());

        coupon.usage_count = 1;
        assert!(coupon.is_exhausted());
    }
}
