//! # Wire Records
//!
//! JSON shapes returned by the REST API and their conversion into records.
//!
//! The remote never sends a site id; every conversion stamps the site the
//! request was made for, which is what ties a fetched record to its
//! `(site_id, key)` identity.
//!
//! ```text
//! GET /sites/7/wc/v3/products?page=1&per_page=25
//!         │
//!         ▼
//! [ { "id": 1042, "name": "Hoodie", ... }, ... ]   ── ProductDto
//!         │ into_record(SiteId(7))
//!         ▼
//! Product { site_id: 7, product_id: 1042, ... }
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use shopsync_core::{
    Coupon, DiscountType, PluginStatus, Product, ProductStatus, ProductType, SiteId, SitePlugin,
    StockStatus,
};

/// `*_gmt` timestamps carry no offset; they are UTC by definition.
fn gmt(value: Option<NaiveDateTime>) -> Option<DateTime<Utc>> {
    value.map(|naive| naive.and_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// =============================================================================
// Plugins (wp/v2/plugins)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginDescriptionDto {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginDto {
    pub plugin: String,
    #[serde(default)]
    pub status: PluginStatus,
    pub name: String,
    #[serde(default)]
    pub plugin_uri: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_uri: String,
    #[serde(default)]
    pub description: PluginDescriptionDto,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub network_only: bool,
    #[serde(default)]
    pub requires_wp: Option<String>,
    #[serde(default)]
    pub requires_php: Option<String>,
    #[serde(default)]
    pub textdomain: Option<String>,
}

impl PluginDto {
    pub fn into_record(self, site_id: SiteId) -> SitePlugin {
        SitePlugin {
            site_id,
            plugin: self.plugin,
            status: self.status,
            name: self.name,
            plugin_uri: self.plugin_uri,
            author: self.author,
            author_uri: self.author_uri,
            description_raw: self.description.raw,
            description_rendered: self.description.rendered,
            version: self.version,
            network_only: self.network_only,
            requires_wp_version: self.requires_wp.unwrap_or_default(),
            requires_php_version: self.requires_php.unwrap_or_default(),
            text_domain: self.textdomain.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Products (wc/v3/products)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProductDto {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(rename = "type", default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub regular_price: Option<String>,
    #[serde(default)]
    pub sale_price: Option<String>,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub manage_stock: bool,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub date_created_gmt: Option<NaiveDateTime>,
    #[serde(default)]
    pub date_modified_gmt: Option<NaiveDateTime>,
}

impl ProductDto {
    pub fn into_record(self, site_id: SiteId) -> Product {
        let date_created = gmt(self.date_created_gmt).unwrap_or_default();
        Product {
            site_id,
            product_id: self.id,
            name: self.name,
            slug: self.slug,
            permalink: self.permalink,
            product_type: self.product_type,
            status: self.status,
            sku: non_empty(self.sku),
            price: self.price.unwrap_or_default(),
            regular_price: non_empty(self.regular_price),
            sale_price: non_empty(self.sale_price),
            stock_status: self.stock_status,
            manage_stock: self.manage_stock,
            stock_quantity: self.stock_quantity,
            date_created,
            date_modified: gmt(self.date_modified_gmt).unwrap_or(date_created),
        }
    }
}

// =============================================================================
// Coupons (wc/v3/coupons)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CouponDto {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_expires_gmt: Option<NaiveDateTime>,
    #[serde(default)]
    pub usage_count: i64,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub individual_use: bool,
    #[serde(default)]
    pub free_shipping: bool,
    #[serde(default)]
    pub date_modified_gmt: Option<NaiveDateTime>,
}

impl CouponDto {
    pub fn into_record(self, site_id: SiteId) -> Coupon {
        Coupon {
            site_id,
            coupon_id: self.id,
            code: self.code,
            amount: self.amount,
            discount_type: self.discount_type,
            description: self.description,
            date_expires: gmt(self.date_expires_gmt),
            usage_count: self.usage_count,
            usage_limit: self.usage_limit,
            individual_use: self.individual_use,
            free_shipping: self.free_shipping,
            date_modified: gmt(self.date_modified_gmt).unwrap_or_default(),
        }
    }
}
