//! # Products
//!
//! Catalog products as served by the store's REST API. Prices stay decimal
//! strings exactly as the remote formats them; the cache does no arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{ResourceKind, SiteId, SiteResource};

// =============================================================================
// Product Type
// =============================================================================

/// The product type, which drives what a product form can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Simple,
    Grouped,
    /// Affiliate product linking to another shop.
    External,
    Variable,
    /// Extension-defined types (subscriptions, bundles, ...). The raw type
    /// name is not kept; every such product is cached as `custom`.
    #[serde(other)]
    Custom,
}

impl ProductType {
    /// Raw value the remote filters on.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductType::Simple => "simple",
            ProductType::Grouped => "grouped",
            ProductType::External => "external",
            ProductType::Variable => "variable",
            ProductType::Custom => "custom",
        }
    }
}

impl FromStr for ProductType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(ProductType::Simple),
            "grouped" => Ok(ProductType::Grouped),
            "external" => Ok(ProductType::External),
            "variable" => Ok(ProductType::Variable),
            other => Err(CoreError::UnknownValue {
                field: "product type",
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Product Status
// =============================================================================

/// Publication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    #[serde(other)]
    Other,
}

impl ProductStatus {
    /// Raw value the remote filters on.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Publish => "publish",
            ProductStatus::Draft => "draft",
            ProductStatus::Pending => "pending",
            ProductStatus::Private => "private",
            ProductStatus::Other => "other",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "publish" | "published" => Ok(ProductStatus::Publish),
            "draft" => Ok(ProductStatus::Draft),
            "pending" => Ok(ProductStatus::Pending),
            "private" => Ok(ProductStatus::Private),
            other => Err(CoreError::UnknownValue {
                field: "product status",
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Stock Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
    /// Extension-defined statuses (`preorder`, ...). Never sent as a filter.
    #[serde(other)]
    Other,
}

impl StockStatus {
    /// Raw value the remote filters on.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "instock",
            StockStatus::OutOfStock => "outofstock",
            StockStatus::OnBackorder => "onbackorder",
            StockStatus::Other => "other",
        }
    }
}

impl FromStr for StockStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "instock" => Ok(StockStatus::InStock),
            "outofstock" => Ok(StockStatus::OutOfStock),
            "onbackorder" => Ok(StockStatus::OnBackorder),
            other => Err(CoreError::UnknownValue {
                field: "stock status",
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub site_id: SiteId,

    /// Remote product id; the natural key.
    pub product_id: i64,

    pub name: String,
    pub slug: String,
    pub permalink: String,
    pub product_type: ProductType,
    pub status: ProductStatus,
    pub sku: Option<String>,

    /// Current price as a decimal string (empty when unset).
    pub price: String,
    pub regular_price: Option<String>,
    pub sale_price: Option<String>,

    pub stock_status: StockStatus,
    pub manage_stock: bool,
    pub stock_quantity: Option<i64>,

    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl Product {
    /// Creates a published simple product with the given id and name.
    pub fn new(site_id: SiteId, product_id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Product {
            site_id,
            product_id,
            name: name.into(),
            slug: String::new(),
            permalink: String::new(),
            product_type: ProductType::default(),
            status: ProductStatus::default(),
            sku: None,
            price: String::new(),
            regular_price: None,
            sale_price: None,
            stock_status: StockStatus::default(),
            manage_stock: false,
            stock_quantity: None,
            date_created: now,
            date_modified: now,
        }
    }

    /// Returns true when a non-empty sale price is set.
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl SiteResource for Product {
    type Key = i64;

    const KIND: ResourceKind = ResourceKind::Product;

    fn site_id(&self) -> SiteId {
        self.site_id
    }

    fn key(&self) -> i64 {
        self.product_id
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values_match_wire_format() {
        assert_eq!(StockStatus::InStock.as_str(), "instock");
        assert_eq!(
            serde_json::to_string(&StockStatus::OnBackorder).unwrap(),
            "\"onbackorder\""
        );
        assert_eq!(ProductStatus::Draft.as_str(), "draft");
        assert_eq!(ProductType::Variable.as_str(), "variable");
    }

    #[test]
    fn test_filter_values_parse() {
        assert_eq!("out_of_stock".parse::<StockStatus>().unwrap(), StockStatus::OutOfStock);
        assert_eq!("onbackorder".parse::<StockStatus>().unwrap(), StockStatus::OnBackorder);
        assert_eq!("Draft".parse::<ProductStatus>().unwrap(), ProductStatus::Draft);
        assert_eq!("variable".parse::<ProductType>().unwrap(), ProductType::Variable);

        let err = "custom".parse::<ProductType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown product type: custom");
    }

    #[test]
    fn test_unknown_product_type_is_custom() {
        let kind: ProductType = serde_json::from_str("\"subscription\"").unwrap();
        assert_eq!(kind, ProductType::Custom);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"custom\"");
    }

    #[test]
    fn test_unknown_stock_status_is_other() {
        let status: StockStatus = serde_json::from_str("\"preorder\"").unwrap();
        assert_eq!(status, StockStatus::Other);
        assert_eq!(status.as_str(), "other");
        assert!("preorder".parse::<StockStatus>().is_err());
    }

    #[test]
    fn test_is_on_sale() {
        let mut product = Product::new(SiteId::new(1), 10, "Hoodie");
        assert!(!product.is_on_sale());

        product.sale_price = Some(String::new());
        assert!(!product.is_on_sale());

        product.sale_price = Some("15.00".to_string());
        assert!(product.is_on_sale());
    }
}
