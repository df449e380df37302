//! # Remote List Queries
//!
//! What a sync component asks the remote for: an optional page plus extra
//! key/value parameters (filters, sort order).
//!
//! ## Product Parameters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductSortOrder     orderby   order      ProductFilter   parameter   │
//! │  ──────────────────   ───────   ─────      ─────────────   ─────────   │
//! │  NameAscending        title     asc        stock_status    stock_status│
//! │  NameDescending       title     desc       product_status  status      │
//! │  DateAscending        date      asc        product_type    type        │
//! │  DateDescending       date      desc                                   │
//! │                                                                         │
//! │  Unset filters send no parameter at all.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::product::{ProductStatus, ProductType, StockStatus};
use crate::FIRST_PAGE_NUMBER;

// =============================================================================
// Page
// =============================================================================

/// One page of a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub const fn first(size: u32) -> Self {
        Page {
            number: FIRST_PAGE_NUMBER,
            size,
        }
    }

    pub const fn next(&self) -> Self {
        Page {
            number: self.number + 1,
            size: self.size,
        }
    }
}

// =============================================================================
// List Query
// =============================================================================

/// Parameters of one remote list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<Page>,
    pub params: Vec<(String, String)>,
}

impl ListQuery {
    /// Query for an unpaginated collection.
    pub fn unpaged() -> Self {
        ListQuery::default()
    }

    /// Query for one page.
    pub fn paged(page: Page) -> Self {
        ListQuery {
            page: Some(page),
            params: Vec::new(),
        }
    }

    /// Appends a parameter (builder style).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Appends several parameters (builder style).
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    /// Returns the same query pointed at another page.
    pub fn at_page(&self, page: Page) -> Self {
        ListQuery {
            page: Some(page),
            params: self.params.clone(),
        }
    }

    /// Flattens the query into URL query pairs, paging first.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.params.len() + 2);
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.number.to_string()));
            pairs.push(("per_page".to_string(), page.size.to_string()));
        }
        pairs.extend(self.params.iter().cloned());
        pairs
    }
}

// =============================================================================
// Product Filter
// =============================================================================

/// Optional server-side filters for a product sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub stock_status: Option<StockStatus>,
    pub product_status: Option<ProductStatus>,
    pub product_type: Option<ProductType>,
}

impl ProductFilter {
    /// Returns true when no filter is set, i.e. the response is the
    /// complete collection.
    pub fn is_empty(&self) -> bool {
        self.stock_status.is_none() && self.product_status.is_none() && self.product_type.is_none()
    }

    /// Remote parameters for the set filters.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(stock) = self.stock_status {
            params.push(("stock_status".to_string(), stock.as_str().to_string()));
        }
        if let Some(status) = self.product_status {
            params.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(kind) = self.product_type {
            params.push(("type".to_string(), kind.as_str().to_string()));
        }
        params
    }
}

// =============================================================================
// Product Sort Order
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortOrder {
    #[default]
    NameAscending,
    NameDescending,
    DateAscending,
    DateDescending,
}

impl ProductSortOrder {
    /// Value of the `orderby` parameter.
    pub const fn order_by(&self) -> &'static str {
        match self {
            ProductSortOrder::NameAscending | ProductSortOrder::NameDescending => "title",
            ProductSortOrder::DateAscending | ProductSortOrder::DateDescending => "date",
        }
    }

    /// Value of the `order` parameter.
    pub const fn order(&self) -> &'static str {
        match self {
            ProductSortOrder::NameAscending | ProductSortOrder::DateAscending => "asc",
            ProductSortOrder::NameDescending | ProductSortOrder::DateDescending => "desc",
        }
    }

    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            ("orderby".to_string(), self.order_by().to_string()),
            ("order".to_string(), self.order().to_string()),
        ]
    }
}

impl fmt::Display for ProductSortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProductSortOrder::NameAscending => "name_asc",
            ProductSortOrder::NameDescending => "name_desc",
            ProductSortOrder::DateAscending => "date_asc",
            ProductSortOrder::DateDescending => "date_desc",
        };
        f.write_str(name)
    }
}

impl FromStr for ProductSortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name_asc" | "name" => Ok(ProductSortOrder::NameAscending),
            "name_desc" => Ok(ProductSortOrder::NameDescending),
            "date_asc" => Ok(ProductSortOrder::DateAscending),
            "date_desc" | "date" => Ok(ProductSortOrder::DateDescending),
            other => Err(CoreError::UnknownSortOrder(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_sort_order_params() {
        assert_eq!(
            ProductSortOrder::NameAscending.params(),
            vec![pair("orderby", "title"), pair("order", "asc")]
        );
        assert_eq!(
            ProductSortOrder::NameDescending.params(),
            vec![pair("orderby", "title"), pair("order", "desc")]
        );
        assert_eq!(
            ProductSortOrder::DateAscending.params(),
            vec![pair("orderby", "date"), pair("order", "asc")]
        );
        assert_eq!(
            ProductSortOrder::DateDescending.params(),
            vec![pair("orderby", "date"), pair("order", "desc")]
        );
    }

    #[test]
    fn test_empty_filter_sends_nothing() {
        let filter = ProductFilter::default();
        assert!(filter.is_empty());
        assert!(filter.params().is_empty());
    }

    #[test]
    fn test_filter_params_use_raw_values() {
        let filter = ProductFilter {
            stock_status: Some(StockStatus::InStock),
            product_status: None,
            product_type: Some(ProductType::Variable),
        };
        assert!(!filter.is_empty());
        assert_eq!(
            filter.params(),
            vec![pair("stock_status", "instock"), pair("type", "variable")]
        );

        let filter = ProductFilter {
            product_status: Some(ProductStatus::Draft),
            ..Default::default()
        };
        assert_eq!(filter.params(), vec![pair("status", "draft")]);
    }

    #[test]
    fn test_query_pairs_put_paging_first() {
        let query = ListQuery::paged(Page::first(25)).with_param("orderby", "title");
        assert_eq!(
            query.to_pairs(),
            vec![pair("page", "1"), pair("per_page", "25"), pair("orderby", "title")]
        );

        let next = query.at_page(Page::first(25).next());
        assert_eq!(next.to_pairs()[0], pair("page", "2"));
        assert_eq!(next.params, query.params);
    }

    #[test]
    fn test_unpaged_query_has_no_paging_pairs() {
        assert!(ListQuery::unpaged().to_pairs().is_empty());
    }
}
