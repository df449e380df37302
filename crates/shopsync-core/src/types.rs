//! # Domain Types
//!
//! Site scoping and resource identity shared by every record kind.
//!
//! ## Composite Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     (site_id, natural key)                              │
//! │                                                                         │
//! │  SitePlugin   ──►  (7, "WooCommerce")      name is the natural key     │
//! │  Product      ──►  (7, 1042)               remote product id           │
//! │  Coupon       ──►  (7, 88)                 remote coupon id            │
//! │                                                                         │
//! │  The same natural key may exist under several sites; rows are only     │
//! │  ever looked up, updated or deleted together with their site id.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use crate::error::CoreError;

// =============================================================================
// Site Id
// =============================================================================

/// Identifier of the store (tenant) every record and row is partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct SiteId(i64);

impl SiteId {
    /// Wraps a raw site identifier.
    #[inline]
    pub const fn new(id: i64) -> Self {
        SiteId(id)
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SiteId {
    fn from(id: i64) -> Self {
        SiteId(id)
    }
}

impl Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Resource Kind
// =============================================================================

/// The resource collections mirrored into the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    SitePlugin,
    Product,
    Coupon,
}

impl ResourceKind {
    /// All kinds, in the order a full sync runs them.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::SitePlugin,
        ResourceKind::Product,
        ResourceKind::Coupon,
    ];

    /// Stable lowercase name, used in logs and CLI arguments.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::SitePlugin => "site_plugin",
            ResourceKind::Product => "product",
            ResourceKind::Coupon => "coupon",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "site_plugin" | "site_plugins" | "plugin" | "plugins" => Ok(ResourceKind::SitePlugin),
            "product" | "products" => Ok(ResourceKind::Product),
            "coupon" | "coupons" => Ok(ResourceKind::Coupon),
            other => Err(CoreError::UnknownResourceKind(other.to_string())),
        }
    }
}

// =============================================================================
// Site Resource
// =============================================================================

/// A remote record that can be mirrored into the local store.
///
/// Implementors are immutable values; the pair `(site_id(), key())` is the
/// identity a local row is matched by during reconciliation.
pub trait SiteResource: Clone + Debug + Send + Sync + 'static {
    /// Natural key of the record inside its site.
    type Key: Clone + Eq + Hash + Ord + Debug + Display + Serialize + Send + Sync + 'static;

    /// Which collection this record belongs to.
    const KIND: ResourceKind;

    /// Site the record is scoped to.
    fn site_id(&self) -> SiteId;

    /// Natural key of the record.
    fn key(&self) -> Self::Key;
}

// =============================================================================
// Unit Tests
// =============================================================================
