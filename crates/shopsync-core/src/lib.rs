//! # shopsync-core: Pure Domain Types for shopsync
//!
//! Resource records mirrored from a store's REST API, the natural keys that
//! identify them inside a site, and the pure reconciliation planning that
//! decides what a sync must write.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        shopsync Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 shopsync-sync (stores, dispatcher)              │   │
//! │  │    SitePluginStore, ProductStore, CouponStore, Dispatcher       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ shopsync-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  records  │  │   query   │  │ reconcile │  │   │
//! │  │   │  SiteId   │  │ SitePlugin│  │ ListQuery │  │   Plan    │  │   │
//! │  │   │  Resource │  │  Product  │  │  Filter   │  │  Summary  │  │   │
//! │  │   └───────────┘  │  Coupon   │  └───────────┘  └───────────┘  │   │
//! │  │                  └───────────┘                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopsync-db (Local Store)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Site scoping, resource kinds, the [`SiteResource`] trait
//! - [`plugin`], [`product`], [`coupon`] - Resource records
//! - [`query`] - Remote list queries, product filters and sort orders
//! - [`reconcile`] - Pure planning of an upsert + stale-delete pass
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shopsync_core::reconcile::{ReconcileMode, ReconcilePlan};
//! use shopsync_core::{PluginStatus, SiteId, SitePlugin};
//!
//! let site = SiteId::new(7);
//! let plugin = SitePlugin::new(site, "woocommerce/woocommerce.php", "WooCommerce", PluginStatus::Active);
//!
//! let plan = ReconcilePlan::build(site, vec![plugin], ReconcileMode::Replace);
//! assert_eq!(plan.keys(), &["WooCommerce".to_string()]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon;
pub mod error;
pub mod plugin;
pub mod product;
pub mod query;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use coupon::{Coupon, DiscountType};
pub use error::{CoreError, ValidationError};
pub use plugin::{PluginStatus, SitePlugin};
pub use product::{Product, ProductStatus, ProductType, StockStatus};
pub use query::{ListQuery, Page, ProductFilter, ProductSortOrder};
pub use reconcile::{ReconcileMode, ReconcilePlan, ReconcileSummary};
pub use types::{ResourceKind, SiteId, SiteResource};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// First page number of every paginated remote collection.
pub const FIRST_PAGE_NUMBER: u32 = 1;

/// Default page size for paginated collections.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Largest `per_page` the REST API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default cap on pages walked by a single synchronization.
pub const DEFAULT_MAX_PAGES: u32 = 200;
