//! # shopsync-db: Local Store for shopsync
//!
//! The persisted read cache the sync stores reconcile into. SQLite via sqlx,
//! one table per resource kind, every row scoped by site.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        shopsync Data Flow                               │
//! │                                                                         │
//! │  shopsync-sync (ProductStore::synchronize)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopsync-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ WriteSession  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │───►│ (session.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │ one tx/sync   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │    └───────────────┘    └──────────────┘  │   │
//! │  │   │ WAL mode      │    ┌───────────────┐                      │   │
//! │  │   │               │───►│ Repositories  │ ◄── view models, CLI │   │
//! │  │   └───────────────┘    │ (read-only)   │                      │   │
//! │  │                        └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`session`] - Write sessions (find / insert / update / delete / commit)
//! - [`table`] - Record-to-table mapping shared by sessions and repositories
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Read repositories (plugins, products, coupons)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopsync_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("shopsync.db")).await?;
//!
//! let mut session = db.begin_write().await?;
//! let summary = session.apply(&plan).await?;
//! session.commit().await?;
//!
//! let products = db.products().list(site).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;
pub mod table;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use session::WriteSession;
pub use table::{KeyValue, LocalTable};

// Repository re-exports for convenience
pub use repository::{CouponRepository, ProductRepository, SitePluginRepository};
