//! # Local Tables
//!
//! Maps each resource record onto its cache table. The write session and the
//! read repositories are generic over [`LocalTable`]; only the column lists
//! differ per kind.
//!
//! ## Row Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  id (UUID)  │ site_id │ <natural key> │ record columns... │ created_at │
//! │             │         │               │                   │ updated_at │
//! │                                                                         │
//! │  UNIQUE(site_id, <natural key>)                                        │
//! │  id and created_at are written once; updates rewrite record columns   │
//! │  and updated_at only.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite};

use shopsync_core::SiteResource;

/// A prepared statement with its bound arguments.
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A natural key in bindable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue {
    Text(String),
    Integer(i64),
}

/// A resource record with a cache table.
pub trait LocalTable: SiteResource + for<'r> FromRow<'r, SqliteRow> + Unpin {
    /// Table name.
    const TABLE: &'static str;

    /// Column holding the natural key.
    const KEY_COLUMN: &'static str;

    /// `ORDER BY` clause used by repository listings.
    const ORDER_BY: &'static str;

    /// Converts a natural key into its bindable form.
    fn key_value(key: &Self::Key) -> KeyValue;

    /// `INSERT` of a new row with the given local id.
    fn insert_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q>;

    /// `UPDATE` of the row with the given local id.
    fn update_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q>;
}
