//! # Write Session
//!
//! The unit of work a sync component reconciles through. Everything written
//! through one session lands in one SQLite transaction.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.begin_write()                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find_row_id / insert / update / delete_stale / delete_all             │
//! │       │             (all scoped by site_id)                             │
//! │       ├──────────────► commit()   changes become visible at once        │
//! │       │                                                                 │
//! │       └──────────────► drop / rollback()   nothing is written           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use uuid::Uuid;

use shopsync_core::{ReconcilePlan, ReconcileSummary, SiteId, SiteResource};

use crate::error::{DbError, DbResult};
use crate::table::{KeyValue, LocalTable};

/// One open write transaction.
pub struct WriteSession {
    tx: Transaction<'static, Sqlite>,
    now: DateTime<Utc>,
    // Released after `tx` is committed, rolled back or dropped.
    _writer: OwnedMutexGuard<()>,
}

impl WriteSession {
    pub(crate) async fn begin(pool: &SqlitePool, writer: OwnedMutexGuard<()>) -> DbResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(WriteSession {
            tx,
            now: Utc::now(),
            _writer: writer,
        })
    }

    /// Looks up the local id of the row for `(site_id, key)`.
    pub async fn find_row_id<T: LocalTable>(
        &mut self,
        site_id: SiteId,
        key: &T::Key,
    ) -> DbResult<Option<String>> {
        let sql = format!(
            "SELECT id FROM {} WHERE site_id = ?1 AND {} = ?2",
            T::TABLE,
            T::KEY_COLUMN
        );

        let query = sqlx::query_scalar::<_, String>(&sql).bind(site_id);
        let query = match T::key_value(key) {
            KeyValue::Text(value) => query.bind(value),
            KeyValue::Integer(value) => query.bind(value),
        };

        Ok(query.fetch_optional(&mut *self.tx).await?)
    }

    /// Inserts a new row for `record` and returns its local id.
    pub async fn insert<T: LocalTable>(&mut self, record: &T) -> DbResult<String> {
        let row_id = Uuid::new_v4().to_string();

        record
            .insert_query(&row_id, self.now)
            .execute(&mut *self.tx)
            .await?;

        debug!(table = T::TABLE, site_id = %record.site_id(), key = %record.key(), "Inserted row");
        Ok(row_id)
    }

    /// Overwrites the record columns of an existing row.
    pub async fn update<T: LocalTable>(&mut self, row_id: &str, record: &T) -> DbResult<()> {
        let result = record
            .update_query(row_id, self.now)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(T::TABLE, row_id));
        }

        debug!(table = T::TABLE, site_id = %record.site_id(), key = %record.key(), "Updated row");
        Ok(())
    }

    /// Deletes every row of `site_id` whose key is not in `keys`.
    ///
    /// The key set is bound as one JSON array; an empty set deletes every
    /// row of the site.
    pub async fn delete_stale<T: LocalTable>(
        &mut self,
        site_id: SiteId,
        keys: &[T::Key],
    ) -> DbResult<u64> {
        let keys_json = serde_json::to_string(keys)?;
        let sql = format!(
            "DELETE FROM {} WHERE site_id = ?1 AND {} NOT IN (SELECT value FROM json_each(?2))",
            T::TABLE,
            T::KEY_COLUMN
        );

        let result = sqlx::query(&sql)
            .bind(site_id)
            .bind(keys_json)
            .execute(&mut *self.tx)
            .await?;

        debug!(
            table = T::TABLE,
            site_id = %site_id,
            kept = keys.len(),
            deleted = result.rows_affected(),
            "Deleted stale rows"
        );
        Ok(result.rows_affected())
    }

    /// Deletes every row of `site_id`.
    pub async fn delete_all<T: LocalTable>(&mut self, site_id: SiteId) -> DbResult<u64> {
        let sql = format!("DELETE FROM {} WHERE site_id = ?1", T::TABLE);

        let result = sqlx::query(&sql)
            .bind(site_id)
            .execute(&mut *self.tx)
            .await?;

        debug!(table = T::TABLE, site_id = %site_id, deleted = result.rows_affected(), "Deleted all rows");
        Ok(result.rows_affected())
    }

    /// Applies a reconciliation plan: upsert every record, then delete stale
    /// rows when the plan's mode asks for it.
    pub async fn apply<T: LocalTable>(&mut self, plan: &ReconcilePlan<T>) -> DbResult<ReconcileSummary> {
        let site_id = plan.site_id();
        let mut summary = ReconcileSummary::default();

        for record in plan.records() {
            let key = record.key();
            match self.find_row_id::<T>(site_id, &key).await? {
                Some(row_id) => {
                    self.update(&row_id, record).await?;
                    summary.updated += 1;
                }
                None => {
                    self.insert(record).await?;
                    summary.inserted += 1;
                }
            }
        }

        if plan.mode().deletes_stale() {
            summary.deleted = self.delete_stale::<T>(site_id, plan.keys()).await?;
        }

        Ok(summary)
    }

    /// Commits every change made through this session.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Discards every change made through this session.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
