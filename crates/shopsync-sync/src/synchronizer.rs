//! # Synchronizer
//!
//! Generic remote-to-local upsert for one resource kind. Every store is a
//! thin shell around a [`Synchronizer`].
//!
//! ## Synchronization Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    synchronize(site, query, mode)                       │
//! │                                                                         │
//! │  1. Lock      per-site mutex; one sync of this kind per site at a time │
//! │                                                                         │
//! │  2. Fetch     page 1, 2, ... until a short page (or one unpaged call)  │
//! │               any failure ──► emit error, return Err, store untouched  │
//! │                                                                         │
//! │  3. Plan      drop foreign-site records, dedupe keys (last wins)       │
//! │                                                                         │
//! │  4. Write     BEGIN                                                     │
//! │                 upsert each record by (site_id, key)                   │
//! │                 Replace: delete site rows whose key was not fetched    │
//! │               COMMIT   (any failure rolls back the whole pass)         │
//! │                                                                         │
//! │  5. Report    emit synced, return ReconcileSummary                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use shopsync_core::{
    ListQuery, Page, ReconcileMode, ReconcilePlan, ReconcileSummary, SiteId, DEFAULT_MAX_PAGES,
};
use shopsync_db::{Database, LocalTable};

use crate::error::{SyncError, SyncResult};
use crate::events::{NoOpEmitter, SyncEventEmitter};
use crate::remote::ResourceRemote;

// =============================================================================
// Paging
// =============================================================================

/// How a collection is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// One request returns the whole collection.
    Unpaged,

    /// Pages of `page_size` are requested until a short page arrives.
    Paged { page_size: u32, max_pages: u32 },
}

impl Paging {
    pub fn paged(page_size: u32) -> Self {
        Paging::Paged {
            page_size,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

// =============================================================================
// Synchronizer
// =============================================================================

/// Fetches a resource collection and reconciles it into the local store.
pub struct Synchronizer<R, Rem> {
    db: Arc<Database>,
    remote: Rem,
    paging: Paging,
    site_locks: Mutex<HashMap<SiteId, Arc<AsyncMutex<()>>>>,
    emitter: Arc<dyn SyncEventEmitter>,
    _record: PhantomData<fn() -> R>,
}

impl<R, Rem> Synchronizer<R, Rem>
where
    R: LocalTable,
    Rem: ResourceRemote<R>,
{
    pub fn new(db: Arc<Database>, remote: Rem, paging: Paging) -> Self {
        Synchronizer {
            db,
            remote,
            paging,
            site_locks: Mutex::new(HashMap::new()),
            emitter: Arc::new(NoOpEmitter),
            _record: PhantomData,
        }
    }

    /// Sets the event emitter (builder style).
    pub fn with_emitter(mut self, emitter: Arc<dyn SyncEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// Waits until no other sync or reset of `site_id` runs on this
    /// synchronizer.
    async fn lock_site(&self, site_id: SiteId) -> SiteGuard<'_> {
        let lock = self
            .site_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(site_id)
            .or_default()
            .clone();

        SiteGuard {
            locks: &self.site_locks,
            site_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Fetches the complete response for `query`, walking pages when paged.
    ///
    /// Returns the first remote failure; a partial walk is never returned.
    pub async fn fetch_all(&self, site_id: SiteId, query: &ListQuery) -> SyncResult<Vec<R>> {
        let (page_size, max_pages) = match self.paging {
            Paging::Unpaged => return Ok(self.remote.list(site_id, query).await?),
            Paging::Paged {
                page_size,
                max_pages,
            } => (page_size, max_pages),
        };

        let mut records = Vec::new();
        let mut page = Page::first(page_size);

        loop {
            if page.number > max_pages {
                return Err(SyncError::PageLimitExceeded {
                    kind: R::KIND,
                    site_id,
                    max_pages,
                });
            }

            let batch = self.remote.list(site_id, &query.at_page(page)).await?;
            let fetched = batch.len();
            records.extend(batch);

            debug!(kind = %R::KIND, site_id = %site_id, page = page.number, fetched, "Fetched page");

            if fetched < page_size as usize {
                break;
            }
            page = page.next();
        }

        Ok(records)
    }

    /// Fetches `query` for `site_id` and reconciles the response into the
    /// local store as one atomic pass.
    pub async fn synchronize(
        &self,
        site_id: SiteId,
        query: ListQuery,
        mode: ReconcileMode,
    ) -> SyncResult<ReconcileSummary> {
        let _site = self.lock_site(site_id).await;

        let result = self.fetch_and_apply(site_id, &query, mode).await;

        match &result {
            Ok(summary) => {
                info!(kind = %R::KIND, site_id = %site_id, ?mode, %summary, "Synchronized");
                self.emitter.emit_synced(R::KIND, site_id, summary);
            }
            Err(e) => {
                warn!(kind = %R::KIND, site_id = %site_id, error = %e, "Synchronization failed");
                self.emitter
                    .emit_error(R::KIND, site_id, &e.to_string(), e.is_retryable());
            }
        }

        result
    }

    async fn fetch_and_apply(
        &self,
        site_id: SiteId,
        query: &ListQuery,
        mode: ReconcileMode,
    ) -> SyncResult<ReconcileSummary> {
        let records = self.fetch_all(site_id, query).await?;

        let plan = ReconcilePlan::build(site_id, records, mode);
        if plan.skipped_foreign() > 0 {
            warn!(
                kind = %R::KIND,
                site_id = %site_id,
                skipped = plan.skipped_foreign(),
                "Ignored records scoped to another site"
            );
        }

        let mut session = self.db.begin_write().await?;
        let summary = session.apply(&plan).await?;
        session.commit().await?;

        Ok(summary)
    }

    /// Deletes every stored record of this kind for `site_id`.
    pub async fn reset(&self, site_id: SiteId) -> SyncResult<ReconcileSummary> {
        let _site = self.lock_site(site_id).await;

        let mut session = self.db.begin_write().await?;
        let deleted = session.delete_all::<R>(site_id).await?;
        session.commit().await?;

        info!(kind = %R::KIND, site_id = %site_id, deleted, "Reset stored records");
        Ok(ReconcileSummary {
            deleted,
            ..ReconcileSummary::default()
        })
    }
}

/// Exclusive hold on one site's lock. The map entry is removed on release
/// when nobody else holds or waits for it.
struct SiteGuard<'a> {
    locks: &'a Mutex<HashMap<SiteId, Arc<AsyncMutex<()>>>>,
    site_id: SiteId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SiteGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.site_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.site_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use shopsync_core::{Coupon, PluginStatus, SitePlugin};
    use shopsync_db::DbConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `total` coupons in pages and counts requests.
    struct CouponPages {
        total: i64,
        calls: AtomicUsize,
    }

    impl ResourceRemote<Coupon> for CouponPages {
        async fn list(&self, site_id: SiteId, query: &ListQuery) -> Result<Vec<Coupon>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let page = query.page.expect("paged query");
            let start = i64::from((page.number - 1) * page.size);
            let end = (start + i64::from(page.size)).min(self.total);
            Ok((start..end)
                .map(|id| Coupon::new(site_id, id, format!("CODE{id}")))
                .collect())
        }
    }

    struct Failing;

    impl ResourceRemote<SitePlugin> for Failing {
        async fn list(&self, _: SiteId, _: &ListQuery) -> Result<Vec<SitePlugin>, RemoteError> {
            Err(RemoteError::Http {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    async fn test_db() -> Arc<Database> {
        Arc::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_page_walk_stops_at_short_page() {
        let remote = CouponPages {
            total: 7,
            calls: AtomicUsize::new(0),
        };
        let sync: Synchronizer<Coupon, _> = Synchronizer::new(
            test_db().await,
            remote,
            Paging::Paged {
                page_size: 3,
                max_pages: 10,
            },
        );

        let coupons = sync.fetch_all(SiteId::new(1), &ListQuery::unpaged()).await.unwrap();
        assert_eq!(coupons.len(), 7);
        assert_eq!(sync.remote.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_trailing_empty_page() {
        let remote = CouponPages {
            total: 6,
            calls: AtomicUsize::new(0),
        };
        let sync: Synchronizer<Coupon, _> = Synchronizer::new(
            test_db().await,
            remote,
            Paging::Paged {
                page_size: 3,
                max_pages: 10,
            },
        );

        let coupons = sync.fetch_all(SiteId::new(1), &ListQuery::unpaged()).await.unwrap();
        assert_eq!(coupons.len(), 6);
        assert_eq!(sync.remote.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_page_cap() {
        let remote = CouponPages {
            total: 100,
            calls: AtomicUsize::new(0),
        };
        let sync: Synchronizer<Coupon, _> = Synchronizer::new(
            test_db().await,
            remote,
            Paging::Paged {
                page_size: 10,
                max_pages: 2,
            },
        );

        let err = sync
            .synchronize(SiteId::new(1), ListQuery::unpaged(), ReconcileMode::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::PageLimitExceeded { max_pages: 2, .. }));
        assert_eq!(sync.database().coupons().count(SiteId::new(1)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_store_untouched() {
        let db = test_db().await;
        let site = SiteId::new(7);

        let mut session = db.begin_write().await.unwrap();
        session
            .insert(&SitePlugin::new(site, "a/a.php", "A", PluginStatus::Active))
            .await
            .unwrap();
        session.commit().await.unwrap();

        let sync: Synchronizer<SitePlugin, _> = Synchronizer::new(db.clone(), Failing, Paging::Unpaged);
        let err = sync
            .synchronize(site, ListQuery::unpaged(), ReconcileMode::Replace)
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(db.site_plugins().count(site).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reset_counts_deleted_rows() {
        let remote = CouponPages {
            total: 4,
            calls: AtomicUsize::new(0),
        };
        let sync: Synchronizer<Coupon, _> = Synchronizer::new(test_db().await, remote, Paging::paged(25));
        let site = SiteId::new(2);

        let summary = sync
            .synchronize(site, ListQuery::unpaged(), ReconcileMode::Replace)
            .await
            .unwrap();
        assert_eq!(summary.inserted, 4);

        let summary = sync.reset(site).await.unwrap();
        assert_eq!(summary.deleted, 4);
        assert_eq!(sync.database().coupons().count(site).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_site_locks_are_released() {
        let remote = CouponPages {
            total: 2,
            calls: AtomicUsize::new(0),
        };
        let sync: Synchronizer<Coupon, _> = Synchronizer::new(test_db().await, remote, Paging::paged(25));

        for site in [1, 2, 3] {
            sync.synchronize(SiteId::new(site), ListQuery::unpaged(), ReconcileMode::Replace)
                .await
                .unwrap();
        }
        sync.reset(SiteId::new(1)).await.unwrap();

        assert!(sync.site_locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_held_site_lock_is_kept_for_waiters() {
        let sync: Synchronizer<SitePlugin, _> = Synchronizer::new(test_db().await, Failing, Paging::Unpaged);
        let site = SiteId::new(4);

        let first = sync.lock_site(site).await;
        let waiter = sync.site_locks.lock().unwrap()[&site].clone();
        drop(first);

        assert_eq!(sync.site_locks.lock().unwrap().len(), 1);
        drop(waiter);
        drop(sync.lock_site(site).await);
        assert!(sync.site_locks.lock().unwrap().is_empty());
    }
}
