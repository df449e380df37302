//! # Coupon Store
//!
//! Mirrors the coupons of a site, walking every page of the collection.

use std::sync::Arc;

use shopsync_core::{Coupon, ListQuery, ReconcileMode, ReconcileSummary, ResourceKind, SiteId};
use shopsync_db::Database;

use crate::callback::{CallbackQueue, Completion};
use crate::dispatcher::{unsupported_action, Action, ActionProcessor, CouponAction};
use crate::error::SyncResult;
use crate::remote::{HttpRemote, ResourceRemote};
use crate::synchronizer::{Paging, Synchronizer};

/// Sync component for coupons.
pub struct CouponStore<Rem = HttpRemote> {
    sync: Arc<Synchronizer<Coupon, Rem>>,
    callbacks: CallbackQueue,
}

impl<Rem> Clone for CouponStore<Rem> {
    fn clone(&self) -> Self {
        CouponStore {
            sync: self.sync.clone(),
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<Rem: ResourceRemote<Coupon>> CouponStore<Rem> {
    pub fn new(db: Arc<Database>, remote: Rem, paging: Paging, callbacks: CallbackQueue) -> Self {
        Self::with_synchronizer(Synchronizer::new(db, remote, paging), callbacks)
    }

    pub fn with_synchronizer(sync: Synchronizer<Coupon, Rem>, callbacks: CallbackQueue) -> Self {
        CouponStore {
            sync: Arc::new(sync),
            callbacks,
        }
    }

    /// Replaces the stored coupons of `site_id` with the complete remote
    /// collection.
    pub async fn synchronize_coupons(&self, site_id: SiteId) -> SyncResult<ReconcileSummary> {
        self.sync
            .synchronize(site_id, ListQuery::default(), ReconcileMode::Replace)
            .await
    }

    /// Stored coupons of `site_id`, ordered by code.
    pub async fn stored_coupons(&self, site_id: SiteId) -> SyncResult<Vec<Coupon>> {
        Ok(self.sync.database().coupons().list(site_id).await?)
    }
}

impl<Rem: ResourceRemote<Coupon>> ActionProcessor for CouponStore<Rem> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Coupon
    }

    fn on_action(&self, action: Action) {
        match action {
            Action::Coupon(CouponAction::SynchronizeCoupons {
                site_id,
                on_completion,
            }) => {
                let store = self.clone();
                tokio::spawn(async move {
                    let result = store.synchronize_coupons(site_id).await;
                    store.deliver(on_completion, result);
                });
            }
            other => unsupported_action(self.kind(), &other),
        }
    }
}

impl<Rem> CouponStore<Rem> {
    fn deliver(&self, on_completion: Completion, result: SyncResult<ReconcileSummary>) {
        self.callbacks.deliver(on_completion, result);
    }
}
