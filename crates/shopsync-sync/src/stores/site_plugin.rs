//! # Site Plugin Store
//!
//! Mirrors the plugin listing of a site. The listing is unpaginated and
//! always complete, so every sync replaces the site's stored plugins.

use std::sync::Arc;

use shopsync_core::{ListQuery, ReconcileMode, ReconcileSummary, ResourceKind, SiteId, SitePlugin};
use shopsync_db::Database;

use crate::callback::{CallbackQueue, Completion};
use crate::dispatcher::{unsupported_action, Action, ActionProcessor, SitePluginAction};
use crate::error::SyncResult;
use crate::remote::{HttpRemote, ResourceRemote};
use crate::synchronizer::{Paging, Synchronizer};

/// Sync component for site plugins.
pub struct SitePluginStore<Rem = HttpRemote> {
    sync: Arc<Synchronizer<SitePlugin, Rem>>,
    callbacks: CallbackQueue,
}

impl<Rem> Clone for SitePluginStore<Rem> {
    fn clone(&self) -> Self {
        SitePluginStore {
            sync: self.sync.clone(),
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<Rem: ResourceRemote<SitePlugin>> SitePluginStore<Rem> {
    pub fn new(db: Arc<Database>, remote: Rem, callbacks: CallbackQueue) -> Self {
        Self::with_synchronizer(Synchronizer::new(db, remote, Paging::Unpaged), callbacks)
    }

    pub fn with_synchronizer(sync: Synchronizer<SitePlugin, Rem>, callbacks: CallbackQueue) -> Self {
        SitePluginStore {
            sync: Arc::new(sync),
            callbacks,
        }
    }

    /// Replaces the stored plugins of `site_id` with the remote listing.
    pub async fn synchronize_site_plugins(&self, site_id: SiteId) -> SyncResult<ReconcileSummary> {
        self.sync
            .synchronize(site_id, ListQuery::unpaged(), ReconcileMode::Replace)
            .await
    }

    /// Stored plugins of `site_id`, ordered by name.
    pub async fn stored_plugins(&self, site_id: SiteId) -> SyncResult<Vec<SitePlugin>> {
        Ok(self.sync.database().site_plugins().list(site_id).await?)
    }

    fn spawn_synchronize(&self, site_id: SiteId, on_completion: Completion) {
        let store = self.clone();
        tokio::spawn(async move {
            let result = store.synchronize_site_plugins(site_id).await;
            store.callbacks.deliver(on_completion, result);
        });
    }
}

impl<Rem: ResourceRemote<SitePlugin>> ActionProcessor for SitePluginStore<Rem> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::SitePlugin
    }

    fn on_action(&self, action: Action) {
        match action {
            Action::SitePlugin(SitePluginAction::SynchronizeSitePlugins {
                site_id,
                on_completion,
            }) => self.spawn_synchronize(site_id, on_completion),
            other => unsupported_action(self.kind(), &other),
        }
    }
}
