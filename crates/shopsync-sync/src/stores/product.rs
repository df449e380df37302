//! # Product Store
//!
//! Mirrors the product catalog of a site.
//!
//! ## Reconciliation Mode
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  filter empty      ──►  Replace   every page is the complete catalog;  │
//! │                                   products missing from it are deleted │
//! │                                                                         │
//! │  filter set        ──►  Merge     the response is a partial view;      │
//! │  (stock, status,                  matching products are upserted and   │
//! │   type)                           nothing is deleted                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use shopsync_core::{
    ListQuery, Product, ProductFilter, ProductSortOrder, ReconcileMode, ReconcileSummary,
    ResourceKind, SiteId,
};
use shopsync_db::Database;

use crate::callback::{CallbackQueue, Completion};
use crate::dispatcher::{unsupported_action, Action, ActionProcessor, ProductAction};
use crate::error::SyncResult;
use crate::remote::{HttpRemote, ResourceRemote};
use crate::synchronizer::{Paging, Synchronizer};

/// Builds the remote query of a product sync.
pub fn product_query(filter: &ProductFilter, sort_order: ProductSortOrder) -> ListQuery {
    ListQuery::default()
        .with_params(sort_order.params())
        .with_params(filter.params())
}

/// Reconciliation mode of a product sync.
pub fn product_mode(filter: &ProductFilter) -> ReconcileMode {
    if filter.is_empty() {
        ReconcileMode::Replace
    } else {
        ReconcileMode::Merge
    }
}

/// Sync component for products.
pub struct ProductStore<Rem = HttpRemote> {
    sync: Arc<Synchronizer<Product, Rem>>,
    callbacks: CallbackQueue,
}

impl<Rem> Clone for ProductStore<Rem> {
    fn clone(&self) -> Self {
        ProductStore {
            sync: self.sync.clone(),
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<Rem: ResourceRemote<Product>> ProductStore<Rem> {
    pub fn new(db: Arc<Database>, remote: Rem, paging: Paging, callbacks: CallbackQueue) -> Self {
        Self::with_synchronizer(Synchronizer::new(db, remote, paging), callbacks)
    }

    pub fn with_synchronizer(sync: Synchronizer<Product, Rem>, callbacks: CallbackQueue) -> Self {
        ProductStore {
            sync: Arc::new(sync),
            callbacks,
        }
    }

    /// Fetches every page of products matching `filter` and reconciles them.
    pub async fn synchronize_products(
        &self,
        site_id: SiteId,
        filter: ProductFilter,
        sort_order: ProductSortOrder,
    ) -> SyncResult<ReconcileSummary> {
        self.sync
            .synchronize(site_id, product_query(&filter, sort_order), product_mode(&filter))
            .await
    }

    /// Deletes every stored product of `site_id`.
    pub async fn reset_stored_products(&self, site_id: SiteId) -> SyncResult<ReconcileSummary> {
        self.sync.reset(site_id).await
    }

    /// Stored products of `site_id`, ordered by name.
    pub async fn stored_products(&self, site_id: SiteId) -> SyncResult<Vec<Product>> {
        Ok(self.sync.database().products().list(site_id).await?)
    }

    fn run(&self, on_completion: Completion, work: ProductWork) {
        let store = self.clone();
        tokio::spawn(async move {
            let result = match work {
                ProductWork::Synchronize {
                    site_id,
                    filter,
                    sort_order,
                } => store.synchronize_products(site_id, filter, sort_order).await,
                ProductWork::Reset { site_id } => store.reset_stored_products(site_id).await,
            };
            store.callbacks.deliver(on_completion, result);
        });
    }
}

/// A product action with its completion split off.
enum ProductWork {
    Synchronize {
        site_id: SiteId,
        filter: ProductFilter,
        sort_order: ProductSortOrder,
    },
    Reset {
        site_id: SiteId,
    },
}

impl<Rem: ResourceRemote<Product>> ActionProcessor for ProductStore<Rem> {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Product
    }

    fn on_action(&self, action: Action) {
        match action {
            Action::Product(ProductAction::SynchronizeProducts {
                site_id,
                filter,
                sort_order,
                on_completion,
            }) => self.run(
                on_completion,
                ProductWork::Synchronize {
                    site_id,
                    filter,
                    sort_order,
                },
            ),
            Action::Product(ProductAction::ResetStoredProducts {
                site_id,
                on_completion,
            }) => self.run(on_completion, ProductWork::Reset { site_id }),
            other => unsupported_action(self.kind(), &other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::{ProductStatus, StockStatus};

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn test_unfiltered_query_replaces() {
        let filter = ProductFilter::default();
        let query = product_query(&filter, ProductSortOrder::NameAscending);

        assert_eq!(query.page, None);
        assert_eq!(query.params, vec![pair("orderby", "title"), pair("order", "asc")]);
        assert_eq!(product_mode(&filter), ReconcileMode::Replace);
    }

    #[test]
    fn test_filtered_query_merges() {
        let filter = ProductFilter {
            stock_status: Some(StockStatus::OutOfStock),
            product_status: Some(ProductStatus::Draft),
            product_type: None,
        };
        let query = product_query(&filter, ProductSortOrder::DateDescending);

        assert_eq!(
            query.params,
            vec![
                pair("orderby", "date"),
                pair("order", "desc"),
                pair("stock_status", "outofstock"),
                pair("status", "draft"),
            ]
        );
        assert_eq!(product_mode(&filter), ReconcileMode::Merge);
    }
}
