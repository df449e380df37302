//! # Stores
//!
//! One sync component per resource kind, each registered with the
//! [`Dispatcher`] for its action kind.
//!
//! | Store              | Action kind   | Paging   | Mode                  |
//! |--------------------|---------------|----------|-----------------------|
//! | `SitePluginStore`  | `site_plugin` | unpaged  | replace               |
//! | `ProductStore`     | `product`     | paged    | replace, merge if     |
//! |                    |               |          | filtered              |
//! | `CouponStore`      | `coupon`      | paged    | replace               |

mod coupon;
mod product;
mod site_plugin;

pub use coupon::CouponStore;
pub use product::{product_mode, product_query, ProductStore};
pub use site_plugin::SitePluginStore;

use std::sync::Arc;

use shopsync_core::{Coupon, Product, SitePlugin};
use shopsync_db::Database;

use crate::callback::CallbackQueue;
use crate::dispatcher::Dispatcher;
use crate::error::SyncResult;
use crate::events::SyncEventEmitter;
use crate::remote::{HttpRemote, ResourceRemote};
use crate::synchronizer::{Paging, Synchronizer};

/// Every store, built over one shared database and remote.
pub struct StoreSet<Rem = HttpRemote> {
    pub site_plugins: SitePluginStore<Rem>,
    pub products: ProductStore<Rem>,
    pub coupons: CouponStore<Rem>,
}

impl<Rem> StoreSet<Rem>
where
    Rem: ResourceRemote<SitePlugin> + ResourceRemote<Product> + ResourceRemote<Coupon> + Clone,
{
    /// Builds the stores. `paging` applies to the paginated kinds.
    pub fn new(
        db: Arc<Database>,
        remote: Rem,
        paging: Paging,
        callbacks: CallbackQueue,
        emitter: Arc<dyn SyncEventEmitter>,
    ) -> Self {
        let site_plugins =
            Synchronizer::<SitePlugin, _>::new(db.clone(), remote.clone(), Paging::Unpaged)
                .with_emitter(emitter.clone());
        let products = Synchronizer::<Product, _>::new(db.clone(), remote.clone(), paging)
            .with_emitter(emitter.clone());
        let coupons = Synchronizer::<Coupon, _>::new(db, remote, paging).with_emitter(emitter);

        StoreSet {
            site_plugins: SitePluginStore::with_synchronizer(site_plugins, callbacks.clone()),
            products: ProductStore::with_synchronizer(products, callbacks.clone()),
            coupons: CouponStore::with_synchronizer(coupons, callbacks),
        }
    }

    /// Registers every store with `dispatcher`.
    pub fn register(&self, dispatcher: &Dispatcher) -> SyncResult<()> {
        dispatcher.register(Arc::new(self.site_plugins.clone()))?;
        dispatcher.register(Arc::new(self.products.clone()))?;
        dispatcher.register(Arc::new(self.coupons.clone()))?;
        Ok(())
    }
}
