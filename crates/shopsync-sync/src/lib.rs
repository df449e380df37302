//! # shopsync-sync: Remote-to-Local Synchronization for shopsync
//!
//! Fetches resource collections from the store's REST API and reconciles them
//! into the local store: upsert every fetched record, delete the rows the
//! remote no longer lists, all in one transaction per sync.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Layer Architecture                          │
//! │                                                                         │
//! │  caller ──► Dispatcher::dispatch(Action)      returns immediately       │
//! │                  │                                                      │
//! │                  ▼  one processor per ResourceKind                      │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │SitePluginStore │  │  ProductStore  │  │     CouponStore        │    │
//! │  │ unpaged        │  │ paged, filters │  │ paged                  │    │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────┬────────────┘    │
//! │          └───────────────────┼───────────────────────┘                 │
//! │                              ▼  spawned task                            │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Synchronizer<R, Remote>                       │  │
//! │  │                                                                  │  │
//! │  │  ResourceRemote::list (page walk) ──► ReconcilePlan ──►          │  │
//! │  │  WriteSession (upsert + stale delete) ──► COMMIT                 │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               ▼                                         │
//! │  CallbackQueue::deliver ──► completion(Result<ReconcileSummary, _>)    │
//! │                              on the caller's designated context         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`dispatcher`] - Typed actions and their routing
//! - [`stores`] - One sync component per resource kind
//! - [`synchronizer`] - Generic fetch + reconcile, per-site serialization
//! - [`remote`] - Remote trait and the `reqwest` implementation
//! - [`wire`] - JSON records of the REST API
//! - [`callback`] - Completion delivery contexts
//! - [`events`] - Sync event emitter
//! - [`config`] - Configuration (TOML file + environment)
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopsync_sync::{Action, CallbackQueue, Dispatcher, HttpRemote, NoOpEmitter, ProductAction, StoreSet, SyncConfig};
//!
//! let config = SyncConfig::load_or_default(None);
//! let remote = HttpRemote::from_config(&config.api)?;
//! let (callbacks, runner) = CallbackQueue::spawn();
//!
//! let stores = StoreSet::new(db, remote, config.sync.paging(), callbacks, Arc::new(NoOpEmitter));
//! let dispatcher = Dispatcher::new();
//! stores.register(&dispatcher)?;
//!
//! dispatcher.dispatch(Action::Product(ProductAction::SynchronizeProducts {
//!     site_id: SiteId::new(7),
//!     filter: ProductFilter::default(),
//!     sort_order: ProductSortOrder::default(),
//!     on_completion: Box::new(|result| println!("{result:?}")),
//! }));
//!
//! runner.run().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod callback;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod remote;
pub mod stores;
pub mod synchronizer;
pub mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use callback::{CallbackQueue, CallbackRunner, Completion};
pub use config::{ApiSettings, DatabaseSettings, SyncConfig, SyncSettings};
pub use dispatcher::{
    Action, ActionProcessor, CouponAction, Dispatcher, ProductAction, SitePluginAction,
};
pub use error::{RemoteError, SyncError, SyncResult};
pub use events::{NoOpEmitter, SyncEventEmitter};
pub use remote::{HttpRemote, ResourceRemote};
pub use stores::{CouponStore, ProductStore, SitePluginStore, StoreSet};
pub use synchronizer::{Paging, Synchronizer};
