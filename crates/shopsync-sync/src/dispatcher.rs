//! # Action Dispatcher
//!
//! Routes typed actions to the store registered for their kind.
//!
//! ## Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Dispatcher                                    │
//! │                                                                         │
//! │  dispatch(Action::Product(SynchronizeProducts { .. }))                 │
//! │       │                                                                 │
//! │       ▼  action.kind()                                                  │
//! │  ┌──────────────────────────────────────────────┐                      │
//! │  │  site_plugin ──► SitePluginStore              │                      │
//! │  │  product     ──► ProductStore   ◄── chosen    │                      │
//! │  │  coupon      ──► CouponStore                  │                      │
//! │  └──────────────────────────────────────────────┘                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  processor.on_action(action)   returns immediately; work runs on a     │
//! │                                spawned task, completion reports back   │
//! │                                                                         │
//! │  Exactly one processor per kind. An action with no processor, or a     │
//! │  processor handed a variant it does not handle, is a programming error.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, warn};

use shopsync_core::{ProductFilter, ProductSortOrder, ReconcileSummary, ResourceKind, SiteId};

use crate::callback::Completion;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Actions
// =============================================================================

/// Site plugin intents.
pub enum SitePluginAction {
    /// Replace the stored plugins of a site with the remote listing.
    SynchronizeSitePlugins {
        site_id: SiteId,
        on_completion: Completion,
    },
}

/// Product intents.
pub enum ProductAction {
    /// Fetch every page of products for a site, optionally filtered.
    SynchronizeProducts {
        site_id: SiteId,
        filter: ProductFilter,
        sort_order: ProductSortOrder,
        on_completion: Completion,
    },

    /// Delete every stored product of a site.
    ResetStoredProducts {
        site_id: SiteId,
        on_completion: Completion,
    },
}

/// Coupon intents.
pub enum CouponAction {
    SynchronizeCoupons {
        site_id: SiteId,
        on_completion: Completion,
    },
}

/// Every intent the dispatcher can route.
pub enum Action {
    SitePlugin(SitePluginAction),
    Product(ProductAction),
    Coupon(CouponAction),
}

impl Action {
    /// Kind used to route this action.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Action::SitePlugin(_) => ResourceKind::SitePlugin,
            Action::Product(_) => ResourceKind::Product,
            Action::Coupon(_) => ResourceKind::Coupon,
        }
    }

    /// Site the action targets.
    pub fn site_id(&self) -> SiteId {
        match self {
            Action::SitePlugin(SitePluginAction::SynchronizeSitePlugins { site_id, .. })
            | Action::Product(ProductAction::SynchronizeProducts { site_id, .. })
            | Action::Product(ProductAction::ResetStoredProducts { site_id, .. })
            | Action::Coupon(CouponAction::SynchronizeCoupons { site_id, .. }) => *site_id,
        }
    }

    /// Variant name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SitePlugin(SitePluginAction::SynchronizeSitePlugins { .. }) => {
                "SynchronizeSitePlugins"
            }
            Action::Product(ProductAction::SynchronizeProducts { .. }) => "SynchronizeProducts",
            Action::Product(ProductAction::ResetStoredProducts { .. }) => "ResetStoredProducts",
            Action::Coupon(CouponAction::SynchronizeCoupons { .. }) => "SynchronizeCoupons",
        }
    }

    /// Hands `result` straight to the action's completion.
    pub fn complete(self, result: SyncResult<ReconcileSummary>) {
        let on_completion = match self {
            Action::SitePlugin(SitePluginAction::SynchronizeSitePlugins { on_completion, .. })
            | Action::Product(ProductAction::SynchronizeProducts { on_completion, .. })
            | Action::Product(ProductAction::ResetStoredProducts { on_completion, .. })
            | Action::Coupon(CouponAction::SynchronizeCoupons { on_completion, .. }) => {
                on_completion
            }
        };
        on_completion(result);
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.name())
            .field("kind", &self.kind())
            .field("site_id", &self.site_id())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Action Processor
// =============================================================================

/// A component that handles every action of one kind.
pub trait ActionProcessor: Send + Sync {
    /// The action kind this processor is registered for.
    fn kind(&self) -> ResourceKind;

    /// Starts handling `action` and returns without waiting for it.
    fn on_action(&self, action: Action);
}

/// Reports a variant a processor was handed but does not handle.
pub(crate) fn unsupported_action(processor: ResourceKind, action: &Action) {
    error!(processor = %processor, action = ?action, "Processor received an unsupported action");
    debug_assert!(
        false,
        "unsupported action {} for {} processor",
        action.name(),
        processor
    );
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Routes actions to registered processors.
#[derive(Default)]
pub struct Dispatcher {
    processors: RwLock<HashMap<ResourceKind, Arc<dyn ActionProcessor>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `processor` for its kind.
    pub fn register(&self, processor: Arc<dyn ActionProcessor>) -> SyncResult<()> {
        let kind = processor.kind();
        let mut processors = self
            .processors
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if processors.contains_key(&kind) {
            return Err(SyncError::DuplicateProcessor(kind));
        }

        processors.insert(kind, processor);
        debug!(kind = %kind, "Registered action processor");
        Ok(())
    }

    /// Removes the processor of `kind`, returning it if one was registered.
    pub fn unregister(&self, kind: ResourceKind) -> Option<Arc<dyn ActionProcessor>> {
        self.processors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind)
    }

    pub fn is_registered(&self, kind: ResourceKind) -> bool {
        self.processors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&kind)
    }

    /// Routes `action` to the processor of its kind.
    ///
    /// An action with no registered processor is dropped without running its
    /// completion; debug builds panic.
    pub fn dispatch(&self, action: Action) {
        let kind = action.kind();
        let processor = self
            .processors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned();

        match processor {
            Some(processor) => {
                debug!(action = ?action, "Dispatching");
                processor.on_action(action);
            }
            None => {
                warn!(action = ?action, "No processor registered");
                debug_assert!(false, "no processor registered for {} actions", kind);
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<ResourceKind> = self
            .processors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        kinds.sort();
        f.debug_struct("Dispatcher").field("processors", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Completes every action inline and records what it saw.
    struct Recorder {
        kind: ResourceKind,
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new(kind: ResourceKind) -> Arc<Self> {
            Arc::new(Recorder {
                kind,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl ActionProcessor for Recorder {
        fn kind(&self) -> ResourceKind {
            self.kind
        }

        fn on_action(&self, action: Action) {
            self.seen.lock().unwrap().push(action.name().to_string());
            action.complete(Ok(ReconcileSummary::default()));
        }
    }

    fn noop() -> Completion {
        Box::new(|_| {})
    }

    #[test]
    fn test_routes_by_kind() {
        let dispatcher = Dispatcher::new();
        let products = Recorder::new(ResourceKind::Product);
        let coupons = Recorder::new(ResourceKind::Coupon);
        dispatcher.register(products.clone()).unwrap();
        dispatcher.register(coupons.clone()).unwrap();

        dispatcher.dispatch(Action::Product(ProductAction::ResetStoredProducts {
            site_id: SiteId::new(7),
            on_completion: noop(),
        }));
        dispatcher.dispatch(Action::Coupon(CouponAction::SynchronizeCoupons {
            site_id: SiteId::new(7),
            on_completion: noop(),
        }));

        assert_eq!(*products.seen.lock().unwrap(), vec!["ResetStoredProducts"]);
        assert_eq!(*coupons.seen.lock().unwrap(), vec!["SynchronizeCoupons"]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let dispatcher = Dispatcher::new();
        dispatcher.register(Recorder::new(ResourceKind::Coupon)).unwrap();

        let err = dispatcher
            .register(Recorder::new(ResourceKind::Coupon))
            .unwrap_err();
        assert!(matches!(err, SyncError::DuplicateProcessor(ResourceKind::Coupon)));

        assert!(dispatcher.unregister(ResourceKind::Coupon).is_some());
        assert!(!dispatcher.is_registered(ResourceKind::Coupon));
        dispatcher.register(Recorder::new(ResourceKind::Coupon)).unwrap();
    }

    #[test]
    fn test_action_debug_omits_completion() {
        let action = Action::Product(ProductAction::SynchronizeProducts {
            site_id: SiteId::new(7),
            filter: ProductFilter::default(),
            sort_order: ProductSortOrder::default(),
            on_completion: noop(),
        });
        let debug = format!("{action:?}");
        assert!(debug.starts_with("SynchronizeProducts"));
        assert!(debug.contains("site_id: SiteId(7)"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no processor registered for site_plugin actions")]
    fn test_unregistered_kind_panics_in_debug() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(Action::SitePlugin(SitePluginAction::SynchronizeSitePlugins {
            site_id: SiteId::new(1),
            on_completion: noop(),
        }));
    }
}
