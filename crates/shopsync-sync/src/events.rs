//! # Sync Events
//!
//! Outbound notifications about finished synchronizations, for whatever
//! front end embeds the stores (status bars, logs, a UI refresh).

use shopsync_core::{ReconcileSummary, ResourceKind, SiteId};

/// Trait for emitting sync events.
pub trait SyncEventEmitter: Send + Sync {
    /// A synchronization of `kind` for `site_id` committed.
    fn emit_synced(&self, kind: ResourceKind, site_id: SiteId, summary: &ReconcileSummary);

    /// A synchronization of `kind` for `site_id` failed and left the store
    /// unchanged.
    fn emit_error(&self, kind: ResourceKind, site_id: SiteId, message: &str, retryable: bool);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl SyncEventEmitter for NoOpEmitter {
    fn emit_synced(&self, _kind: ResourceKind, _site_id: SiteId, _summary: &ReconcileSummary) {}
    fn emit_error(&self, _kind: ResourceKind, _site_id: SiteId, _message: &str, _retryable: bool) {}
}
