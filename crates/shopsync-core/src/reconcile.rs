//! # Reconciliation Planning
//!
//! Turns one remote response into the write set a sync applies to the local
//! store. Planning is pure; the db crate executes the plan inside a single
//! transaction.
//!
//! ## Replace vs Merge
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  local (site 7):   a:v1   b:v1                                          │
//! │  remote response:  a:v2          c:v1                                   │
//! │                                                                         │
//! │  Replace ──► a:v2          c:v1      upsert a, c; delete keys ∉ {a, c} │
//! │  Merge   ──► a:v2   b:v1   c:v1      upsert a, c; nothing deleted      │
//! │                                                                         │
//! │  Replace is used for complete collections, Merge for filtered views.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::types::{SiteId, SiteResource};

// =============================================================================
// Reconcile Mode
// =============================================================================

/// How a response relates to the local rows of its site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// The response is the complete collection: upsert, then delete every
    /// row of the site whose key is absent.
    Replace,

    /// The response is a partial view: upsert only.
    Merge,
}

impl ReconcileMode {
    /// Returns true when stale rows are deleted after the upserts.
    pub const fn deletes_stale(&self) -> bool {
        matches!(self, ReconcileMode::Replace)
    }
}

// =============================================================================
// Reconcile Plan
// =============================================================================

/// The write set for one site and one resource kind.
///
/// Records are deduplicated by key (the last occurrence wins) and ordered by
/// key, so applying a plan does not depend on the order of the response.
#[derive(Debug, Clone)]
pub struct ReconcilePlan<R: SiteResource> {
    site_id: SiteId,
    mode: ReconcileMode,
    records: Vec<R>,
    keys: Vec<R::Key>,
    skipped_foreign: usize,
}

impl<R: SiteResource> ReconcilePlan<R> {
    /// Builds a plan for `site_id` from a remote response.
    ///
    /// Records scoped to another site are dropped and counted in
    /// [`skipped_foreign`](Self::skipped_foreign).
    pub fn build(site_id: SiteId, records: Vec<R>, mode: ReconcileMode) -> Self {
        let mut skipped_foreign = 0;
        let mut by_key: HashMap<R::Key, R> = HashMap::with_capacity(records.len());

        for record in records {
            if record.site_id() != site_id {
                skipped_foreign += 1;
                continue;
            }
            by_key.insert(record.key(), record);
        }

        let mut entries: Vec<(R::Key, R)> = by_key.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        let (keys, records): (Vec<_>, Vec<_>) = entries.into_iter().unzip();

        ReconcilePlan {
            site_id,
            mode,
            records,
            keys,
            skipped_foreign,
        }
    }

    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Records to upsert, ordered by key.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Keys that survive the pass, ordered.
    pub fn keys(&self) -> &[R::Key] {
        &self.keys
    }

    /// Number of records dropped because they belong to another site.
    pub fn skipped_foreign(&self) -> usize {
        self.skipped_foreign
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// Reconcile Summary
// =============================================================================

/// Row counts written by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
}

impl ReconcileSummary {
    /// Returns true when nothing was written.
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }
}

impl fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} deleted",
            self.inserted, self.updated, self.deleted
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PluginStatus, Product, SitePlugin};

    fn plugin(site: i64, name: &str, version: &str) -> SitePlugin {
        SitePlugin::new(SiteId::new(site), format!("{name}/{name}.php"), name, PluginStatus::Active)
            .with_version(version)
    }

    #[test]
    fn test_keys_are_sorted_and_unique() {
        let plan = ReconcilePlan::build(
            SiteId::new(7),
            vec![plugin(7, "c", "1"), plugin(7, "a", "1"), plugin(7, "b", "1")],
            ReconcileMode::Replace,
        );
        assert_eq!(plan.keys(), &["a", "b", "c"]);
        assert_eq!(plan.records().len(), 3);
        assert_eq!(plan.records()[0].name, "a");
    }

    #[test]
    fn test_duplicate_keys_keep_last_occurrence() {
        let plan = ReconcilePlan::build(
            SiteId::new(7),
            vec![plugin(7, "a", "1"), plugin(7, "a", "2")],
            ReconcileMode::Replace,
        );
        assert_eq!(plan.records().len(), 1);
        assert_eq!(plan.records()[0].version, "2");
    }

    #[test]
    fn test_foreign_site_records_are_skipped() {
        let plan = ReconcilePlan::build(
            SiteId::new(7),
            vec![plugin(7, "a", "1"), plugin(8, "b", "1")],
            ReconcileMode::Replace,
        );
        assert_eq!(plan.keys(), &["a"]);
        assert_eq!(plan.skipped_foreign(), 1);
    }

    #[test]
    fn test_empty_response_is_valid_plan() {
        let plan: ReconcilePlan<Product> =
            ReconcilePlan::build(SiteId::new(7), Vec::new(), ReconcileMode::Replace);
        assert!(plan.is_empty());
        assert!(plan.mode().deletes_stale());
    }

    #[test]
    fn test_order_independent() {
        let site = SiteId::new(1);
        let forward = ReconcilePlan::build(
            site,
            vec![Product::new(site, 3, "c"), Product::new(site, 1, "a")],
            ReconcileMode::Merge,
        );
        let reverse = ReconcilePlan::build(
            site,
            vec![Product::new(site, 1, "a"), Product::new(site, 3, "c")],
            ReconcileMode::Merge,
        );
        assert_eq!(forward.keys(), reverse.keys());
        assert_eq!(forward.keys(), &[1, 3]);
        assert!(!forward.mode().deletes_stale());
    }

    #[test]
    fn test_summary_display() {
        let summary = ReconcileSummary {
            inserted: 1,
            updated: 2,
            deleted: 0,
        };
        assert_eq!(summary.to_string(), "1 inserted, 2 updated, 0 deleted");
        assert!(!summary.is_noop());
        assert!(ReconcileSummary::default().is_noop());
    }
}
