//! Source shard map: a partition of the unit-id space into contiguous
//! per-source ranges.
//!
//! This is what bounds query cost by source instead of by corpus size: the
//! planner issues one bounded sub-query per range, so a term's results are
//! sampled across many provenances rather than exhausted on whichever source
//! happens to sort first.
//!
//! The map is an immutable snapshot. [`ShardCache`] rebuilds it from the
//! store and swaps the `Arc` whole under a `parking_lot::RwLock`; concurrent
//! readers see either the old map or the new one, never a half-written state.
//! A source imported in several disjoint batches owns several ranges; the
//! planner groups ranges by source name when bounding and counting, so
//! incremental re-imports only add ranges, they never corrupt results.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::contracts;
use crate::error::Result;
use crate::store::CorpusStore;
use crate::types::SourceRange;

/// Immutable snapshot of the per-source id ranges.
#[derive(Debug)]
pub struct ShardMap {
    ranges: Vec<SourceRange>,
    num_sources: usize,
}

impl ShardMap {
    /// Build from store-reported ranges. Ranges are ordered by `min_id`;
    /// the distinct-source count drives the planner's per-source limit.
    pub fn new(mut ranges: Vec<SourceRange>) -> Self {
        ranges.sort_by_key(|r| r.min_id);
        contracts::check_ranges_well_formed(&ranges);
        let num_sources = ranges
            .iter()
            .map(|r| r.source.as_str())
            .collect::<HashSet<_>>()
            .len();
        ShardMap {
            ranges,
            num_sources,
        }
    }

    pub fn ranges(&self) -> &[SourceRange] {
        &self.ranges
    }

    /// Number of distinct sources (not ranges).
    pub fn num_sources(&self) -> usize {
        self.num_sources
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Holder for the current shard map snapshot.
///
/// `rebuild` computes the fresh map before taking the write lock, so readers
/// are never blocked on a store scan. `snapshot` hands out a cheap `Arc`
/// clone that stays valid for the whole query even if a rebuild lands midway.
#[derive(Debug, Default)]
pub struct ShardCache {
    current: RwLock<Option<Arc<ShardMap>>>,
}

impl ShardCache {
    /// An empty cache; queries fall back to the unsharded path until the
    /// first `rebuild`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Recompute the map from the store and swap it in atomically.
    pub fn rebuild<S: CorpusStore>(&self, store: &S) -> Result<Arc<ShardMap>> {
        let map = Arc::new(ShardMap::new(store.source_ranges()?));
        *self.current.write() = Some(Arc::clone(&map));
        Ok(map)
    }

    /// The current snapshot, if one has been built.
    pub fn snapshot(&self) -> Option<Arc<ShardMap>> {
        self.current.read().clone()
    }

    /// Drop the snapshot. Call after any import that could add a source or
    /// extend one non-contiguously; the next `rebuild` recomputes from
    /// scratch.
    pub fn invalidate(&self) {
        *self.current.write() = None;
    }
}
