//! The building blocks of the corpus and its query results.
//!
//! These types mirror the read schema of the corpus store (sources, articles,
//! text units) plus the ephemeral values the query side hands back. Everything
//! here is plain data; the interesting behavior lives in `trigram`, `planner`,
//! and `report`.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **TextUnit**: `seq` values within one article are contiguous from 0, and
//!   units concatenated in `seq` order reproduce the article text losslessly.
//!   Units are immutable once created; the only mutation path is
//!   delete-then-reinsert.
//!
//! - **SourceRange**: `min_id <= max_id`, and a range never spans units of two
//!   different sources. A source may own several disjoint ranges (incremental
//!   re-imports append a new contiguous run at the top of the id space).
//!
//! - **HitCount / SourceCount**: when `capped` is true the count is a lower
//!   bound, not an exact value. Callers must surface the flag rather than
//!   presenting a capped count as exact.

use serde::{Deserialize, Serialize};

// =============================================================================
// NEWTYPES
// =============================================================================

/// Type-safe text-unit identifier.
///
/// Unit ids are assigned in strictly increasing order as units are inserted,
/// which is what makes contiguous per-source id ranges possible in the first
/// place. Prevents accidentally passing an article id where a unit id is
/// expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct UnitId(pub u64);

impl UnitId {
    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        UnitId(id)
    }
}

impl From<UnitId> for u64 {
    fn from(id: UnitId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// CORPUS ROWS
// =============================================================================

/// A provenance source (one encyclopedia dump, one news crawl, ...).
///
/// Created once per import pipeline; the running counts are updated after
/// each import batch, not per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: u32,
    /// Unique human-readable name, e.g. `"wikipedia"` or `"baidu_baike"`.
    pub name: String,
    pub article_count: u64,
    pub unit_count: u64,
}

/// Metadata for one imported document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub source_id: u32,
    /// Identifier in the source's own namespace (page id, URL, ...).
    pub external_id: String,
    pub title: String,
    pub char_count: usize,
}

/// The smallest indexed span of text (typically one sentence).
///
/// Immutable once created. `seq` is the unit's 0-based position within its
/// article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextUnit {
    pub id: UnitId,
    pub article_id: u64,
    pub seq: u32,
    pub text: String,
    pub char_count: usize,
}

/// A contiguous span of unit ids belonging to one source.
///
/// Both bounds are inclusive. Materialized by the shard map and used by the
/// planner to bound each per-source sub-query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub source: String,
    pub min_id: UnitId,
    pub max_id: UnitId,
}

impl SourceRange {
    #[inline]
    pub fn contains(&self, id: UnitId) -> bool {
        self.min_id <= id && id <= self.max_id
    }
}

// =============================================================================
// QUERY OUTPUTS (ephemeral, constructed per call)
// =============================================================================

/// A single search hit: the matching unit plus its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub unit_id: UnitId,
    pub text: String,
    pub source: String,
    pub title: String,
    pub article_id: u64,
    pub seq: u32,
}

/// A hit embedded in its surrounding units from the same article.
///
/// `context` is the window's units joined with newlines; `hit_index` says
/// which of the `chunk_count` units in the window is the original hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPassage {
    pub source: String,
    pub title: String,
    pub hit_text: String,
    pub context: String,
    pub hit_index: usize,
    pub chunk_count: usize,
}

/// A possibly-capped hit count.
///
/// `capped == true` means counting stopped at the cap and `count` is a lower
/// bound. `capped == false` means `count` is exact. The two must never be
/// conflated: "at least 10,000" is not "10,000".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitCount {
    pub count: u64,
    pub capped: bool,
}

impl HitCount {
    /// An exact count.
    pub fn exact(count: u64) -> Self {
        HitCount {
            count,
            capped: false,
        }
    }

    /// A count that stopped at the cap.
    pub fn at_cap(cap: u64) -> Self {
        HitCount {
            count: cap,
            capped: true,
        }
    }
}

/// Per-source hit count, possibly capped independently of other sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
    pub capped: bool,
}

/// Per-source corpus statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStats {
    pub name: String,
    pub article_count: u64,
    pub unit_count: u64,
}

/// Whole-corpus statistics, broken down by source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub sources: Vec<SourceStats>,
    pub article_count: u64,
    pub unit_count: u64,
}
