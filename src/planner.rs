//! Query planner: the search and count entry point.
//!
//! # How a query runs
//!
//! ```text
//!           term
//!             │
//!   ┌─────────┴──────────┐
//!   │ >= 3 code points?  │
//!   └───┬──────────┬─────┘
//!      yes         no
//!       │          │
//!  direct phrase   expand via vocabulary: OR of all trigrams
//!   matching       containing the term (empty expansion → empty result)
//!       │          │
//!       └────┬─────┘
//!            ▼
//!  one bounded sub-query per source range, LIMIT max(2, ⌈limit/sources⌉)
//!            ▼
//!  batch-fetch records │ post-filter short terms │ truncate to limit
//! ```
//!
//! The per-source bound is the entire point: cost is
//! `O(num_sources × per_source_limit)` regardless of corpus size, and results
//! are sampled across provenances instead of exhausting the limit on
//! whichever source was imported first or is largest.
//!
//! **There is no relevance ranking.** Result order is whatever the posting
//! lists and the shard walk produce. Ranking at full corpus scale is the cost
//! this design exists to avoid; callers that need ordering impose their own.
//!
//! All operations are pure reads and safe to call concurrently; the only
//! shared state is the shard-map and vocabulary snapshots, which are swapped
//! whole, never mutated in place.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::shards::ShardCache;
use crate::store::CorpusStore;
use crate::trigram::{self, TrigramIndex, TRIGRAM_LEN};
use crate::types::{HitCount, SearchResult, SourceCount, UnitId};
use crate::vocab::Vocabulary;

/// How a term is matched against the index.
enum CandidateExpr {
    /// Term spans at least one trigram: direct phrase matching.
    Direct,
    /// Sub-trigram term: OR over every vocabulary trigram containing it.
    Expanded(Vec<String>),
}

/// The query-side handle: store + trigram index + rebuildable caches.
///
/// Cheap to share behind an `Arc`; every public operation takes `&self`.
pub struct Searcher<S: CorpusStore> {
    store: S,
    index: TrigramIndex,
    vocab: RwLock<Option<Arc<Vocabulary>>>,
    shards: ShardCache,
}

impl<S: CorpusStore> Searcher<S> {
    /// Index the whole store and materialize both caches.
    pub fn build(store: S) -> Result<Self> {
        #[cfg(feature = "parallel")]
        let index = TrigramIndex::build_parallel(&store)?;
        #[cfg(not(feature = "parallel"))]
        let index = TrigramIndex::build(&store)?;
        Self::with_index(store, index)
    }

    /// Wrap a pre-built index (ingestion pipelines that maintain the index
    /// incrementally land here), then materialize the caches.
    pub fn with_index(store: S, index: TrigramIndex) -> Result<Self> {
        let searcher = Searcher {
            store,
            index,
            vocab: RwLock::new(None),
            shards: ShardCache::empty(),
        };
        searcher.rebuild_vocabulary();
        searcher.rebuild_shards()?;
        Ok(searcher)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &TrigramIndex {
        &self.index
    }

    /// Recompute the shard map snapshot from the store.
    pub fn rebuild_shards(&self) -> Result<()> {
        self.shards.rebuild(&self.store)?;
        Ok(())
    }

    /// Drop the shard map; queries use the unsharded fallback until the next
    /// rebuild. Call after imports that may add or extend sources.
    pub fn invalidate_shards(&self) {
        self.shards.invalidate();
    }

    /// Recompute the vocabulary snapshot from the index.
    pub fn rebuild_vocabulary(&self) {
        let vocab = Arc::new(Vocabulary::from_index(&self.index));
        *self.vocab.write() = Some(vocab);
    }

    /// Drop the vocabulary snapshot; expansion scans the index's term keys
    /// directly until the next rebuild.
    pub fn invalidate_vocabulary(&self) {
        *self.vocab.write() = None;
    }

    /// Search for units containing `term` as a contiguous substring.
    ///
    /// Returns at most `limit` results, sampled across sources via the shard
    /// map. **Order is not a relevance order**: it is posting order within
    /// the per-source walk. Empty or whitespace-only terms yield an empty
    /// result, as do sub-trigram terms with an empty vocabulary expansion.
    pub fn search(&self, term: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let term = term.trim();
        if term.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let Some(expr) = self.plan(term) else {
            return Ok(Vec::new());
        };

        let ids = match self.shards.snapshot() {
            Some(map) if !map.is_empty() => {
                let per_source = std::cmp::max(2, limit.div_ceil(map.num_sources()));
                let mut taken: HashMap<&str, usize> = HashMap::new();
                let mut ids: Vec<UnitId> = Vec::new();
                for range in map.ranges() {
                    let have = taken.entry(range.source.as_str()).or_insert(0);
                    if *have >= per_source {
                        continue;
                    }
                    let want = per_source - *have;
                    let bounds = Some((range.min_id, range.max_id));
                    let got = match &expr {
                        CandidateExpr::Direct => {
                            self.index.match_phrase(term, &self.store, bounds, want)?
                        }
                        CandidateExpr::Expanded(terms) => self.index.union_ids(terms, bounds, want),
                    };
                    *have += got.len();
                    ids.extend(got);
                }
                ids
            }
            _ => {
                warn!(term, "no shard map; falling back to unsharded search");
                match &expr {
                    CandidateExpr::Direct => {
                        self.index.match_phrase(term, &self.store, None, limit)?
                    }
                    CandidateExpr::Expanded(terms) => self.index.union_ids(terms, None, limit),
                }
            }
        };

        let mut records = self.store.fetch_units_by_ids(&ids)?;
        if matches!(expr, CandidateExpr::Expanded(_)) {
            // Expansion candidates are unverified; drop trigram-boundary
            // false positives.
            records.retain(|r| r.text.contains(term));
        }
        records.truncate(limit);
        Ok(records)
    }

    /// Corpus-wide hit count, capped at `cap`.
    ///
    /// The cap bounds counting cost for very frequent terms; the returned
    /// value is exact unless `capped` is set, in which case it is a lower
    /// bound.
    pub fn count_hits(&self, term: &str, cap: u64) -> Result<HitCount> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(HitCount::exact(0));
        }
        match self.plan(term) {
            None => Ok(HitCount::exact(0)),
            Some(CandidateExpr::Direct) => self.index.count_phrase(term, &self.store, None, cap),
            Some(CandidateExpr::Expanded(terms)) => {
                self.index.count_union(&terms, term, &self.store, None, cap)
            }
        }
    }

    /// Hit counts broken down by source, each capped independently at
    /// `cap_per_source`, sorted by count descending. Zero-hit sources are
    /// omitted. Counting per shard means a dominant source can never mask a
    /// term's presence in smaller ones.
    pub fn count_hits_by_source(&self, term: &str, cap_per_source: u64) -> Result<Vec<SourceCount>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let Some(expr) = self.plan(term) else {
            return Ok(Vec::new());
        };

        let mut totals: HashMap<String, HitCount> = HashMap::new();
        match self.shards.snapshot() {
            Some(map) if !map.is_empty() => {
                for range in map.ranges() {
                    let entry = totals
                        .entry(range.source.clone())
                        .or_insert(HitCount::exact(0));
                    if entry.capped {
                        continue;
                    }
                    let remaining = cap_per_source - entry.count;
                    let bounds = Some((range.min_id, range.max_id));
                    let got = match &expr {
                        CandidateExpr::Direct => {
                            self.index.count_phrase(term, &self.store, bounds, remaining)?
                        }
                        CandidateExpr::Expanded(terms) => {
                            self.index
                                .count_union(terms, term, &self.store, bounds, remaining)?
                        }
                    };
                    entry.count += got.count;
                    entry.capped = got.capped;
                }
            }
            _ => {
                // Slow path: one verified pass over all candidates,
                // attributing each hit to its source from the fetched record.
                warn!(term, "no shard map; counting by source unsharded");
                let candidates = match &expr {
                    CandidateExpr::Direct => self.index.candidate_ids(term, None),
                    CandidateExpr::Expanded(terms) => {
                        self.index.union_ids(terms, None, usize::MAX)
                    }
                };
                trigram::scan_verified(&self.store, &candidates, term, &mut |record| {
                    let entry = totals
                        .entry(record.source.clone())
                        .or_insert(HitCount::exact(0));
                    if !entry.capped {
                        entry.count += 1;
                        if entry.count >= cap_per_source {
                            entry.capped = true;
                        }
                    }
                    true
                })?;
            }
        }

        let mut counts: Vec<SourceCount> = totals
            .into_iter()
            .filter(|(_, hc)| hc.count > 0)
            .map(|(source, hc)| SourceCount {
                source,
                count: hc.count,
                capped: hc.capped,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
        Ok(counts)
    }

    /// Decide direct vs expanded matching. `None` means the term cannot match
    /// anything (empty expansion) and the caller should return empty.
    fn plan(&self, term: &str) -> Option<CandidateExpr> {
        if term.chars().count() >= TRIGRAM_LEN {
            return Some(CandidateExpr::Direct);
        }
        let expansion = self.expansion_terms(term);
        debug!(
            term,
            expansion_len = expansion.len(),
            "expanded sub-trigram term"
        );
        if expansion.is_empty() {
            None
        } else {
            Some(CandidateExpr::Expanded(expansion))
        }
    }

    /// Vocabulary trigrams containing `term`; falls back to scanning the
    /// index's term keys when the vocabulary snapshot is missing.
    fn expansion_terms(&self, term: &str) -> Vec<String> {
        if let Some(vocab) = self.vocab.read().clone() {
            return vocab.terms_containing(term);
        }
        debug!(term, "vocabulary cache missing; scanning index terms");
        let mut terms: Vec<String> = self
            .index
            .terms()
            .filter(|(t, _)| t.contains(term))
            .map(|(t, _)| t.to_string())
            .collect();
        terms.sort_unstable();
        terms
    }
}
