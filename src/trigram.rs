//! Trigram posting-list index: exact substring search over text units.
//!
//! # Architecture
//!
//! Every unit's text is decomposed into all overlapping windows of 3 Unicode
//! code points ("trigrams"; never bytes, so multi-byte scripts are never split
//! mid-character). Each distinct trigram maps to the sorted, duplicate-free
//! list of unit ids containing it:
//!
//! ```text
//! "银行是金融机构"  ──►  银行是 │ 行是金 │ 是金融 │ 金融机 │ 融机构
//!
//! 银行是 ──► [ 17, 203, 5_882, ... ]          (sorted UnitId postings)
//! 行是金 ──► [ 17, 99 ]
//! ```
//!
//! A phrase query AND-intersects the posting lists of its trigrams and then
//! verifies each candidate with an exact substring check against the unit's
//! stored text. The verification step is what turns "contains all of the
//! term's trigrams" into "contains the term contiguously": the same trigrams
//! occurring in a different order or position would otherwise over-match.
//! A term that is exactly one trigram needs no verification: its posting
//! list is the answer by construction.
//!
//! # Invariants
//!
//! 1. **POSTING_LIST_SORTED**: every posting list is strictly increasing
//! 2. **NON_EMPTY**: a term present in the map has at least one posting
//! 3. **REMOVE_INVERTS_INSERT**: `remove(id, text)` after `insert(id, text)`
//!    restores the previous state exactly
//!
//! Texts shorter than 3 code points produce no trigrams and are therefore
//! unreachable by search; this matches the behavior of trigram tokenizers in
//! mainstream full-text engines.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::contracts;
use crate::error::Result;
use crate::store::CorpusStore;
use crate::types::{HitCount, SearchResult, UnitId};

/// Matching token width, in Unicode code points.
pub const TRIGRAM_LEN: usize = 3;

/// Candidate ids are verified against stored text in batches of this size.
const VERIFY_BATCH: usize = 128;

/// Chunk size for the parallel build's map phase.
#[cfg(feature = "parallel")]
const BUILD_CHUNK: usize = 1024;

/// All overlapping trigrams of `text`, duplicates included, in text order.
pub fn trigrams(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < TRIGRAM_LEN {
        return Vec::new();
    }
    chars
        .windows(TRIGRAM_LEN)
        .map(|w| w.iter().collect())
        .collect()
}

/// Distinct trigrams of `text`, sorted.
fn distinct_trigrams(text: &str) -> Vec<String> {
    let mut grams = trigrams(text);
    grams.sort();
    grams.dedup();
    grams
}

/// Inverted index from trigram term to sorted unit-id posting list.
#[derive(Debug, Default)]
pub struct TrigramIndex {
    terms: HashMap<String, Vec<UnitId>>,
    indexed_units: usize,
}

impl TrigramIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build sequentially by scanning the store in id order.
    pub fn build<S: CorpusStore>(store: &S) -> Result<Self> {
        let mut index = Self::new();
        store.for_each_unit(&mut |unit| index.insert(unit.id, &unit.text))?;
        contracts::check_postings_well_formed(&index);
        Ok(index)
    }

    /// Build with rayon map-reduce: per-chunk posting maps in parallel, then
    /// one merge pass. Postings stay sorted because units arrive in id order
    /// and chunks are merged in order.
    #[cfg(feature = "parallel")]
    pub fn build_parallel<S: CorpusStore>(store: &S) -> Result<Self> {
        let mut units: Vec<(UnitId, String)> = Vec::new();
        store.for_each_unit(&mut |unit| units.push((unit.id, unit.text.clone())))?;

        // MAP: one posting map per chunk
        let maps: Vec<HashMap<String, Vec<UnitId>>> = units
            .par_chunks(BUILD_CHUNK)
            .map(|chunk| {
                let mut map: HashMap<String, Vec<UnitId>> = HashMap::new();
                for (id, text) in chunk {
                    for gram in distinct_trigrams(text) {
                        map.entry(gram).or_default().push(*id);
                    }
                }
                map
            })
            .collect();

        // REDUCE: merge chunk maps (chunks are id-ordered, so appends keep
        // each posting list sorted)
        let mut terms: HashMap<String, Vec<UnitId>> = HashMap::new();
        for map in maps {
            for (term, ids) in map {
                terms.entry(term).or_default().extend(ids);
            }
        }

        let indexed_units = units
            .par_iter()
            .filter(|(_, text)| text.chars().nth(TRIGRAM_LEN - 1).is_some())
            .count();

        let index = TrigramIndex {
            terms,
            indexed_units,
        };
        contracts::check_postings_well_formed(&index);
        Ok(index)
    }

    /// Index one unit's text. Safe for ids arriving in any order; ids arriving
    /// in increasing order append in O(1).
    pub fn insert(&mut self, id: UnitId, text: &str) {
        let grams = distinct_trigrams(text);
        if grams.is_empty() {
            return;
        }
        let mut inserted_any = false;
        for gram in grams {
            let list = self.terms.entry(gram).or_default();
            match list.binary_search(&id) {
                Ok(_) => {}
                Err(pos) => {
                    list.insert(pos, id);
                    inserted_any = true;
                }
            }
        }
        if inserted_any {
            self.indexed_units += 1;
        }
    }

    /// Un-index one unit's text. Must be called with the exact text that was
    /// indexed; the delete-then-reinsert mutation path calls this before
    /// re-indexing the replacement unit.
    pub fn remove(&mut self, id: UnitId, text: &str) {
        let grams = distinct_trigrams(text);
        if grams.is_empty() {
            return;
        }
        let mut removed_any = false;
        for gram in grams {
            if let Some(list) = self.terms.get_mut(&gram) {
                if let Ok(pos) = list.binary_search(&id) {
                    list.remove(pos);
                    removed_any = true;
                }
                if list.is_empty() {
                    self.terms.remove(&gram);
                }
            }
        }
        if removed_any {
            self.indexed_units = self.indexed_units.saturating_sub(1);
        }
    }

    /// Number of distinct trigram terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of units that contributed at least one trigram.
    pub fn indexed_units(&self) -> usize {
        self.indexed_units
    }

    /// Posting list for a term; empty if the term is unknown.
    pub fn postings(&self, term: &str) -> &[UnitId] {
        self.terms.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Document frequency of a term (0 if unknown).
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.postings(term).len() as u64
    }

    /// All distinct terms with their document frequencies, in map order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.terms
            .iter()
            .map(|(term, ids)| (term.as_str(), ids.len() as u64))
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &[UnitId])> + '_ {
        self.terms
            .iter()
            .map(|(term, ids)| (term.as_str(), ids.as_slice()))
    }

    /// Restrict a sorted posting list to an inclusive id range.
    fn range_slice<'a>(list: &'a [UnitId], range: Option<(UnitId, UnitId)>) -> &'a [UnitId] {
        let Some((lo, hi)) = range else {
            return list;
        };
        let start = list.partition_point(|&id| id < lo);
        let end = list.partition_point(|&id| id <= hi);
        &list[start..end]
    }

    /// AND-intersection of the posting lists of `term`'s trigrams, bounded by
    /// an inclusive id range. Unverified: ids here contain all the trigrams
    /// but not necessarily the term contiguously.
    pub fn candidate_ids(&self, term: &str, range: Option<(UnitId, UnitId)>) -> Vec<UnitId> {
        let grams = distinct_trigrams(term);
        if grams.is_empty() {
            return Vec::new();
        }
        let mut lists: Vec<&[UnitId]> = grams
            .iter()
            .map(|g| Self::range_slice(self.postings(g), range))
            .collect();
        // Drive the intersection from the rarest list.
        lists.sort_by_key(|l| l.len());
        if lists[0].is_empty() {
            return Vec::new();
        }
        let mut acc: Vec<UnitId> = lists[0].to_vec();
        for list in &lists[1..] {
            acc.retain(|id| list.binary_search(id).is_ok());
            if acc.is_empty() {
                break;
            }
        }
        acc
    }

    /// OR-merge of the posting lists of several terms, bounded by an
    /// inclusive id range, truncated to `limit` distinct ids in ascending
    /// order. This is the expansion path for queries shorter than a trigram;
    /// the planner post-filters the fetched texts.
    pub fn union_ids(
        &self,
        terms: &[String],
        range: Option<(UnitId, UnitId)>,
        limit: usize,
    ) -> Vec<UnitId> {
        if limit == 0 {
            return Vec::new();
        }
        let slices: Vec<&[UnitId]> = terms
            .iter()
            .map(|t| Self::range_slice(self.postings(t), range))
            .filter(|s| !s.is_empty())
            .collect();

        // k-way merge, smallest head first
        let mut heap: BinaryHeap<Reverse<(UnitId, usize, usize)>> = slices
            .iter()
            .enumerate()
            .map(|(list, s)| Reverse((s[0], list, 0)))
            .collect();
        let mut out: Vec<UnitId> = Vec::new();
        while let Some(Reverse((id, list, pos))) = heap.pop() {
            if out.last() != Some(&id) {
                out.push(id);
                if out.len() == limit {
                    break;
                }
            }
            if let Some(&next) = slices[list].get(pos + 1) {
                heap.push(Reverse((next, list, pos + 1)));
            }
        }
        out
    }

    /// Ids of units containing `term` as a contiguous substring, bounded by
    /// an inclusive id range, truncated to `limit`, ascending.
    ///
    /// Requires `term` to span at least [`TRIGRAM_LEN`] code points. Unknown
    /// terms yield an empty result, not an error.
    pub fn match_phrase<S: CorpusStore>(
        &self,
        term: &str,
        store: &S,
        range: Option<(UnitId, UnitId)>,
        limit: usize,
    ) -> Result<Vec<UnitId>> {
        debug_assert!(term.chars().count() >= TRIGRAM_LEN);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let candidates = self.candidate_ids(term, range);
        if term.chars().count() == TRIGRAM_LEN {
            // Single-trigram term: the posting list is already exact.
            return Ok(candidates.into_iter().take(limit).collect());
        }
        let mut out = Vec::new();
        scan_verified(store, &candidates, term, &mut |record| {
            out.push(record.unit_id);
            out.len() < limit
        })?;
        Ok(out)
    }

    /// Capped count of units containing `term` contiguously within a range.
    ///
    /// Stops counting at `cap`; the result's `capped` flag distinguishes "at
    /// least `cap`" from an exact count.
    pub fn count_phrase<S: CorpusStore>(
        &self,
        term: &str,
        store: &S,
        range: Option<(UnitId, UnitId)>,
        cap: u64,
    ) -> Result<HitCount> {
        debug_assert!(term.chars().count() >= TRIGRAM_LEN);
        if cap == 0 {
            return Ok(HitCount::at_cap(0));
        }
        let candidates = self.candidate_ids(term, range);
        if term.chars().count() == TRIGRAM_LEN {
            let exact = candidates.len() as u64;
            return Ok(if exact > cap {
                HitCount::at_cap(cap)
            } else {
                HitCount::exact(exact)
            });
        }
        let mut count = 0u64;
        let aborted = scan_verified(store, &candidates, term, &mut |_| {
            count += 1;
            count < cap
        })?;
        Ok(HitCount {
            count,
            capped: aborted,
        })
    }

    /// Capped count over an OR-expansion: units in any of `terms`' posting
    /// lists whose stored text literally contains `needle`. Used for queries
    /// shorter than a trigram, where `terms` are the vocabulary trigrams
    /// containing `needle`.
    pub fn count_union<S: CorpusStore>(
        &self,
        terms: &[String],
        needle: &str,
        store: &S,
        range: Option<(UnitId, UnitId)>,
        cap: u64,
    ) -> Result<HitCount> {
        if cap == 0 {
            return Ok(HitCount::at_cap(0));
        }
        let candidates = self.union_ids(terms, range, usize::MAX);
        let mut count = 0u64;
        let aborted = scan_verified(store, &candidates, needle, &mut |_| {
            count += 1;
            count < cap
        })?;
        Ok(HitCount {
            count,
            capped: aborted,
        })
    }
}

/// Fetch candidate records in batches and pass every record whose text
/// literally contains `needle` to `visit`. Returns `true` if `visit` aborted
/// the scan (i.e. candidates may remain unexamined).
pub(crate) fn scan_verified<S: CorpusStore>(
    store: &S,
    candidates: &[UnitId],
    needle: &str,
    visit: &mut dyn FnMut(&SearchResult) -> bool,
) -> Result<bool> {
    for batch in candidates.chunks(VERIFY_BATCH) {
        let records = store.fetch_units_by_ids(batch)?;
        for record in &records {
            if record.text.contains(needle) && !visit(record) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
