//! The corpus store seam.
//!
//! The store is an external collaborator: something else owns segmentation,
//! import pipelines, and durable persistence. This crate only ever *reads*
//! from it at query time, through the [`CorpusStore`] trait. Everything the
//! index, shard map, and planner need is expressible as five read operations.
//!
//! [`MemoryCorpus`] is the in-process implementation used for tests, benches,
//! and small corpora. It assigns unit ids monotonically on insert, which is
//! the property the shard map's contiguous-range model relies on.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::types::{
    Article, CorpusStats, SearchResult, Source, SourceRange, SourceStats, TextUnit, UnitId,
};

/// Read-only access to the corpus.
///
/// All methods are pure reads; implementations must be safe to call from any
/// number of concurrent query threads. Batch ingestion happens elsewhere,
/// behind a single writer committing between queries.
pub trait CorpusStore {
    /// One entry per contiguous run of unit ids belonging to a single source,
    /// ordered by `min_id`. A source imported in several disjoint batches
    /// yields several entries.
    fn source_ranges(&self) -> Result<Vec<SourceRange>>;

    /// Fetch full records for the given unit ids, resolving article title and
    /// source name. Output preserves input order; unknown ids are skipped,
    /// not errors.
    fn fetch_units_by_ids(&self, ids: &[UnitId]) -> Result<Vec<SearchResult>>;

    /// All units of one article with sequence index in `lo..=hi`, ordered by
    /// sequence index. An unknown article or an empty window yields an empty
    /// vector.
    fn fetch_units_in_sequence_range(
        &self,
        article_id: u64,
        lo: u32,
        hi: u32,
    ) -> Result<Vec<TextUnit>>;

    /// Visit every unit in ascending id order. Used to (re)build the trigram
    /// index; never called on the query path.
    fn for_each_unit(&self, visit: &mut dyn FnMut(&TextUnit)) -> Result<()>;

    /// Whole-corpus statistics broken down by source.
    fn stats(&self) -> Result<CorpusStats>;
}

/// In-memory corpus store.
///
/// Ids for articles and units are assigned in strictly increasing order.
/// Units are immutable; [`MemoryCorpus::replace_unit`] is the
/// delete-then-reinsert mutation path and hands back both the removed and the
/// inserted unit so the caller can keep the trigram index in sync.
#[derive(Debug, Default)]
pub struct MemoryCorpus {
    sources: Vec<Source>,
    source_ids: HashMap<String, u32>,
    articles: HashMap<u64, Article>,
    /// Unit id -> unit, in id order (drives `source_ranges` and scans).
    units: BTreeMap<UnitId, TextUnit>,
    /// Article id -> unit id per sequence index.
    article_units: HashMap<u64, Vec<UnitId>>,
    next_article_id: u64,
    next_unit_id: u64,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a source, returning its id.
    pub fn add_source(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.source_ids.get(name) {
            return id;
        }
        let id = self.sources.len() as u32 + 1;
        self.sources.push(Source {
            id,
            name: name.to_string(),
            article_count: 0,
            unit_count: 0,
        });
        self.source_ids.insert(name.to_string(), id);
        id
    }

    /// Insert an article under an existing source, returning its id.
    pub fn add_article(&mut self, source_id: u32, external_id: &str, title: &str) -> Result<u64> {
        let source = (source_id as usize)
            .checked_sub(1)
            .and_then(|idx| self.sources.get_mut(idx))
            .ok_or_else(|| Error::Store(format!("source {source_id} not found")))?;
        source.article_count += 1;
        self.next_article_id += 1;
        let id = self.next_article_id;
        self.articles.insert(
            id,
            Article {
                id,
                source_id,
                external_id: external_id.to_string(),
                title: title.to_string(),
                char_count: 0,
            },
        );
        self.article_units.insert(id, Vec::new());
        Ok(id)
    }

    /// Append a unit to an article. The sequence index is the article's next
    /// free slot; the unit id is the corpus-wide next id.
    pub fn add_unit(&mut self, article_id: u64, text: &str) -> Result<UnitId> {
        let article = self
            .articles
            .get_mut(&article_id)
            .ok_or_else(|| Error::Store(format!("article {article_id} not found")))?;
        let char_count = text.chars().count();
        article.char_count += char_count;
        let source_idx = article.source_id as usize - 1;

        self.next_unit_id += 1;
        let id = UnitId(self.next_unit_id);
        let slots = self.article_units.entry(article_id).or_default();
        let seq = slots.len() as u32;
        slots.push(id);

        self.units.insert(
            id,
            TextUnit {
                id,
                article_id,
                seq,
                text: text.to_string(),
                char_count,
            },
        );
        self.sources[source_idx].unit_count += 1;
        Ok(id)
    }

    /// Delete-then-reinsert a unit with new text, keeping its article and
    /// sequence position. Returns `(removed, inserted)`; the caller is
    /// responsible for removing the old text from the trigram index and
    /// indexing the new one.
    ///
    /// The reinserted unit gets a fresh id at the top of the id space, so the
    /// owning source gains a second id range until the shard map is rebuilt.
    pub fn replace_unit(&mut self, id: UnitId, new_text: &str) -> Result<(TextUnit, TextUnit)> {
        let old = self
            .units
            .remove(&id)
            .ok_or_else(|| Error::Store(format!("unit {id} not found")))?;
        let char_count = new_text.chars().count();
        if let Some(article) = self.articles.get_mut(&old.article_id) {
            article.char_count = article.char_count - old.char_count + char_count;
        }

        self.next_unit_id += 1;
        let new_id = UnitId(self.next_unit_id);
        let new_unit = TextUnit {
            id: new_id,
            article_id: old.article_id,
            seq: old.seq,
            text: new_text.to_string(),
            char_count,
        };
        if let Some(slots) = self.article_units.get_mut(&old.article_id) {
            if let Some(slot) = slots.get_mut(old.seq as usize) {
                *slot = new_id;
            }
        }
        self.units.insert(new_id, new_unit.clone());
        Ok((old, new_unit))
    }

    /// Look up a single unit.
    pub fn unit(&self, id: UnitId) -> Option<&TextUnit> {
        self.units.get(&id)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn source_name_of(&self, article_id: u64) -> Option<&str> {
        let article = self.articles.get(&article_id)?;
        self.sources
            .get(article.source_id as usize - 1)
            .map(|s| s.name.as_str())
    }
}

impl CorpusStore for MemoryCorpus {
    fn source_ranges(&self) -> Result<Vec<SourceRange>> {
        let mut ranges: Vec<SourceRange> = Vec::new();
        for unit in self.units.values() {
            let Some(name) = self.source_name_of(unit.article_id) else {
                continue;
            };
            match ranges.last_mut() {
                // Extend the current run while the source stays the same.
                Some(last) if last.source == name => last.max_id = unit.id,
                _ => ranges.push(SourceRange {
                    source: name.to_string(),
                    min_id: unit.id,
                    max_id: unit.id,
                }),
            }
        }
        Ok(ranges)
    }

    fn fetch_units_by_ids(&self, ids: &[UnitId]) -> Result<Vec<SearchResult>> {
        let mut records = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(unit) = self.units.get(&id) else {
                continue;
            };
            let Some(article) = self.articles.get(&unit.article_id) else {
                continue;
            };
            let Some(source) = self.sources.get(article.source_id as usize - 1) else {
                continue;
            };
            records.push(SearchResult {
                unit_id: unit.id,
                text: unit.text.clone(),
                source: source.name.clone(),
                title: article.title.clone(),
                article_id: article.id,
                seq: unit.seq,
            });
        }
        Ok(records)
    }

    fn fetch_units_in_sequence_range(
        &self,
        article_id: u64,
        lo: u32,
        hi: u32,
    ) -> Result<Vec<TextUnit>> {
        if hi < lo {
            return Ok(Vec::new());
        }
        let Some(slots) = self.article_units.get(&article_id) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for &unit_id in slots
            .iter()
            .skip(lo as usize)
            .take((hi as usize - lo as usize).saturating_add(1))
        {
            if let Some(unit) = self.units.get(&unit_id) {
                out.push(unit.clone());
            }
        }
        Ok(out)
    }

    fn for_each_unit(&self, visit: &mut dyn FnMut(&TextUnit)) -> Result<()> {
        for unit in self.units.values() {
            visit(unit);
        }
        Ok(())
    }

    fn stats(&self) -> Result<CorpusStats> {
        let sources: Vec<SourceStats> = self
            .sources
            .iter()
            .map(|s| SourceStats {
                name: s.name.clone(),
                article_count: s.article_count,
                unit_count: s.unit_count,
            })
            .collect();
        Ok(CorpusStats {
            article_count: sources.iter().map(|s| s.article_count).sum(),
            unit_count: sources.iter().map(|s| s.unit_count).sum(),
            sources,
        })
    }
}
