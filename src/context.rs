//! Context expansion: neighboring units around a search hit.
//!
//! Like `grep -C`: a hit plus `before` units above and `after` units below,
//! all from the same article, joined in sequence order. The window is clamped
//! at the article start; an article that ends early simply yields fewer units
//! than requested. That is expected, not an error.

use crate::error::Result;
use crate::store::CorpusStore;
use crate::types::{ContextPassage, SearchResult};

/// Expand a hit into a window of surrounding units.
pub fn context<S: CorpusStore>(
    store: &S,
    hit: &SearchResult,
    before: u32,
    after: u32,
) -> Result<ContextPassage> {
    let lo = hit.seq.saturating_sub(before);
    let hi = hit.seq.saturating_add(after);
    let units = store.fetch_units_in_sequence_range(hit.article_id, lo, hi)?;

    let hit_index = units
        .iter()
        .position(|u| u.seq == hit.seq)
        .unwrap_or(0);
    let context = units
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ContextPassage {
        source: hit.source.clone(),
        title: hit.title.clone(),
        hit_text: hit.text.clone(),
        context,
        hit_index,
        chunk_count: units.len(),
    })
}

/// All units of an article joined as full text, in sequence order.
pub fn full_article<S: CorpusStore>(store: &S, article_id: u64) -> Result<String> {
    let units = store.fetch_units_in_sequence_range(article_id, 0, u32::MAX)?;
    Ok(units
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}
