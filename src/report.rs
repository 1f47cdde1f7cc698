//! The word report: an aggregated, multi-source evidence summary for one
//! query term.
//!
//! A report answers "where does this word actually occur, and how is it
//! used?" with per-source hit counts, sampled example units per source, a
//! handful of context-expanded top snippets, and an optional dictionary
//! cross-reference. A term with zero hits produces a valid empty report;
//! that outcome is the whole point for lexicography workflows hunting words
//! that dictionaries are missing.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::context;
use crate::dict::{Dictionary, HeadwordEntry};
use crate::error::Result;
use crate::planner::Searcher;
use crate::store::CorpusStore;

/// Number of overall top snippets expanded with context.
const TOP_SNIPPETS: usize = 6;

/// Knobs for report construction.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Maximum search results to sample snippets from.
    pub limit: usize,
    /// Sampled example units kept per source.
    pub snippets_per_source: usize,
    /// Neighboring units included before/after each top snippet
    /// (0 = hit unit only, no context fetch).
    pub context_units: u32,
    /// Per-source counting cap.
    pub count_cap: u64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            limit: 30,
            snippets_per_source: 3,
            context_units: 2,
            count_cap: 10_000,
        }
    }
}

/// Evidence from a single corpus source.
///
/// `hit_count` comes from counting, `best_snippets` from bounded sampling;
/// a source can have a nonzero count with zero sampled snippets when the
/// sampling limit was spent elsewhere. That is expected, not inconsistent.
#[derive(Debug, Clone, Serialize)]
pub struct SourceEvidence {
    pub name: String,
    pub hit_count: u64,
    pub capped: bool,
    pub best_snippets: Vec<String>,
}

/// One of the overall top snippets, optionally context-expanded.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnippet {
    pub source: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Multi-source evidence report for a single term.
#[derive(Debug, Clone, Serialize)]
pub struct WordReport {
    pub term: String,
    pub total_hits: u64,
    /// True when any per-source count was capped; `total_hits` is then a
    /// lower bound.
    pub total_capped: bool,
    /// Ordered by hit count descending.
    pub sources: Vec<SourceEvidence>,
    pub best_snippets: Vec<ReportSnippet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<HeadwordEntry>,
}

/// Build a report for `term`.
///
/// Dictionary failures degrade to a report without that section; they never
/// fail the call.
pub fn build_report<S: CorpusStore>(
    searcher: &Searcher<S>,
    dictionary: Option<&dyn Dictionary>,
    term: &str,
    options: &ReportOptions,
) -> Result<WordReport> {
    let term = term.trim();

    let source_counts = searcher.count_hits_by_source(term, options.count_cap)?;
    let total_hits: u64 = source_counts.iter().map(|c| c.count).sum();
    let total_capped = source_counts.iter().any(|c| c.capped);

    let hits = searcher.search(term, options.limit)?;

    // Group sampled hits by source, first-encountered order (there is no
    // ranking to prefer one hit over another).
    let mut sampled: HashMap<&str, Vec<&str>> = HashMap::new();
    for hit in &hits {
        let bucket = sampled.entry(hit.source.as_str()).or_default();
        if bucket.len() < options.snippets_per_source {
            bucket.push(hit.text.as_str());
        }
    }

    let sources: Vec<SourceEvidence> = source_counts
        .iter()
        .map(|sc| SourceEvidence {
            name: sc.source.clone(),
            hit_count: sc.count,
            capped: sc.capped,
            best_snippets: sampled
                .get(sc.source.as_str())
                .map(|texts| texts.iter().map(|t| (*t).to_string()).collect())
                .unwrap_or_default(),
        })
        .collect();

    let mut best_snippets = Vec::new();
    for hit in hits.iter().take(TOP_SNIPPETS) {
        let expanded = if options.context_units > 0 {
            Some(
                context::context(
                    searcher.store(),
                    hit,
                    options.context_units,
                    options.context_units,
                )?
                .context,
            )
        } else {
            None
        };
        best_snippets.push(ReportSnippet {
            source: hit.source.clone(),
            title: hit.title.clone(),
            text: hit.text.clone(),
            context: expanded,
        });
    }

    let dictionary_entry = dictionary.and_then(|d| match d.lookup_headword(term) {
        Ok(entry) => entry,
        Err(err) => {
            warn!(term, %err, "dictionary lookup failed; omitting section");
            None
        }
    });

    Ok(WordReport {
        term: term.to_string(),
        total_hits,
        total_capped,
        sources,
        best_snippets,
        dictionary: dictionary_entry,
    })
}

/// Wrap every occurrence of `term` in `text` with `open`/`close` markers.
pub fn highlight(text: &str, term: &str, open: &str, close: &str) -> String {
    if term.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(term) {
        out.push_str(&rest[..pos]);
        out.push_str(open);
        out.push_str(term);
        out.push_str(close);
        rest = &rest[pos + term.len()..];
    }
    out.push_str(rest);
    out
}
