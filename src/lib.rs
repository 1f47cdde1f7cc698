//! Source-diverse trigram substring search over large multilingual corpora.
//!
//! Given a short query string, return the text units containing it, hit
//! counts broken down by provenance, neighboring context, and an aggregated
//! multi-source evidence report, with query cost bounded by the number of
//! sources, not the size of the corpus.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────────────────────────────┐
//! │ CorpusStore  │────▶│  derived, rebuildable structures             │
//! │ (trait seam, │     │  ┌─────────────┐ ┌──────────┐ ┌───────────┐  │
//! │  external)   │     │  │TrigramIndex │ │Vocabulary│ │ ShardMap  │  │
//! └──────┬───────┘     │  └──────┬──────┘ └────┬─────┘ └─────┬─────┘  │
//!        │             └─────────┼─────────────┼─────────────┼────────┘
//!        │                       ▼             ▼             ▼
//!        │              ┌─────────────────────────────────────┐
//!        ├─────────────▶│        Searcher (query planner)     │
//!        │              │ search · count_hits · count_by_src  │
//!        │              └───────────────┬─────────────────────┘
//!        │                              ▼
//!        │              ┌──────────────────────────────────────┐
//!        └─────────────▶│  context expansion │ word report     │
//!                       └──────────────────────────────────────┘
//! ```
//!
//! Data flows one way: the store feeds three derived structures, the planner
//! reads all of them, and the context/report layers consume planner output
//! plus the store. The derived structures are caches: always reconstructible
//! from the store, swapped whole, never patched in place.
//!
//! # What this crate deliberately does not do
//!
//! - **No relevance ranking.** Ranking at 100M+ units costs what this design
//!   exists to avoid. Result order is posting order within a source-diverse
//!   walk; callers impose their own ordering if they need one.
//! - **No exhaustive counts for very frequent terms.** Counting is capped and
//!   the cap is always visible to the caller via [`HitCount`]'s `capped` flag.
//! - **No ingestion.** Segmentation and import pipelines live elsewhere and
//!   talk to the store; this crate only reads.
//!
//! # Usage
//!
//! ```
//! use trigrep::{MemoryCorpus, Searcher, ReportOptions};
//!
//! let mut corpus = MemoryCorpus::new();
//! let wiki = corpus.add_source("wikipedia");
//! let article = corpus.add_article(wiki, "zh:1", "银行").unwrap();
//! corpus.add_unit(article, "银行是金融机构。").unwrap();
//!
//! let searcher = Searcher::build(corpus).unwrap();
//! let hits = searcher.search("银行", 10).unwrap();
//! assert_eq!(hits.len(), 1);
//!
//! let report = trigrep::build_report(&searcher, None, "银行",
//!     &ReportOptions::default()).unwrap();
//! assert_eq!(report.total_hits, 1);
//! ```

// Module declarations
mod context;
pub mod contracts;
mod dict;
mod error;
mod planner;
mod report;
mod shards;
mod store;
pub mod testing;
mod trigram;
mod types;
mod vocab;

// Re-exports for the public API
pub use context::{context, full_article};
pub use dict::{Definition, DialectForm, Dictionary, DictionaryError, HeadwordEntry, MemoryDictionary};
pub use error::{Error, Result};
pub use planner::Searcher;
pub use report::{build_report, highlight, ReportOptions, ReportSnippet, SourceEvidence, WordReport};
pub use shards::{ShardCache, ShardMap};
pub use store::{CorpusStore, MemoryCorpus};
pub use trigram::{trigrams, TrigramIndex, TRIGRAM_LEN};
pub use types::{
    Article, ContextPassage, CorpusStats, HitCount, SearchResult, Source, SourceCount, SourceRange,
    SourceStats, TextUnit, UnitId,
};
pub use vocab::{VocabEntry, Vocabulary};
