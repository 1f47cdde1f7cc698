//! Shared test fixtures.
//!
//! The canonical corpus lives in `trigrep::testing` so unit tests and
//! integration tests exercise identical data; this module adds builders for
//! shapes individual suites need (dense/sparse sources for cap tests,
//! multi-range sources for incremental-import tests).

#![allow(dead_code)]

use trigrep::testing::add_article;
use trigrep::{MemoryCorpus, Searcher};

pub use trigrep::testing::{sample_corpus, sample_dictionary, sample_searcher};

/// A corpus where "目标词" appears in 8 units of `dense` and 2 of `sparse`.
pub fn dense_sparse_corpus() -> MemoryCorpus {
    let mut corpus = MemoryCorpus::new();
    let dense_texts: Vec<String> = (0..8).map(|i| format!("目标词出现第{i}次。")).collect();
    let dense_refs: Vec<&str> = dense_texts.iter().map(String::as_str).collect();
    add_article(&mut corpus, "dense", "d:1", "密集", &dense_refs);
    add_article(
        &mut corpus,
        "sparse",
        "s:1",
        "稀疏",
        &["目标词偶尔出现。", "目标词再次出现。", "这里没有它。"],
    );
    corpus
}

/// A corpus where `wikipedia` was imported in two disjoint batches with
/// `baidu_baike` in between, giving it two id ranges.
pub fn multi_range_corpus() -> MemoryCorpus {
    let mut corpus = MemoryCorpus::new();
    add_article(
        &mut corpus,
        "wikipedia",
        "w:1",
        "第一批",
        &["目标词在第一批。", "目标词再次在第一批。"],
    );
    add_article(&mut corpus, "baidu_baike", "b:1", "中间", &["目标词在中间批。"]);
    add_article(
        &mut corpus,
        "wikipedia",
        "w:2",
        "第二批",
        &["目标词在第二批。", "目标词又在第二批。"],
    );
    corpus
}

pub fn searcher_over(corpus: MemoryCorpus) -> Searcher<MemoryCorpus> {
    Searcher::build(corpus).expect("test corpus builds")
}
