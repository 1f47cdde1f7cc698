//! Search and counting integration tests.
//!
//! The multi-source scenarios here pin the crate's central promises: results
//! are literal substring matches, sampled across sources, bounded by the
//! limit, and counts are per-source with visible caps.

mod common;

use common::{dense_sparse_corpus, multi_range_corpus, sample_searcher, searcher_over};
use trigrep::{HitCount, UnitId};

// ============================================================================
// DIRECT MATCHING (terms spanning >= 1 trigram)
// ============================================================================

#[test]
fn every_result_contains_the_term() {
    let searcher = sample_searcher();
    for term in ["银行", "金融", "选任制", "营商环境", "bank"] {
        for hit in searcher.search(term, 10).unwrap() {
            assert!(
                hit.text.contains(term),
                "result {:?} does not contain {term:?}",
                hit.text
            );
        }
    }
}

#[test]
fn finds_four_char_compound() {
    let searcher = sample_searcher();
    let hits = searcher.search("营商环境", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, "news2016zh");
}

#[test]
fn finds_classical_term() {
    let searcher = sample_searcher();
    let hits = searcher.search("君子", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, "chinese_classics");
}

#[test]
fn finds_latin_script_term() {
    // Substring matching, not word matching: "banking" counts as a hit.
    let searcher = sample_searcher();
    let hits = searcher.search("bank", 10).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.source == "english_wiki"));
    assert!(hits.iter().any(|h| h.text.contains("banking")));
}

// ============================================================================
// SOURCE-DIVERSE SAMPLING
// ============================================================================

#[test]
fn results_are_sampled_across_sources() {
    // 银行 lives in 3 wikipedia units (ids 1-3) and 2 baidu_baike units
    // (ids 5-6). With limit 10 over 5 sources the per-source bound is 2,
    // so neither source may fill the result list alone.
    let searcher = sample_searcher();
    let hits = searcher.search("银行", 10).unwrap();
    assert!(hits.len() <= 10);
    let ids: Vec<UnitId> = hits.iter().map(|h| h.unit_id).collect();
    assert_eq!(ids, vec![UnitId(1), UnitId(2), UnitId(5), UnitId(6)]);
    assert!(hits.iter().any(|h| h.source == "wikipedia"));
    assert!(hits.iter().any(|h| h.source == "baidu_baike"));
}

#[test]
fn result_order_is_posting_order_not_relevance() {
    // Documented behavior: no ranking. Order is the shard walk (ranges by
    // ascending min_id) with ascending unit ids inside each source.
    let searcher = sample_searcher();
    let hits = searcher.search("银行", 10).unwrap();
    let sources: Vec<&str> = hits.iter().map(|h| h.source.as_str()).collect();
    assert_eq!(
        sources,
        vec!["wikipedia", "wikipedia", "baidu_baike", "baidu_baike"]
    );
}

#[test]
fn limit_is_respected() {
    let searcher = sample_searcher();
    for limit in [0, 1, 2, 3, 10] {
        assert!(searcher.search("银行", limit).unwrap().len() <= limit);
    }
}

#[test]
fn per_source_counts_match_scenario() {
    let searcher = sample_searcher();
    let counts = searcher.count_hits_by_source("银行", 10_000).unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].source, "wikipedia");
    assert_eq!(counts[0].count, 3);
    assert!(!counts[0].capped);
    assert_eq!(counts[1].source, "baidu_baike");
    assert_eq!(counts[1].count, 2);
    assert!(!counts[1].capped);
}

#[test]
fn zero_hit_sources_are_omitted() {
    let searcher = sample_searcher();
    let counts = searcher.count_hits_by_source("君子", 10_000).unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].source, "chinese_classics");
}

// ============================================================================
// SHORT-TERM EXPANSION (sub-trigram queries)
// ============================================================================

#[test]
fn two_char_term_found_via_expansion() {
    // 选任 never stands alone as a trigram; it is only reachable through
    // the vocabulary trigram 选任制.
    let searcher = sample_searcher();
    let hits = searcher.search("选任", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].text.contains("选任"));
    assert_eq!(hits[0].source, "news2016zh");
}

#[test]
fn expansion_does_not_match_non_adjacent_characters() {
    // 选举任命 contains 选 and 任 separated by 举; it must not match 选任.
    let searcher = sample_searcher();
    let hits = searcher.search("选任", 10).unwrap();
    assert!(hits.iter().all(|h| !h.text.contains("选举任命")));
}

#[test]
fn single_char_term_found_via_expansion() {
    let searcher = sample_searcher();
    let hits = searcher.search("君", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].text.contains('君'));
}

#[test]
fn short_term_counts_are_verified() {
    let searcher = sample_searcher();
    assert_eq!(
        searcher.count_hits("选任", 10_000).unwrap(),
        HitCount::exact(1)
    );
}

// ============================================================================
// CAPPED COUNTING
// ============================================================================

#[test]
fn count_hits_caps_and_flags() {
    let searcher = sample_searcher();
    assert_eq!(
        searcher.count_hits("银行", 10_000).unwrap(),
        HitCount::exact(5)
    );
    let capped = searcher.count_hits("银行", 3).unwrap();
    assert_eq!(capped.count, 3);
    assert!(capped.capped);
}

#[test]
fn dense_source_caps_while_sparse_counts_exactly() {
    let searcher = searcher_over(dense_sparse_corpus());
    let counts = searcher.count_hits_by_source("目标词", 5).unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].source, "dense");
    assert_eq!(counts[0].count, 5);
    assert!(counts[0].capped);
    assert_eq!(counts[1].source, "sparse");
    assert_eq!(counts[1].count, 2);
    assert!(!counts[1].capped);
}

// ============================================================================
// MULTI-RANGE SOURCES (incremental imports)
// ============================================================================

#[test]
fn counts_aggregate_across_a_sources_ranges() {
    let searcher = searcher_over(multi_range_corpus());
    let counts = searcher.count_hits_by_source("目标词", 10_000).unwrap();
    assert_eq!(counts[0].source, "wikipedia");
    assert_eq!(counts[0].count, 4);
    assert_eq!(counts[1].source, "baidu_baike");
    assert_eq!(counts[1].count, 1);
}

#[test]
fn search_finds_hits_in_every_range_of_a_source() {
    let searcher = searcher_over(multi_range_corpus());
    let hits = searcher.search("目标词", 100).unwrap();
    assert_eq!(hits.len(), 5);
    assert!(hits.iter().any(|h| h.title == "第一批"));
    assert!(hits.iter().any(|h| h.title == "第二批"));
}

// ============================================================================
// UNSHARDED FALLBACK
// ============================================================================

#[test]
fn fallback_returns_the_same_hits_as_sharded_search() {
    let searcher = sample_searcher();
    let mut sharded: Vec<UnitId> = searcher
        .search("银行", 100)
        .unwrap()
        .iter()
        .map(|h| h.unit_id)
        .collect();
    searcher.invalidate_shards();
    let mut fallback: Vec<UnitId> = searcher
        .search("银行", 100)
        .unwrap()
        .iter()
        .map(|h| h.unit_id)
        .collect();
    sharded.sort_unstable();
    fallback.sort_unstable();
    assert_eq!(sharded, fallback);
}

#[test]
fn fallback_counts_by_source_agree() {
    let searcher = sample_searcher();
    let sharded = searcher.count_hits_by_source("银行", 10_000).unwrap();
    searcher.invalidate_shards();
    let fallback = searcher.count_hits_by_source("银行", 10_000).unwrap();
    assert_eq!(sharded, fallback);

    // Rebuild restores the bounded path.
    searcher.rebuild_shards().unwrap();
    assert_eq!(
        searcher.count_hits_by_source("银行", 10_000).unwrap(),
        sharded
    );
}

#[test]
fn fallback_counts_agree_for_expanded_terms() {
    let searcher = sample_searcher();
    let sharded = searcher.count_hits_by_source("选任", 10_000).unwrap();
    searcher.invalidate_shards();
    let fallback = searcher.count_hits_by_source("选任", 10_000).unwrap();
    assert_eq!(sharded, fallback);
}
