//! Property-based tests using proptest.
//!
//! These pin the crate's core invariants over randomly generated corpora:
//! every result is a literal substring match, limits always bound result
//! counts, uncapped counts agree with brute force, and large-limit searches
//! are complete.

use proptest::prelude::*;
use trigrep::{CorpusStore, MemoryCorpus, Searcher, UnitId};

/// Small alphabet with heavy repetition so random corpora actually share
/// trigrams with random query terms.
const ALPHABET: [char; 12] = [
    '银', '行', '选', '任', '制', '金', '融', '的', '山', 'a', 'b', '。',
];

fn unit_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 0..12)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Unit texts grouped per source (each source imported contiguously).
fn corpus_texts() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(unit_text(), 1..6), 1..4)
}

fn term() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 1..5)
        .prop_map(|chars| chars.into_iter().collect())
}

fn build_searcher(per_source: &[Vec<String>]) -> Searcher<MemoryCorpus> {
    let mut corpus = MemoryCorpus::new();
    for (i, texts) in per_source.iter().enumerate() {
        let source_id = corpus.add_source(&format!("source_{i}"));
        let article_id = corpus
            .add_article(source_id, &format!("ext_{i}"), &format!("Article {i}"))
            .unwrap();
        for text in texts {
            corpus.add_unit(article_id, text).unwrap();
        }
    }
    Searcher::build(corpus).unwrap()
}

/// Units reachable by search: at least one trigram, text contains the term.
fn reachable_matches(searcher: &Searcher<MemoryCorpus>, term: &str) -> Vec<UnitId> {
    let mut ids = Vec::new();
    searcher
        .store()
        .for_each_unit(&mut |unit| {
            if unit.char_count >= 3 && unit.text.contains(term) {
                ids.push(unit.id);
            }
        })
        .unwrap();
    ids
}

proptest! {
    #[test]
    fn every_result_contains_the_term(
        texts in corpus_texts(),
        query in term(),
    ) {
        let searcher = build_searcher(&texts);
        for hit in searcher.search(&query, 50).unwrap() {
            prop_assert!(
                hit.text.contains(&query),
                "{:?} does not contain {:?}", hit.text, query
            );
        }
    }

    #[test]
    fn limit_always_bounds_result_count(
        texts in corpus_texts(),
        query in term(),
        limit in 0usize..8,
    ) {
        let searcher = build_searcher(&texts);
        prop_assert!(searcher.search(&query, limit).unwrap().len() <= limit);
    }

    #[test]
    fn uncapped_count_agrees_with_brute_force(
        texts in corpus_texts(),
        query in term(),
    ) {
        let searcher = build_searcher(&texts);
        let expected = reachable_matches(&searcher, &query).len() as u64;
        let count = searcher.count_hits(&query, 1_000_000).unwrap();
        prop_assert_eq!(count.count, expected);
        prop_assert!(!count.capped);
    }

    #[test]
    fn large_limit_search_is_complete(
        texts in corpus_texts(),
        query in term(),
    ) {
        let searcher = build_searcher(&texts);
        let expected = reachable_matches(&searcher, &query);
        let mut got: Vec<UnitId> = searcher
            .search(&query, 10_000)
            .unwrap()
            .iter()
            .map(|h| h.unit_id)
            .collect();
        got.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn per_source_counts_sum_to_global_count(
        texts in corpus_texts(),
        query in term(),
    ) {
        let searcher = build_searcher(&texts);
        let global = searcher.count_hits(&query, 1_000_000).unwrap();
        let per_source: u64 = searcher
            .count_hits_by_source(&query, 1_000_000)
            .unwrap()
            .iter()
            .map(|c| c.count)
            .sum();
        prop_assert_eq!(per_source, global.count);
    }

    #[test]
    fn shard_ranges_are_deterministic(texts in corpus_texts()) {
        let first = build_searcher(&texts);
        let second = build_searcher(&texts);
        prop_assert_eq!(
            first.store().source_ranges().unwrap(),
            second.store().source_ranges().unwrap()
        );
    }

    #[test]
    fn searches_are_deterministic_across_rebuilds(
        texts in corpus_texts(),
        query in term(),
    ) {
        let first = build_searcher(&texts);
        let second = build_searcher(&texts);
        let a: Vec<UnitId> = first.search(&query, 20).unwrap()
            .iter().map(|h| h.unit_id).collect();
        let b: Vec<UnitId> = second.search(&query, 20).unwrap()
            .iter().map(|h| h.unit_id).collect();
        prop_assert_eq!(a, b);
    }
}
