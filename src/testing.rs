//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation. It provides
//! the canonical fixture corpus so every test suite exercises the same data.

#![doc(hidden)]

use crate::dict::{Definition, DialectForm, HeadwordEntry, MemoryDictionary};
use crate::planner::Searcher;
use crate::store::MemoryCorpus;

/// Add one article with its units under a (possibly new) source.
pub fn add_article(
    corpus: &mut MemoryCorpus,
    source: &str,
    external_id: &str,
    title: &str,
    texts: &[&str],
) -> u64 {
    let source_id = corpus.add_source(source);
    let article_id = corpus
        .add_article(source_id, external_id, title)
        .expect("fixture source exists");
    for text in texts {
        corpus.add_unit(article_id, text).expect("fixture article exists");
    }
    article_id
}

/// The canonical multilingual fixture corpus.
///
/// Hand-counted facts tests rely on:
/// - 银行 occurs in exactly 3 wikipedia units and 2 baidu_baike units
/// - 选任 occurs literally in exactly one unit (inside 选任制); the
///   选举任命 unit has 选 and 任 non-adjacent
/// - 营商环境 and 君子 occur exactly once each
/// - "bank" occurs in both english_wiki units (once inside "banking";
///   matching is substring matching, not word matching)
/// - no unit of english_wiki contains any CJK text
pub fn sample_corpus() -> MemoryCorpus {
    let mut corpus = MemoryCorpus::new();
    add_article(
        &mut corpus,
        "wikipedia",
        "zh:12001",
        "银行",
        &[
            "银行是金融机构。",
            "银行吸收公众存款并发放贷款。",
            "现代银行提供多种金融服务。",
        ],
    );
    add_article(
        &mut corpus,
        "baidu_baike",
        "bk:88121",
        "金融市场",
        &[
            "金融市场包括货币市场和资本市场。",
            "各大银行在金融市场上竞争。",
            "银行利率由货币政策决定。",
        ],
    );
    add_article(
        &mut corpus,
        "news2016zh",
        "news:40233",
        "干部选任制度",
        &[
            "选任制是通过选举方式任用干部的制度。",
            "选举任命是两种不同的方式。",
            "该制度有助于营商环境改善。",
        ],
    );
    add_article(
        &mut corpus,
        "chinese_classics",
        "lunyu:1",
        "论语",
        &[
            "子曰：学而时习之，不亦说乎。",
            "君子和而不同，小人同而不和。",
        ],
    );
    add_article(
        &mut corpus,
        "english_wiki",
        "en:33074",
        "Banking",
        &[
            "A bank accepts deposits from the public.",
            "Commercial banking serves companies and individuals.",
        ],
    );
    corpus
}

/// A searcher over [`sample_corpus`] with both caches materialized.
pub fn sample_searcher() -> Searcher<MemoryCorpus> {
    Searcher::build(sample_corpus()).expect("fixture corpus builds")
}

/// A dictionary knowing 银行, for report cross-reference tests.
pub fn sample_dictionary() -> MemoryDictionary {
    let mut dict = MemoryDictionary::new();
    dict.insert(
        "银行",
        HeadwordEntry {
            definitions: vec![
                Definition {
                    lang: "en".to_string(),
                    text: "bank (financial institution)".to_string(),
                    source: "cc-cedict".to_string(),
                },
                Definition {
                    lang: "fr".to_string(),
                    text: "banque".to_string(),
                    source: "cfdict".to_string(),
                },
            ],
            dialect_forms: vec![
                DialectForm {
                    dialect: "cantonese".to_string(),
                    pronunciation: "ngan4 hong4".to_string(),
                    chars: None,
                    gloss: None,
                    source: "cc-canto".to_string(),
                },
                DialectForm {
                    dialect: "hokkien".to_string(),
                    pronunciation: "gîn-hâng".to_string(),
                    chars: Some("銀行".to_string()),
                    gloss: Some("bank".to_string()),
                    source: "itaigi".to_string(),
                },
            ],
        },
    );
    dict
}
