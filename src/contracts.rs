//! Debug-mode structural checks.
//!
//! Zero-cost in release builds (everything is `debug_assert!`); cheap early
//! failure during development and tests. Each function verifies one
//! structural property the query path silently relies on.

use crate::trigram::TrigramIndex;
use crate::types::{SourceRange, UnitId};

/// A posting list must be strictly increasing (sorted, duplicate-free).
#[inline]
pub fn check_posting_list_sorted(term: &str, ids: &[UnitId]) {
    debug_assert!(
        ids.windows(2).all(|pair| pair[0] < pair[1]),
        "posting list for {term:?} is not strictly increasing"
    );
}

/// Every term in the index has a non-empty, strictly increasing posting list.
pub fn check_postings_well_formed(index: &TrigramIndex) {
    if cfg!(debug_assertions) {
        for (term, ids) in index.entries() {
            debug_assert!(!ids.is_empty(), "posting list for {term:?} is empty");
            check_posting_list_sorted(term, ids);
        }
    }
}

/// Shard ranges must be internally ordered, sorted by `min_id`, and disjoint.
pub fn check_ranges_well_formed(ranges: &[SourceRange]) {
    if cfg!(debug_assertions) {
        for range in ranges {
            debug_assert!(
                range.min_id <= range.max_id,
                "range for {:?} has min {} > max {}",
                range.source,
                range.min_id,
                range.max_id
            );
        }
        for pair in ranges.windows(2) {
            debug_assert!(
                pair[0].max_id < pair[1].min_id,
                "ranges {:?} and {:?} overlap",
                pair[0].source,
                pair[1].source
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_ranges_pass() {
        check_ranges_well_formed(&[
            SourceRange {
                source: "a".to_string(),
                min_id: UnitId(1),
                max_id: UnitId(5),
            },
            SourceRange {
                source: "b".to_string(),
                min_id: UnitId(6),
                max_id: UnitId(6),
            },
        ]);
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn overlapping_ranges_panic_in_debug() {
        check_ranges_well_formed(&[
            SourceRange {
                source: "a".to_string(),
                min_id: UnitId(1),
                max_id: UnitId(10),
            },
            SourceRange {
                source: "b".to_string(),
                min_id: UnitId(5),
                max_id: UnitId(20),
            },
        ]);
    }

    #[test]
    fn sorted_posting_list_passes() {
        check_posting_list_sorted("abc", &[UnitId(1), UnitId(2), UnitId(9)]);
    }
}
