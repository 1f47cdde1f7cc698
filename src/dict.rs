//! The external dictionary collaborator.
//!
//! The dictionary lives in a separate system with its own construction and
//! translation pipelines; this crate only consumes headword lookups to
//! cross-reference a report. The collaborator is optional and unreliable by
//! contract: absence or failure must degrade gracefully; a report without a
//! dictionary section is a valid, non-error outcome.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The dictionary collaborator failed to answer.
#[derive(Debug, Error)]
#[error("dictionary unavailable: {0}")]
pub struct DictionaryError(pub String);

/// One definition in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub lang: String,
    pub text: String,
    pub source: String,
}

/// A dialect pronunciation record (e.g. Cantonese Jyutping, Hokkien POJ).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectForm {
    pub dialect: String,
    pub pronunciation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chars: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gloss: Option<String>,
    pub source: String,
}

/// Everything the dictionary knows about one headword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadwordEntry {
    pub definitions: Vec<Definition>,
    pub dialect_forms: Vec<DialectForm>,
}

/// Headword lookup. `Ok(None)` is "not in the dictionary" (common and fine);
/// `Err` is "the dictionary is unreachable" (reports omit the section and
/// log).
pub trait Dictionary {
    fn lookup_headword(&self, term: &str) -> Result<Option<HeadwordEntry>, DictionaryError>;
}

/// In-memory dictionary for tests and small deployments.
///
/// `set_failing(true)` makes every lookup error, to exercise the degraded
/// report path.
#[derive(Debug, Default)]
pub struct MemoryDictionary {
    entries: HashMap<String, HeadwordEntry>,
    failing: AtomicBool,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, headword: &str, entry: HeadwordEntry) {
        self.entries.insert(headword.to_string(), entry);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl Dictionary for MemoryDictionary {
    fn lookup_headword(&self, term: &str) -> Result<Option<HeadwordEntry>, DictionaryError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(DictionaryError("injected failure".to_string()));
        }
        Ok(self.entries.get(term).cloned())
    }
}
