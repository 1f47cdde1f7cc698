//! Crate error type.
//!
//! The error surface is deliberately small: almost every degraded condition
//! in the query path (missing shard map, empty short-query expansion, capped
//! counts, unavailable dictionary, malformed terms) degrades to a well-defined
//! result instead of erroring. What remains is failure of the corpus store
//! itself, which callers cannot work around.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The corpus store failed to answer a read.
    #[error("corpus store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
