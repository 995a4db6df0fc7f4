//! Field-scoped search over the catalog.
//!
//! A raw query such as `artist:"hyji" tag:"dog%cat" school` is tokenized,
//! classified into a [`FilterSet`], resolved per filter key into candidate
//! [`IdSet`]s and combined:
//!
//! - distinct keys are ANDed (set intersection)
//! - repeated values of a reference key (`tag:"dog%cat"`) are ANDed too
//! - title terms are joined into one phrase and matched as a substring
//! - a key whose value matches no reference row empties the whole search

mod engine;
mod id_set;
mod query;
mod resolver;

pub use engine::{combine, SearchEngine};
pub use id_set::{intersect_all, IdSet, ItemId};
pub use query::{tokenize, FilterKey, FilterSet, Token};

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Lookup failed: {0}")]
    Store(#[from] StoreError),
}
