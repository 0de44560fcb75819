//! Persistent storage structures
//!
//! Copy-on-write building blocks for the quad store:
//! - `hamt`: persistent hash map / set with structural sharing
//! - `dataset`: the nested graph → subject → predicate → object root

pub mod dataset;
pub mod hamt;

pub use dataset::{Dataset, GraphMap, ObjectSet, PredicateMap, StatementIter, SubjectMap};
pub use hamt::{HamtMap, HamtSet};
