//! Quadstore
//!
//! An in-memory RDF quad store with copy-on-write structural sharing,
//! optimistic transactions and a basic graph pattern query engine.
//!
//! # Architecture
//!
//! - `rdf`: term model, statements and vocabulary tables
//! - `storage`: persistent HAMT maps and the nested quad index built on them
//! - `store`: the published root, snapshots, changesets and transactions
//! - `query`: patterns, solutions and the BGP executor
//! - `enumerable`: capability traits shared by every readable source
//!
//! Writes never modify a published root. Each one builds a new root that
//! shares untouched sub-trees with the previous one and swaps it in under a
//! lock, so snapshots and transactions read a fixed, consistent view for free.
//!
//! ## Example Usage
//!
//! ```rust
//! use quadstore::query::{Pattern, Query, Variable};
//! use quadstore::rdf::{foaf, rdf, Literal, NamedNode, Statement};
//! use quadstore::Store;
//!
//! let store = Store::new();
//! let alice = NamedNode::new("http://example.org/alice").unwrap();
//! let type_ = NamedNode::new(rdf::TYPE).unwrap();
//! let person = NamedNode::new(foaf::PERSON).unwrap();
//! let name = NamedNode::new(foaf::NAME).unwrap();
//!
//! store
//!     .transact(|tx| {
//!         tx.insert(Statement::new(alice.clone(), type_.clone(), person.clone()))?;
//!         tx.insert(Statement::new(alice.clone(), name.clone(), Literal::new_simple_literal("Alice")))
//!     })
//!     .unwrap();
//!
//! let mut query = Query::default()
//!     .pattern(Pattern::new(Variable::new("x"), type_, person))
//!     .pattern(Pattern::new(Variable::new("x"), name, Variable::new("n")));
//! let solutions = query.execute(&store).unwrap();
//!
//! assert_eq!(solutions.len(), 1);
//! assert_eq!(solutions.first().unwrap().get("n").unwrap().to_string(), "\"Alice\"");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod enumerable;
pub mod query;
pub mod rdf;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use enumerable::{Enumerable, Mutable, Queryable};

pub use query::{
    Pattern, PatternSlot, Query, QueryError, QueryOptimizer, QueryResult, Solution, Solutions,
    Variable,
};

pub use rdf::{
    BlankNode, GraphMatch, GraphName, Literal, NamedNode, Namespace, NamespaceManager, QuadPattern,
    RdfError, RdfResult, RdfSubject, RdfTerm, Statement,
};

pub use storage::{Dataset, HamtMap, HamtSet, StatementIter};

pub use store::{
    Changeset, Feature, GraphView, IsolationLevel, Snapshot, Store, StoreConfig, StoreError,
    StoreResult, Transaction, TransactionError, TransactionResult, TransactionState,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
