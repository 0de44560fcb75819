//! Basic graph pattern queries
//!
//! Patterns are statements whose positions may hold variables. A [`Query`]
//! joins its patterns left to right against any
//! [`Queryable`](crate::enumerable::Queryable) source and yields
//! [`Solutions`].
//!
//! # Example
//!
//! ```rust
//! use quadstore::query::{Pattern, Query, Variable};
//! use quadstore::rdf::{foaf, rdf, NamedNode, Statement};
//! use quadstore::Store;
//!
//! let store = Store::new();
//! let alice = NamedNode::new("http://example.org/alice").unwrap();
//! let person = NamedNode::new(foaf::PERSON).unwrap();
//! let type_ = NamedNode::new(rdf::TYPE).unwrap();
//! store.insert(Statement::new(alice.clone(), type_.clone(), person.clone())).unwrap();
//!
//! let mut query = Query::default().pattern(Pattern::new(Variable::new("x"), type_, person));
//! let solutions = query.execute(&store).unwrap();
//! assert_eq!(solutions.len(), 1);
//! assert!(query.matched());
//! ```

pub mod executor;
pub mod optimizer;
pub mod pattern;
pub mod solution;

pub use executor::Query;
pub use optimizer::QueryOptimizer;
pub use pattern::{Pattern, PatternSlot, Variable};
pub use solution::{Solution, Solutions};

use thiserror::Error;

/// Query errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A required pattern follows an optional one
    #[error("Optional patterns must trail required ones (required pattern at index {index})")]
    OptionalNotTrailing {
        /// Position of the offending required pattern
        index: usize,
    },
}

pub type QueryResult<T> = Result<T, QueryError>;
