//! RDF data model
//!
//! This module provides the immutable value types the store is built from:
//! - Terms: IRIs (`NamedNode`), blank nodes and literals
//! - Statements: subject-predicate-object plus a graph name
//! - Quad patterns: partially bound statements used for store lookups
//! - Vocabularies and namespace prefixes
//!
//! # Example
//!
//! ```rust
//! use quadstore::rdf::{Literal, NamedNode, Statement};
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let statement = Statement::new(subject, predicate, Literal::new_simple_literal("Alice"));
//!
//! assert!(statement.is_default_graph());
//! ```

mod types;
pub mod namespace;

pub use types::{
    BlankNode, GraphMatch, GraphName, Literal, NamedNode, QuadPattern, RdfError, RdfResult,
    RdfSubject, RdfTerm, Statement,
};

pub use namespace::{
    foaf, rdf, rdfs, xsd, Namespace, NamespaceManager, PrefixError, PrefixResult,
};
