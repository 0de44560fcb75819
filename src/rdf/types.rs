//! RDF type definitions
//!
//! This module provides wrapper types around the oxrdf library for RDF primitives,
//! plus the quad-level `Statement` and the store-level `QuadPattern` filter.

use oxrdf::{
    BlankNode as OxBlankNode,
    Literal as OxLiteral,
    NamedNode as OxNamedNode,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RDF errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node from an IRI string
    pub fn new(iri: &str) -> RdfResult<Self> {
        OxNamedNode::new(iri)
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(e.to_string()))
    }

    /// Create a named node without validating the IRI.
    ///
    /// Only for IRIs known to be valid, such as vocabulary constants.
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(OxNamedNode::new_unchecked(iri))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(node: NamedNode) -> Self {
        node.0
    }
}

/// Blank node (anonymous node)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a new blank node with a unique identifier
    pub fn new() -> Self {
        Self(OxBlankNode::default())
    }

    /// Create a blank node from a string identifier
    pub fn with_id(id: &str) -> RdfResult<Self> {
        OxBlankNode::new(id)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for BlankNode {
    type Err = RdfError;

    fn from_str(s: &str) -> RdfResult<Self> {
        Self::with_id(s)
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.as_str())
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

/// RDF literal value
///
/// Equality is structural: lexical value, datatype and language tag must all
/// match. `"1"^^xsd:integer` and `"01"^^xsd:integer` are different terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (plain string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with language tag
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        OxLiteral::new_language_tagged_literal(value, language)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype
    pub fn datatype(&self) -> NamedNode {
        NamedNode(self.0.datatype().into_owned())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // oxrdf writes the N-Triples form, escapes included
        write!(f, "{}", self.0)
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

/// RDF subject (NamedNode or BlankNode)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfSubject {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
}

impl fmt::Display for RdfSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfSubject::NamedNode(n) => write!(f, "{}", n),
            RdfSubject::BlankNode(b) => write!(f, "{}", b),
        }
    }
}

impl From<NamedNode> for RdfSubject {
    fn from(node: NamedNode) -> Self {
        RdfSubject::NamedNode(node)
    }
}

impl From<BlankNode> for RdfSubject {
    fn from(node: BlankNode) -> Self {
        RdfSubject::BlankNode(node)
    }
}

/// RDF term (any RDF value)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfTerm {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
    /// Literal value
    Literal(Literal),
}

impl RdfTerm {
    /// Reinterpret the term as a subject; literals cannot be subjects
    pub fn to_subject(&self) -> Option<RdfSubject> {
        match self {
            RdfTerm::NamedNode(n) => Some(RdfSubject::NamedNode(n.clone())),
            RdfTerm::BlankNode(b) => Some(RdfSubject::BlankNode(b.clone())),
            RdfTerm::Literal(_) => None,
        }
    }

    /// Reinterpret the term as a predicate IRI
    pub fn to_named_node(&self) -> Option<NamedNode> {
        match self {
            RdfTerm::NamedNode(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// Reinterpret the term as a graph name
    pub fn to_graph_name(&self) -> Option<GraphName> {
        match self {
            RdfTerm::NamedNode(n) => Some(GraphName::NamedNode(n.clone())),
            RdfTerm::BlankNode(b) => Some(GraphName::BlankNode(b.clone())),
            RdfTerm::Literal(_) => None,
        }
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfTerm::NamedNode(n) => write!(f, "{}", n),
            RdfTerm::BlankNode(b) => write!(f, "{}", b),
            RdfTerm::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<NamedNode> for RdfTerm {
    fn from(node: NamedNode) -> Self {
        RdfTerm::NamedNode(node)
    }
}

impl From<BlankNode> for RdfTerm {
    fn from(node: BlankNode) -> Self {
        RdfTerm::BlankNode(node)
    }
}

impl From<Literal> for RdfTerm {
    fn from(lit: Literal) -> Self {
        RdfTerm::Literal(lit)
    }
}

impl From<RdfSubject> for RdfTerm {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => RdfTerm::NamedNode(n),
            RdfSubject::BlankNode(b) => RdfTerm::BlankNode(b),
        }
    }
}

/// Graph name of a statement.
///
/// `DefaultGraph` names the default graph explicitly; it is also the key the
/// store files unnamed statements under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GraphName {
    /// Named graph identified by an IRI
    NamedNode(NamedNode),
    /// Named graph identified by a blank node
    BlankNode(BlankNode),
    /// The default graph
    #[default]
    DefaultGraph,
}

impl GraphName {
    /// Check if this is the default graph
    pub fn is_default_graph(&self) -> bool {
        matches!(self, GraphName::DefaultGraph)
    }

    /// The graph name as a term, `None` for the default graph
    pub fn to_term(&self) -> Option<RdfTerm> {
        match self {
            GraphName::NamedNode(n) => Some(RdfTerm::NamedNode(n.clone())),
            GraphName::BlankNode(b) => Some(RdfTerm::BlankNode(b.clone())),
            GraphName::DefaultGraph => None,
        }
    }
}

impl fmt::Display for GraphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphName::NamedNode(n) => write!(f, "{}", n),
            GraphName::BlankNode(b) => write!(f, "{}", b),
            GraphName::DefaultGraph => write!(f, "DEFAULT"),
        }
    }
}

impl From<NamedNode> for GraphName {
    fn from(node: NamedNode) -> Self {
        GraphName::NamedNode(node)
    }
}

impl From<BlankNode> for GraphName {
    fn from(node: BlankNode) -> Self {
        GraphName::BlankNode(node)
    }
}

impl From<RdfSubject> for GraphName {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => GraphName::NamedNode(n),
            RdfSubject::BlankNode(b) => GraphName::BlankNode(b),
        }
    }
}

/// RDF statement (subject-predicate-object in a graph)
///
/// A `Statement` is always complete; partially bound statements are
/// expressed as query patterns instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    /// Subject
    pub subject: RdfSubject,
    /// Predicate
    pub predicate: NamedNode,
    /// Object
    pub object: RdfTerm,
    /// Graph name (`DefaultGraph` unless set)
    pub graph_name: GraphName,
}

impl Statement {
    /// Create a new statement in the default graph
    pub fn new(
        subject: impl Into<RdfSubject>,
        predicate: NamedNode,
        object: impl Into<RdfTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
            graph_name: GraphName::DefaultGraph,
        }
    }

    /// Move the statement into a graph
    pub fn in_graph(mut self, graph_name: impl Into<GraphName>) -> Self {
        self.graph_name = graph_name.into();
        self
    }

    /// Check if the statement belongs to the default graph
    pub fn is_default_graph(&self) -> bool {
        self.graph_name.is_default_graph()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.graph_name.is_default_graph() {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        } else {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, self.graph_name
            )
        }
    }
}

/// Graph constraint of a quad pattern
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GraphMatch {
    /// Default graph and every named graph
    #[default]
    Any,
    /// Every named graph, never the default graph
    Named,
    /// Exactly this graph (`DefaultGraph` = default graph only)
    Exactly(GraphName),
}

impl GraphMatch {
    /// Check if a graph name satisfies this constraint
    pub fn matches(&self, graph_name: &GraphName) -> bool {
        match self {
            GraphMatch::Any => true,
            GraphMatch::Named => !graph_name.is_default_graph(),
            GraphMatch::Exactly(g) => g == graph_name,
        }
    }
}

/// Quad pattern for store lookups (`None` = unbound)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuadPattern {
    /// Subject (None = any)
    pub subject: Option<RdfSubject>,
    /// Predicate (None = any)
    pub predicate: Option<NamedNode>,
    /// Object (None = any)
    pub object: Option<RdfTerm>,
    /// Graph constraint
    pub graph: GraphMatch,
}

impl QuadPattern {
    /// Create a new quad pattern over all graphs
    pub fn new(
        subject: Option<RdfSubject>,
        predicate: Option<NamedNode>,
        object: Option<RdfTerm>,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph: GraphMatch::Any,
        }
    }

    /// Restrict the pattern to a graph constraint
    pub fn with_graph(mut self, graph: GraphMatch) -> Self {
        self.graph = graph;
        self
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> NamedNode {
        NamedNode::new("http://example.org/alice").unwrap()
    }

    fn name() -> NamedNode {
        NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap()
    }

    #[test]
    fn test_named_node() {
        let node = alice();
        assert_eq!(node.as_str(), "http://example.org/alice");
        assert_eq!(node.to_string(), "<http://example.org/alice>");
        assert!(NamedNode::new("not an iri").is_err());
    }

    #[test]
    fn test_blank_node() {
        let node1 = BlankNode::new();
        let node2 = BlankNode::new();
        assert_ne!(node1, node2); // Should have unique identifiers

        let named: BlankNode = "b0".parse().unwrap();
        assert_eq!(named.to_string(), "_:b0");
    }

    #[test]
    fn test_literal_equality_is_structural() {
        let xsd_int = NamedNode::new("http://www.w3.org/2001/XMLSchema#integer").unwrap();
        let one = Literal::new_typed_literal("1", xsd_int.clone());
        let padded = Literal::new_typed_literal("01", xsd_int);
        assert_ne!(one, padded);

        let en = Literal::new_language_tagged_literal("chat", "en").unwrap();
        let fr = Literal::new_language_tagged_literal("chat", "fr").unwrap();
        assert_ne!(en, fr);
        assert_ne!(RdfTerm::from(en), RdfTerm::from(Literal::new_simple_literal("chat")));
    }

    #[test]
    fn test_term_reinterpretation() {
        let term: RdfTerm = alice().into();
        assert_eq!(term.to_subject(), Some(RdfSubject::NamedNode(alice())));
        assert_eq!(term.to_graph_name(), Some(GraphName::NamedNode(alice())));

        let lit: RdfTerm = Literal::new_simple_literal("Alice").into();
        assert!(lit.to_subject().is_none());
        assert!(lit.to_named_node().is_none());
    }

    #[test]
    fn test_statement_display() {
        let statement = Statement::new(alice(), name(), Literal::new_simple_literal("Alice"));
        assert!(statement.is_default_graph());
        assert_eq!(
            statement.to_string(),
            "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" ."
        );

        let graph = NamedNode::new("http://example.org/g1").unwrap();
        let quad = statement.in_graph(graph);
        assert!(quad.to_string().ends_with("<http://example.org/g1> ."));
    }

    #[test]
    fn test_graph_match() {
        let g1 = GraphName::from(NamedNode::new("http://example.org/g1").unwrap());

        assert!(GraphMatch::Any.matches(&GraphName::DefaultGraph));
        assert!(GraphMatch::Any.matches(&g1));
        assert!(GraphMatch::Named.matches(&g1));
        assert!(!GraphMatch::Named.matches(&GraphName::DefaultGraph));
        assert!(GraphMatch::Exactly(g1.clone()).matches(&g1));
        assert!(!GraphMatch::Exactly(GraphName::DefaultGraph).matches(&g1));

        let pattern = QuadPattern::new(Some(alice().into()), None, None)
            .with_graph(GraphMatch::Named);
        assert_eq!(pattern.graph, GraphMatch::Named);
    }
}
