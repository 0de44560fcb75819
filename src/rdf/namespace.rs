//! Vocabularies and prefix management
//!
//! Vocabulary terms are compile-time tables: `vocabulary!` expands each entry
//! into an IRI constant and a `TERMS` lookup slice, so term accessors need no
//! runtime reflection.

use super::types::NamedNode;
use indexmap::IndexMap;
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Not of the form `prefix:local`
    #[error("Invalid compact IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

macro_rules! vocabulary {
    (
        $(#[$doc:meta])*
        $module:ident, $prefix:literal, $iri:literal,
        { $($name:ident => $local:literal),* $(,)? }
    ) => {
        $(#[$doc])*
        pub mod $module {
            use $crate::rdf::NamedNode;

            /// Preferred prefix
            pub const PREFIX: &str = $prefix;

            /// Namespace IRI
            pub const NAMESPACE: &str = $iri;

            $(pub const $name: &str = concat!($iri, $local);)*

            /// Local name → IRI table
            pub const TERMS: &[(&str, &str)] = &[$(($local, $name)),*];

            /// Look up a term by its local name
            pub fn term(local: &str) -> Option<NamedNode> {
                TERMS
                    .iter()
                    .find(|(name, _)| *name == local)
                    .map(|(_, iri)| NamedNode::new_unchecked(*iri))
            }
        }
    };
}

vocabulary!(
    /// RDF syntax vocabulary
    rdf, "rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    {
        TYPE => "type",
        PROPERTY => "Property",
        STATEMENT => "Statement",
        SUBJECT => "subject",
        PREDICATE => "predicate",
        OBJECT => "object",
        FIRST => "first",
        REST => "rest",
        NIL => "nil",
        LANG_STRING => "langString",
    }
);

vocabulary!(
    /// RDF Schema vocabulary
    rdfs, "rdfs", "http://www.w3.org/2000/01/rdf-schema#",
    {
        CLASS => "Class",
        SUB_CLASS_OF => "subClassOf",
        SUB_PROPERTY_OF => "subPropertyOf",
        DOMAIN => "domain",
        RANGE => "range",
        LABEL => "label",
        COMMENT => "comment",
        SEE_ALSO => "seeAlso",
    }
);

vocabulary!(
    /// XML Schema datatypes
    xsd, "xsd", "http://www.w3.org/2001/XMLSchema#",
    {
        STRING => "string",
        BOOLEAN => "boolean",
        INTEGER => "integer",
        DECIMAL => "decimal",
        DOUBLE => "double",
        DATE => "date",
        DATE_TIME => "dateTime",
    }
);

vocabulary!(
    /// Friend of a Friend
    foaf, "foaf", "http://xmlns.com/foaf/0.1/",
    {
        PERSON => "Person",
        AGENT => "Agent",
        NAME => "name",
        MBOX => "mbox",
        KNOWS => "knows",
        HOMEPAGE => "homepage",
        AGE => "age",
    }
);

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Namespace manager seeded with the built-in vocabularies
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings, in registration order
    prefixes: IndexMap<String, String>,
}

impl NamespaceManager {
    /// Create a new namespace manager with common prefixes
    pub fn new() -> Self {
        let mut mgr = Self {
            prefixes: IndexMap::new(),
        };

        mgr.add_prefix(rdf::PREFIX, rdf::NAMESPACE);
        mgr.add_prefix(rdfs::PREFIX, rdfs::NAMESPACE);
        mgr.add_prefix(xsd::PREFIX, xsd::NAMESPACE);
        mgr.add_prefix(foaf::PREFIX, foaf::NAMESPACE);

        mgr
    }

    /// Add a prefix, replacing any previous mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        let (prefix, local) = compact_iri
            .split_once(':')
            .ok_or_else(|| PrefixError::InvalidIri(compact_iri.to_string()))?;
        let iri = self.get_iri(prefix)?;
        Ok(format!("{}{}", iri, local))
    }

    /// Expand a compact IRI straight into a validated named node
    pub fn expand_node(&self, compact_iri: &str) -> PrefixResult<NamedNode> {
        let iri = self.expand(compact_iri)?;
        NamedNode::new(&iri).map_err(|_| PrefixError::InvalidIri(iri))
    }

    /// Compact an IRI using the longest matching namespace
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, namespace_iri)| iri.starts_with(namespace_iri.as_str()))
            .max_by_key(|(_, namespace_iri)| namespace_iri.len())
            .map(|(prefix, namespace_iri)| format!("{}:{}", prefix, &iri[namespace_iri.len()..]))
    }

    /// Get all registered prefixes
    pub fn prefixes(&self) -> Vec<Namespace> {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| Namespace::new(prefix.clone(), iri.clone()))
            .collect()
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}
