//! Single-graph projections

use crate::enumerable::{Enumerable, Queryable};
use crate::query::{Pattern, PatternSlot};
use crate::rdf::GraphName;
use crate::storage::StatementIter;

/// Read-only view of one graph of a queryable source
#[derive(Debug)]
pub struct GraphView<'a, Q: ?Sized> {
    source: &'a Q,
    graph_name: GraphName,
}

impl<'a, Q: Queryable + ?Sized> GraphView<'a, Q> {
    pub fn new(source: &'a Q, graph_name: GraphName) -> Self {
        Self { source, graph_name }
    }

    pub fn graph_name(&self) -> &GraphName {
        &self.graph_name
    }

    pub fn is_default_graph(&self) -> bool {
        self.graph_name.is_default_graph()
    }
}

impl<Q: ?Sized> Clone for GraphView<'_, Q> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            graph_name: self.graph_name.clone(),
        }
    }
}

impl<Q: Queryable + ?Sized> Enumerable for GraphView<'_, Q> {
    fn statements(&self) -> StatementIter<'_> {
        self.source
            .query_pattern(&Pattern::any().in_graph(self.graph_name.clone()))
    }

    fn has_graph(&self, graph_name: &GraphName) -> bool {
        graph_name == &self.graph_name && !self.is_empty()
    }
}

impl<Q: Queryable + ?Sized> Queryable for GraphView<'_, Q> {
    fn query_pattern(&self, pattern: &Pattern) -> StatementIter<'_> {
        match scope_pattern(pattern, &self.graph_name) {
            Some(scoped) => self.source.query_pattern(&scoped),
            None => Box::new(std::iter::empty()),
        }
    }
}

/// Confine a pattern to one graph.
///
/// A graph variable keeps binding (the lookup is narrowed to `graph_name`);
/// a different concrete graph can never match and yields `None`.
pub(crate) fn scope_pattern(pattern: &Pattern, graph_name: &GraphName) -> Option<Pattern> {
    match &pattern.graph_name {
        Some(PatternSlot::Term(g)) if g != graph_name => None,
        _ => Some(Pattern {
            graph_name: Some(PatternSlot::Term(graph_name.clone())),
            ..pattern.clone()
        }),
    }
}
