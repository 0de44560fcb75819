//! Four-level persistent quad index
//!
//! `graph → subject → predicate → {objects}`, each level a `HamtMap` (the
//! object level a `HamtSet`). The default graph is filed under
//! `GraphName::DefaultGraph`. Empty levels are pruned on delete, so every
//! graph, subject and predicate key present has at least one statement below it.

use super::hamt::{HamtMap, HamtSet};
use crate::rdf::{GraphMatch, GraphName, NamedNode, QuadPattern, RdfSubject, RdfTerm, Statement};
use std::hash::Hash;

/// Objects of one (graph, subject, predicate)
pub type ObjectSet = HamtSet<RdfTerm>;
/// Predicates of one (graph, subject)
pub type PredicateMap = HamtMap<NamedNode, ObjectSet>;
/// Subjects of one graph
pub type SubjectMap = HamtMap<RdfSubject, PredicateMap>;
/// Graphs of the dataset
pub type GraphMap = HamtMap<GraphName, SubjectMap>;

/// Lazy, owning statement iterator
pub type StatementIter<'a> = Box<dyn Iterator<Item = Statement> + Send + 'a>;

/// An immutable dataset root.
///
/// Cloning is O(1). `insert` and `remove` return a new root sharing every
/// untouched sub-tree with `self`.
#[derive(Clone, Default)]
pub struct Dataset {
    graphs: GraphMap,
    len: usize,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of statements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if two datasets are the same root
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.graphs.ptr_eq(&other.graphs)
    }

    /// The graph level of the root
    pub fn graphs(&self) -> &GraphMap {
        &self.graphs
    }

    /// Check if a graph has at least one statement
    pub fn has_graph(&self, graph_name: &GraphName) -> bool {
        self.graphs.contains_key(graph_name)
    }

    /// Graph keys present, default graph included
    pub fn graph_keys(&self) -> impl Iterator<Item = &GraphName> {
        self.graphs.keys()
    }

    /// Check if a statement is present
    pub fn contains(&self, statement: &Statement) -> bool {
        self.graphs
            .get(&statement.graph_name)
            .and_then(|subjects| subjects.get(&statement.subject))
            .and_then(|predicates| predicates.get(&statement.predicate))
            .map_or(false, |objects| objects.contains(&statement.object))
    }

    /// New root with the statement added; `self` is returned when already present
    pub fn insert(&self, statement: &Statement) -> Self {
        if self.contains(statement) {
            return self.clone();
        }

        let subjects = self.graphs.get(&statement.graph_name).cloned().unwrap_or_default();
        let predicates = subjects.get(&statement.subject).cloned().unwrap_or_default();
        let objects = predicates
            .get(&statement.predicate)
            .cloned()
            .unwrap_or_default()
            .insert(statement.object.clone());

        let predicates = predicates.insert(statement.predicate.clone(), objects);
        let subjects = subjects.insert(statement.subject.clone(), predicates);
        Dataset {
            graphs: self.graphs.insert(statement.graph_name.clone(), subjects),
            len: self.len + 1,
        }
    }

    /// New root with the statement removed and emptied levels pruned
    pub fn remove(&self, statement: &Statement) -> Self {
        if !self.contains(statement) {
            return self.clone();
        }
        let Some(subjects) = self.graphs.get(&statement.graph_name) else {
            return self.clone();
        };
        let Some(predicates) = subjects.get(&statement.subject) else {
            return self.clone();
        };
        let Some(objects) = predicates.get(&statement.predicate) else {
            return self.clone();
        };

        let objects = objects.remove(&statement.object);
        let predicates = replace_or_prune(predicates, &statement.predicate, objects, |o| o.is_empty());
        let subjects = replace_or_prune(subjects, &statement.subject, predicates, |p| p.is_empty());
        let graphs = replace_or_prune(&self.graphs, &statement.graph_name, subjects, |s| s.is_empty());

        Dataset {
            graphs,
            len: self.len - 1,
        }
    }

    /// Fold deletes, then inserts, into one new root
    pub fn apply<'a>(
        &self,
        deletes: impl IntoIterator<Item = &'a Statement>,
        inserts: impl IntoIterator<Item = &'a Statement>,
    ) -> Self {
        let data = deletes
            .into_iter()
            .fold(self.clone(), |data, statement| data.remove(statement));
        inserts
            .into_iter()
            .fold(data, |data, statement| data.insert(statement))
    }

    /// Every statement, in graph → subject → predicate → object nesting order
    pub fn statements(&self) -> StatementIter<'static> {
        self.query(&QuadPattern::default())
    }

    /// Statements matching a quad pattern.
    ///
    /// Bound slots narrow the traversal with a point lookup at their level;
    /// unbound slots iterate the whole level. The iterator owns the root it
    /// walks, so it is unaffected by later writes.
    pub fn query(&self, pattern: &QuadPattern) -> StatementIter<'static> {
        let graphs: Box<dyn Iterator<Item = (GraphName, SubjectMap)> + Send> = match &pattern.graph {
            GraphMatch::Exactly(graph_name) => narrow(&self.graphs, Some(graph_name)),
            graph => {
                let graph = graph.clone();
                Box::new(
                    self.graphs
                        .clone()
                        .into_iter()
                        .filter(move |(graph_name, _)| graph.matches(graph_name)),
                )
            }
        };

        let subject = pattern.subject.clone();
        let predicate = pattern.predicate.clone();
        let object = pattern.object.clone();

        Box::new(graphs.flat_map(move |(graph_name, subjects)| {
            let predicate = predicate.clone();
            let object = object.clone();
            narrow(&subjects, subject.as_ref()).flat_map(move |(s, predicates)| {
                let graph_name = graph_name.clone();
                let object = object.clone();
                narrow(&predicates, predicate.as_ref()).flat_map(move |(p, objects)| {
                    let graph_name = graph_name.clone();
                    let s = s.clone();
                    let objects: Box<dyn Iterator<Item = RdfTerm> + Send> = match &object {
                        Some(o) => Box::new(objects.contains(o).then(|| o.clone()).into_iter()),
                        None => Box::new(objects.into_iter()),
                    };
                    objects.map(move |o| Statement {
                        subject: s.clone(),
                        predicate: p.clone(),
                        object: o,
                        graph_name: graph_name.clone(),
                    })
                })
            })
        }))
    }
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("len", &self.len)
            .field("graphs", &self.graphs.len())
            .finish()
    }
}

/// Iterate one level, or just one entry of it when the key is bound
fn narrow<K, V>(map: &HamtMap<K, V>, key: Option<&K>) -> Box<dyn Iterator<Item = (K, V)> + Send>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    match key {
        Some(k) => Box::new(map.get(k).cloned().map(|v| (k.clone(), v)).into_iter()),
        None => Box::new(map.clone().into_iter()),
    }
}

fn replace_or_prune<K, V>(map: &HamtMap<K, V>, key: &K, child: V, is_empty: impl Fn(&V) -> bool) -> HamtMap<K, V>
where
    K: Hash + Eq + Clone,
{
    if is_empty(&child) {
        map.remove(key)
    } else {
        map.insert(key.clone(), child)
    }
}
