//! Basic graph pattern execution
//!
//! A [`Query`] is an ordered list of [`Pattern`]s joined left to right. Each
//! pattern is evaluated once per incoming solution against any
//! [`Queryable`] source; optional patterns keep the incoming row when nothing
//! matches.

use super::optimizer::QueryOptimizer;
use super::pattern::{Pattern, PatternSlot, Variable};
use super::solution::Solutions;
use super::{QueryError, QueryResult};
use crate::enumerable::Queryable;
use crate::rdf::{GraphName, RdfTerm};
use indexmap::{IndexMap, IndexSet};
use std::ops::Add;
use tracing::{debug, trace};

/// A basic graph pattern query
#[derive(Debug, Clone, Default)]
pub struct Query {
    patterns: Vec<Pattern>,
    graph_name: Option<PatternSlot<GraphName>>,
    bindings: IndexMap<Variable, Vec<RdfTerm>>,
    solutions: Solutions,
}

impl Query {
    /// Create a query from patterns
    pub fn new(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            patterns: patterns.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Append a pattern (builder form)
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Append a pattern
    pub fn push(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    /// Scope patterns without their own graph.
    ///
    /// `GraphName::DefaultGraph` restricts to the default graph, a named
    /// graph to that graph, and a variable to any named graph.
    pub fn with_graph_name(mut self, graph_name: impl Into<PatternSlot<GraphName>>) -> Self {
        self.graph_name = Some(graph_name.into());
        self
    }

    /// Candidate values for a variable, applied before its first pattern
    pub fn with_bindings(mut self, variable: Variable, values: impl IntoIterator<Item = RdfTerm>) -> Self {
        self.bindings.insert(variable, values.into_iter().collect());
        self
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn graph_name(&self) -> Option<&PatternSlot<GraphName>> {
        self.graph_name.as_ref()
    }

    /// Check if the query has no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Scoped to a named graph (or any named graph, for a variable)
    pub fn is_named(&self) -> bool {
        matches!(&self.graph_name, Some(slot) if slot.as_term() != Some(&GraphName::DefaultGraph))
    }

    /// Scoped to the default graph only
    pub fn is_default(&self) -> bool {
        matches!(&self.graph_name, Some(PatternSlot::Term(GraphName::DefaultGraph)))
    }

    /// Not scoped to any graph
    pub fn is_unnamed(&self) -> bool {
        self.graph_name.is_none()
    }

    /// Distinct variables across patterns and the graph scope
    pub fn variables(&self) -> IndexSet<Variable> {
        let mut variables: IndexSet<Variable> =
            self.patterns.iter().flat_map(Pattern::variables).collect();
        if let Some(PatternSlot::Variable(v)) = &self.graph_name {
            variables.insert(v.clone());
        }
        variables
    }

    pub fn variable_count(&self) -> usize {
        self.variables().len()
    }

    /// Reject a required pattern that follows an optional one
    pub fn validate(&self) -> QueryResult<()> {
        let mut seen_optional = false;
        for (index, pattern) in self.patterns.iter().enumerate() {
            if pattern.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(QueryError::OptionalNotTrailing { index });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Reordered copy, cheapest patterns first
    pub fn optimize(&self) -> Query {
        let mut query = self.clone();
        query.optimize_mut();
        query
    }

    /// Reorder patterns in place, cheapest first
    pub fn optimize_mut(&mut self) -> &mut Self {
        QueryOptimizer::new().optimize(&mut self.patterns);
        self
    }

    /// Execute starting from a single empty solution
    pub fn execute<Q>(&mut self, queryable: &Q) -> QueryResult<Solutions>
    where
        Q: Queryable + ?Sized,
    {
        self.execute_with(queryable, Solutions::single_empty())
    }

    /// Execute starting from the given solutions
    pub fn execute_with<Q>(&mut self, queryable: &Q, initial: Solutions) -> QueryResult<Solutions>
    where
        Q: Queryable + ?Sized,
    {
        self.validate()?;
        self.solutions = Solutions::new();

        if self.patterns.is_empty() {
            self.solutions = initial.clone();
            return Ok(initial);
        }

        let patterns: Vec<Pattern> = self
            .patterns
            .iter()
            .map(|pattern| match (&pattern.graph_name, &self.graph_name) {
                (None, Some(scope)) => pattern.clone().in_graph(scope.clone()),
                _ => pattern.clone(),
            })
            .collect();

        debug!("Executing BGP with {} patterns", patterns.len());

        let mut pending = self.bindings.clone();
        let mut solutions = initial;

        for (index, pattern) in patterns.iter().enumerate() {
            for variable in pattern.variables() {
                if let Some(values) = pending.shift_remove(&variable) {
                    let unbound = std::mem::take(&mut solutions);
                    for value in &values {
                        for solution in &unbound {
                            let mut seeded = solution.clone();
                            seeded.bind(variable.clone(), value.clone());
                            solutions.push(seeded);
                        }
                    }
                }
            }

            let mut next = Solutions::new();
            for solution in &solutions {
                let mut found = false;
                for bindings in pattern.execute(queryable, solution) {
                    found = true;
                    next.push(solution.merge(&bindings));
                }
                if !found && pattern.optional {
                    next.push(solution.clone());
                }
            }
            solutions = next;

            trace!("Pattern {} ({}) produced {} solutions", index, pattern, solutions.len());

            if solutions.is_empty() {
                debug!("BGP exhausted at pattern {}", index);
                self.solutions = Solutions::new();
                return Ok(Solutions::new());
            }

            if !pattern.optional && !binds_all(&solutions, pattern) {
                debug!("BGP aborted at pattern {}: unbound variables", index);
                self.solutions = Solutions::new();
                return Ok(Solutions::new());
            }
        }

        self.solutions = solutions.clone();
        Ok(solutions)
    }

    /// Result of the last execution
    pub fn solutions(&self) -> &Solutions {
        &self.solutions
    }

    /// Last execution produced no solutions
    pub fn failed(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Last execution produced at least one solution
    pub fn matched(&self) -> bool {
        !self.failed()
    }
}

/// Concatenates pattern lists; graph scope and bindings are not carried over
impl Add for Query {
    type Output = Query;

    fn add(self, other: Query) -> Query {
        Query::new(self.patterns.into_iter().chain(other.patterns))
    }
}

impl FromIterator<Pattern> for Query {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Query::new(iter)
    }
}

/// Every solution binds every variable of a mandatory pattern.
///
/// Rows produced by a match always satisfy this; it trips only on rows that
/// reach a mandatory pattern without matching it.
fn binds_all(solutions: &Solutions, pattern: &Pattern) -> bool {
    let variables = pattern.variables();
    solutions
        .iter()
        .all(|s| variables.iter().all(|v| s.contains(v.name())))
}
