//! Variables and triple/quad patterns

use super::solution::Solution;
use crate::enumerable::Queryable;
use crate::rdf::{
    BlankNode, GraphMatch, GraphName, Literal, NamedNode, QuadPattern, RdfSubject, RdfTerm,
    Statement,
};
use crate::store::StoreError;
use indexmap::IndexSet;
use std::borrow::Borrow;
use std::fmt;

/// Named query variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(String);

impl Variable {
    /// Create a variable; a leading `?` is stripped
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('?') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(name),
        }
    }

    /// Variable name without the `?`
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Variable {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A pattern position: either a variable or a concrete term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSlot<T> {
    /// Placeholder bound by matching
    Variable(Variable),
    /// Concrete term
    Term(T),
}

impl<T> PatternSlot<T> {
    /// The variable, if any
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            PatternSlot::Variable(v) => Some(v),
            PatternSlot::Term(_) => None,
        }
    }

    /// The concrete term, if any
    pub fn as_term(&self) -> Option<&T> {
        match self {
            PatternSlot::Variable(_) => None,
            PatternSlot::Term(t) => Some(t),
        }
    }
}

impl<T: fmt::Display> fmt::Display for PatternSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSlot::Variable(v) => write!(f, "{}", v),
            PatternSlot::Term(t) => write!(f, "{}", t),
        }
    }
}

impl<T> From<Variable> for PatternSlot<T> {
    fn from(variable: Variable) -> Self {
        PatternSlot::Variable(variable)
    }
}

impl From<RdfSubject> for PatternSlot<RdfSubject> {
    fn from(subject: RdfSubject) -> Self {
        PatternSlot::Term(subject)
    }
}

impl From<NamedNode> for PatternSlot<RdfSubject> {
    fn from(node: NamedNode) -> Self {
        PatternSlot::Term(node.into())
    }
}

impl From<BlankNode> for PatternSlot<RdfSubject> {
    fn from(node: BlankNode) -> Self {
        PatternSlot::Term(node.into())
    }
}

impl From<NamedNode> for PatternSlot<NamedNode> {
    fn from(node: NamedNode) -> Self {
        PatternSlot::Term(node)
    }
}

impl From<RdfTerm> for PatternSlot<RdfTerm> {
    fn from(term: RdfTerm) -> Self {
        PatternSlot::Term(term)
    }
}

impl From<NamedNode> for PatternSlot<RdfTerm> {
    fn from(node: NamedNode) -> Self {
        PatternSlot::Term(node.into())
    }
}

impl From<BlankNode> for PatternSlot<RdfTerm> {
    fn from(node: BlankNode) -> Self {
        PatternSlot::Term(node.into())
    }
}

impl From<Literal> for PatternSlot<RdfTerm> {
    fn from(lit: Literal) -> Self {
        PatternSlot::Term(lit.into())
    }
}

impl From<GraphName> for PatternSlot<GraphName> {
    fn from(graph_name: GraphName) -> Self {
        PatternSlot::Term(graph_name)
    }
}

impl From<NamedNode> for PatternSlot<GraphName> {
    fn from(node: NamedNode) -> Self {
        PatternSlot::Term(node.into())
    }
}

/// A statement whose positions may be variables or left unset.
///
/// Unset (`None`) positions match anything without binding. For the graph
/// position, `None` matches every graph, `Term(GraphName::DefaultGraph)` only
/// the default graph, and a variable only named graphs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    /// Subject position
    pub subject: Option<PatternSlot<RdfSubject>>,
    /// Predicate position
    pub predicate: Option<PatternSlot<NamedNode>>,
    /// Object position
    pub object: Option<PatternSlot<RdfTerm>>,
    /// Graph position
    pub graph_name: Option<PatternSlot<GraphName>>,
    /// OPTIONAL (left join) pattern
    pub optional: bool,
}

impl Pattern {
    /// Create a triple pattern over all graphs
    pub fn new(
        subject: impl Into<PatternSlot<RdfSubject>>,
        predicate: impl Into<PatternSlot<NamedNode>>,
        object: impl Into<PatternSlot<RdfTerm>>,
    ) -> Self {
        Self {
            subject: Some(subject.into()),
            predicate: Some(predicate.into()),
            object: Some(object.into()),
            graph_name: None,
            optional: false,
        }
    }

    /// Pattern matching every statement
    pub fn any() -> Self {
        Self::default()
    }

    /// Set the graph position
    pub fn in_graph(mut self, graph_name: impl Into<PatternSlot<GraphName>>) -> Self {
        self.graph_name = Some(graph_name.into());
        self
    }

    /// Mark the pattern OPTIONAL
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Check if the pattern is OPTIONAL
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Variables in subject, predicate, object, graph order, without repeats
    pub fn variables(&self) -> IndexSet<Variable> {
        [
            self.subject.as_ref().and_then(PatternSlot::as_variable),
            self.predicate.as_ref().and_then(PatternSlot::as_variable),
            self.object.as_ref().and_then(PatternSlot::as_variable),
            self.graph_name.as_ref().and_then(PatternSlot::as_variable),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect()
    }

    /// Number of distinct variables
    pub fn variable_count(&self) -> usize {
        self.variables().len()
    }

    /// Check if any position is a variable
    pub fn has_variables(&self) -> bool {
        self.variable_count() > 0
    }

    /// Check if subject, predicate and object are all concrete terms
    pub fn is_complete(&self) -> bool {
        matches!(self.subject, Some(PatternSlot::Term(_)))
            && matches!(self.predicate, Some(PatternSlot::Term(_)))
            && matches!(self.object, Some(PatternSlot::Term(_)))
    }

    /// Static selectivity estimate: the number of unbound positions
    pub fn cost(&self) -> usize {
        [
            is_unbound(&self.subject),
            is_unbound(&self.predicate),
            is_unbound(&self.object),
            is_unbound(&self.graph_name),
        ]
        .into_iter()
        .filter(|unbound| *unbound)
        .count()
    }

    /// Substitute variables already bound in `solution`.
    ///
    /// Returns `None` when a bound value cannot occupy its position (a
    /// literal bound to a subject variable, say), since nothing could match.
    pub fn bind(&self, solution: &Solution) -> Option<Pattern> {
        Some(Pattern {
            subject: bind_slot(&self.subject, solution, RdfTerm::to_subject)?,
            predicate: bind_slot(&self.predicate, solution, RdfTerm::to_named_node)?,
            object: bind_slot(&self.object, solution, |t| Some(t.clone()))?,
            graph_name: bind_slot(&self.graph_name, solution, RdfTerm::to_graph_name)?,
            optional: self.optional,
        })
    }

    /// Bindings this pattern's variables take from a matching statement.
    ///
    /// Returns `None` when a repeated variable would bind two different
    /// terms, or a graph variable meets the default graph.
    pub fn solution(&self, statement: &Statement) -> Option<Solution> {
        let mut solution = Solution::new();
        if let Some(PatternSlot::Variable(v)) = &self.subject {
            unify(&mut solution, v, statement.subject.clone().into())?;
        }
        if let Some(PatternSlot::Variable(v)) = &self.predicate {
            unify(&mut solution, v, statement.predicate.clone().into())?;
        }
        if let Some(PatternSlot::Variable(v)) = &self.object {
            unify(&mut solution, v, statement.object.clone())?;
        }
        if let Some(PatternSlot::Variable(v)) = &self.graph_name {
            unify(&mut solution, v, statement.graph_name.to_term()?)?;
        }
        Some(solution)
    }

    /// Store-level lookup for this pattern; variables become wildcards
    pub fn to_quad_pattern(&self) -> QuadPattern {
        let graph = match &self.graph_name {
            None => GraphMatch::Any,
            Some(PatternSlot::Variable(_)) => GraphMatch::Named,
            Some(PatternSlot::Term(g)) => GraphMatch::Exactly(g.clone()),
        };
        QuadPattern {
            subject: self.subject.as_ref().and_then(PatternSlot::as_term).cloned(),
            predicate: self.predicate.as_ref().and_then(PatternSlot::as_term).cloned(),
            object: self.object.as_ref().and_then(PatternSlot::as_term).cloned(),
            graph,
        }
    }

    /// Solutions for this pattern under one incoming solution.
    ///
    /// Each yielded row holds only the bindings made by this pattern.
    pub fn execute<'q, Q>(&self, queryable: &'q Q, solution: &Solution) -> Box<dyn Iterator<Item = Solution> + 'q>
    where
        Q: Queryable + ?Sized,
    {
        let Some(bound) = self.bind(solution) else {
            return Box::new(std::iter::empty());
        };
        let statements = queryable.query_pattern(&bound);
        Box::new(statements.filter_map(move |statement| bound.solution(&statement)))
    }
}

impl TryFrom<&Pattern> for Statement {
    type Error = StoreError;

    fn try_from(pattern: &Pattern) -> Result<Self, Self::Error> {
        let incomplete = || StoreError::IncompleteStatement(pattern.to_string());
        let subject = pattern.subject.as_ref().and_then(PatternSlot::as_term).ok_or_else(incomplete)?;
        let predicate = pattern.predicate.as_ref().and_then(PatternSlot::as_term).ok_or_else(incomplete)?;
        let object = pattern.object.as_ref().and_then(PatternSlot::as_term).ok_or_else(incomplete)?;
        let graph_name = match &pattern.graph_name {
            None => GraphName::DefaultGraph,
            Some(PatternSlot::Term(g)) => g.clone(),
            Some(PatternSlot::Variable(_)) => return Err(incomplete()),
        };
        Ok(Statement {
            subject: subject.clone(),
            predicate: predicate.clone(),
            object: object.clone(),
            graph_name,
        })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "OPTIONAL ")?;
        }
        write!(
            f,
            "{} {} {}",
            display_slot(&self.subject),
            display_slot(&self.predicate),
            display_slot(&self.object)
        )?;
        if let Some(graph_name) = &self.graph_name {
            write!(f, " {}", graph_name)?;
        }
        write!(f, " .")
    }
}

fn display_slot<T: fmt::Display>(slot: &Option<PatternSlot<T>>) -> String {
    match slot {
        Some(slot) => slot.to_string(),
        None => "_".to_string(),
    }
}

fn is_unbound<T>(slot: &Option<PatternSlot<T>>) -> bool {
    !matches!(slot, Some(PatternSlot::Term(_)))
}

fn bind_slot<T>(
    slot: &Option<PatternSlot<T>>,
    solution: &Solution,
    convert: impl Fn(&RdfTerm) -> Option<T>,
) -> Option<Option<PatternSlot<T>>>
where
    T: Clone,
{
    match slot {
        Some(PatternSlot::Variable(v)) => match solution.get(v.name()) {
            Some(value) => convert(value).map(|term| Some(PatternSlot::Term(term))),
            None => Some(Some(PatternSlot::Variable(v.clone()))),
        },
        other => Some(other.clone()),
    }
}

fn unify(solution: &mut Solution, variable: &Variable, value: RdfTerm) -> Option<()> {
    match solution.get(variable.name()) {
        Some(existing) if existing != &value => None,
        Some(_) => Some(()),
        None => {
            solution.bind(variable.clone(), value);
            Some(())
        }
    }
}
