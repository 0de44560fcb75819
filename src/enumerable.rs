//! Capabilities shared by stores, snapshots, transactions and graph views
//!
//! Anything that can list its statements is `Enumerable`; anything that can
//! also answer a single pattern is `Queryable` and can run a full BGP query.
//! Write targets implement `Mutable`.

use crate::query::{Pattern, Query, QueryResult, Solutions};
use crate::rdf::{GraphName, Statement};
use crate::storage::StatementIter;
use crate::store::{Changeset, GraphView};
use indexmap::IndexSet;
use std::convert::Infallible;

/// Statement enumeration
pub trait Enumerable {
    /// Lazy iterator over every statement
    fn statements(&self) -> StatementIter<'_>;

    /// Number of statements
    fn count(&self) -> usize {
        self.statements().count()
    }

    /// Check if there are no statements
    fn is_empty(&self) -> bool {
        self.statements().next().is_none()
    }

    /// Check if a statement is present
    fn has_statement(&self, statement: &Statement) -> bool {
        self.statements().any(|s| &s == statement)
    }

    /// Check if a graph holds at least one statement
    fn has_graph(&self, graph_name: &GraphName) -> bool {
        self.statements().any(|s| &s.graph_name == graph_name)
    }

    /// Distinct named graphs, default graph excluded
    fn graph_names(&self) -> Vec<GraphName> {
        self.statements()
            .map(|s| s.graph_name)
            .filter(|g| !g.is_default_graph())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// Visit statements until the callback fails; the error is returned as is
    fn try_each_statement<E, F>(&self, mut callback: F) -> Result<(), E>
    where
        Self: Sized,
        F: FnMut(Statement) -> Result<(), E>,
    {
        for statement in self.statements() {
            callback(statement)?;
        }
        Ok(())
    }
}

/// Pattern matching
pub trait Queryable: Enumerable {
    /// Lazy iterator over statements matching one pattern.
    ///
    /// Variables and unset slots match anything; bound slots match by term
    /// equality. Repeated variables are not checked here.
    fn query_pattern(&self, pattern: &Pattern) -> StatementIter<'_>;

    /// First statement matching a pattern
    fn first(&self, pattern: &Pattern) -> Option<Statement> {
        self.query_pattern(pattern).next()
    }

    /// Run a BGP query against this source
    fn run_query(&self, query: &mut Query) -> QueryResult<Solutions>
    where
        Self: Sized,
    {
        query.execute(self)
    }

    /// Read-only view of a single graph
    fn project_graph(&self, graph_name: GraphName) -> GraphView<'_, Self>
    where
        Self: Sized,
    {
        GraphView::new(self, graph_name)
    }
}

/// Statement insertion and deletion
pub trait Mutable {
    type Error;

    fn insert_statement(&mut self, statement: Statement) -> Result<(), Self::Error>;

    fn delete_statement(&mut self, statement: &Statement) -> Result<(), Self::Error>;

    /// Insert in order, stopping at the first error
    fn insert_statements<I>(&mut self, statements: I) -> Result<(), Self::Error>
    where
        Self: Sized,
        I: IntoIterator<Item = Statement>,
    {
        for statement in statements {
            self.insert_statement(statement)?;
        }
        Ok(())
    }
}

impl Mutable for Changeset {
    type Error = Infallible;

    fn insert_statement(&mut self, statement: Statement) -> Result<(), Infallible> {
        self.insert(statement);
        Ok(())
    }

    fn delete_statement(&mut self, statement: &Statement) -> Result<(), Infallible> {
        self.delete(statement.clone());
        Ok(())
    }
}
