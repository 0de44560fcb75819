//! Optimistic transactions
//!
//! A transaction reads from the snapshot taken when it began (or from the
//! live store when snapshots are off) and buffers writes in a [`Changeset`].
//! `execute` publishes the buffered writes only if no other write has been
//! published since the snapshot; otherwise it fails with
//! [`TransactionError::Conflict`] and the caller retries the whole
//! transaction.

use super::graph::scope_pattern;
use super::{Changeset, IsolationLevel, Snapshot, Store, StoreError};
use crate::enumerable::{Enumerable, Mutable, Queryable};
use crate::query::Pattern;
use crate::rdf::{GraphName, Statement};
use crate::storage::{Dataset, StatementIter};
use thiserror::Error;
use tracing::debug;

/// Transaction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// Mutable transaction requested on an immutable store
    #[error("Cannot open a mutable transaction on an immutable store")]
    ImmutableStore,

    /// Write attempted in a read-only transaction
    #[error("Transaction is read-only")]
    ReadOnly,

    /// Use of a rolled back transaction
    #[error("Transaction was rolled back")]
    RolledBack,

    /// Use of an executed transaction
    #[error("Transaction was already executed")]
    AlreadyExecuted,

    /// Another write was published after the transaction began
    #[error("Store has changed during transaction (base version {base}, live version {live})")]
    Conflict {
        /// Version the transaction read from
        base: u64,
        /// Version found at commit
        live: u64,
    },

    /// Store rejected the changes
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type TransactionResult<T> = Result<T, TransactionError>;

/// Transaction lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Open,
    Executed,
    RolledBack,
}

/// A read/write session against one store
#[derive(Debug)]
pub struct Transaction<'a> {
    store: &'a Store,
    snapshot: Option<Snapshot>,
    graph_name: Option<GraphName>,
    mutable: bool,
    changes: Changeset,
    state: TransactionState,
}

impl<'a> Transaction<'a> {
    /// Begin a transaction against `store`
    pub fn begin(
        store: &'a Store,
        mutable: bool,
        graph_name: Option<GraphName>,
    ) -> TransactionResult<Self> {
        if mutable && !store.is_mutable() {
            return Err(TransactionError::ImmutableStore);
        }
        let snapshot = if store.config().snapshots {
            Some(store.snapshot()?)
        } else {
            None
        };
        debug!(
            "Began {} transaction at version {:?}",
            if mutable { "mutable" } else { "read-only" },
            snapshot.as_ref().map(Snapshot::version)
        );
        Ok(Self {
            store,
            snapshot,
            graph_name,
            mutable,
            changes: Changeset::new(),
            state: TransactionState::Open,
        })
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn isolation_level(&self) -> IsolationLevel {
        self.store.isolation_level()
    }

    /// Graph this transaction is confined to
    pub fn graph_name(&self) -> Option<&GraphName> {
        self.graph_name.as_ref()
    }

    /// Store version the transaction reads from, if snapshotted
    pub fn base_version(&self) -> Option<u64> {
        self.snapshot.as_ref().map(Snapshot::version)
    }

    /// Buffered writes
    pub fn changes(&self) -> &Changeset {
        &self.changes
    }

    /// Check if any write is buffered
    pub fn is_mutated(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Buffer an insert
    pub fn insert(&mut self, statement: Statement) -> TransactionResult<()> {
        self.check_writable()?;
        let statement = self.scope_statement(statement);
        self.changes.insert(statement);
        Ok(())
    }

    /// Buffer a delete
    pub fn delete(&mut self, statement: &Statement) -> TransactionResult<()> {
        self.check_writable()?;
        let statement = self.scope_statement(statement.clone());
        self.changes.delete(statement);
        Ok(())
    }

    /// Publish buffered writes.
    ///
    /// Fails with `Conflict` if the store moved past the snapshot, even when
    /// nothing was written. An empty changeset publishes nothing.
    pub fn execute(&mut self) -> TransactionResult<()> {
        self.check_open()?;
        let version = self.store.commit(self.base_version(), &self.changes)?;
        debug!(
            "Committed transaction ({} changes) at version {}",
            self.changes.len(),
            version
        );
        self.state = TransactionState::Executed;
        Ok(())
    }

    /// Discard buffered writes
    pub fn rollback(&mut self) -> TransactionResult<()> {
        match self.state {
            TransactionState::Executed => return Err(TransactionError::AlreadyExecuted),
            TransactionState::RolledBack => return Ok(()),
            TransactionState::Open => {}
        }
        debug!("Rolled back transaction ({} changes discarded)", self.changes.len());
        self.changes.clear();
        self.state = TransactionState::RolledBack;
        Ok(())
    }

    fn check_open(&self) -> TransactionResult<()> {
        match self.state {
            TransactionState::Open => Ok(()),
            TransactionState::Executed => Err(TransactionError::AlreadyExecuted),
            TransactionState::RolledBack => Err(TransactionError::RolledBack),
        }
    }

    fn check_writable(&self) -> TransactionResult<()> {
        self.check_open()?;
        if self.mutable {
            Ok(())
        } else {
            Err(TransactionError::ReadOnly)
        }
    }

    fn scope_statement(&self, statement: Statement) -> Statement {
        match &self.graph_name {
            Some(graph_name) if statement.is_default_graph() => statement.in_graph(graph_name.clone()),
            _ => statement,
        }
    }

    fn read_data(&self) -> Dataset {
        match &self.snapshot {
            Some(snapshot) => snapshot.data().clone(),
            None => self.store.data(),
        }
    }
}

impl Enumerable for Transaction<'_> {
    fn statements(&self) -> StatementIter<'_> {
        self.query_pattern(&Pattern::any())
    }

    fn has_statement(&self, statement: &Statement) -> bool {
        let in_scope = self
            .graph_name
            .as_ref()
            .map_or(true, |g| g == &statement.graph_name);
        in_scope && self.read_data().contains(statement)
    }
}

impl Queryable for Transaction<'_> {
    fn query_pattern(&self, pattern: &Pattern) -> StatementIter<'_> {
        let scoped = match &self.graph_name {
            Some(graph_name) => scope_pattern(pattern, graph_name),
            None => Some(pattern.clone()),
        };
        match scoped {
            Some(pattern) => self.read_data().query(&pattern.to_quad_pattern()),
            None => Box::new(std::iter::empty()),
        }
    }
}

impl Mutable for Transaction<'_> {
    type Error = TransactionError;

    fn insert_statement(&mut self, statement: Statement) -> TransactionResult<()> {
        self.insert(statement)
    }

    fn delete_statement(&mut self, statement: &Statement) -> TransactionResult<()> {
        self.delete(statement)
    }
}
