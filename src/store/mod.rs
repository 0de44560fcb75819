//! In-memory quad store
//!
//! The store publishes one immutable [`Dataset`] root behind a lock. Every
//! write builds a new root sharing untouched sub-trees with the old one and
//! swaps it in; readers and snapshots keep whatever root they captured.
//!
//! # Example
//!
//! ```rust
//! use quadstore::rdf::{NamedNode, Statement};
//! use quadstore::{Enumerable, Store};
//!
//! let store = Store::new();
//! let s = NamedNode::new("http://example.org/s").unwrap();
//! let p = NamedNode::new("http://example.org/p").unwrap();
//! let o = NamedNode::new("http://example.org/o").unwrap();
//!
//! let snapshot = store.snapshot().unwrap();
//! store.insert(Statement::new(s, p, o)).unwrap();
//!
//! assert_eq!(store.len(), 1);
//! assert!(snapshot.is_empty());
//! ```

pub mod changeset;
pub mod config;
pub mod graph;
pub mod transaction;

pub use changeset::Changeset;
pub use config::StoreConfig;
pub use graph::GraphView;
pub use transaction::{Transaction, TransactionError, TransactionResult, TransactionState};

use crate::enumerable::{Enumerable, Mutable, Queryable};
use crate::query::Pattern;
use crate::rdf::{GraphName, Statement};
use crate::storage::{Dataset, StatementIter};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Subject, predicate or object missing
    #[error("Incomplete statement: {0}")]
    IncompleteStatement(String),

    /// Direct write to an immutable store
    #[error("Store is immutable")]
    Immutable,

    /// Named graph statement on a store without graph support
    #[error("Named graphs are not supported: {0}")]
    GraphNamesUnsupported(String),

    /// Snapshot requested from a store without snapshot support
    #[error("Snapshots are not supported")]
    SnapshotsUnsupported,

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Optional store capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Named graphs
    GraphName,
    /// Forward-chaining inference (never supported)
    Inference,
    /// Literals compare by value, datatype and language
    LiteralEquality,
    /// Multi-statement writes publish atomically
    AtomicWrite,
    /// Immutable point-in-time snapshots
    Snapshots,
}

/// Transaction isolation levels, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Snapshot,
    Serializable,
}

/// The published root and its version
#[derive(Debug)]
struct Published {
    data: Dataset,
    version: u64,
}

impl Published {
    /// Swap in a new root; the version moves only when the root changes
    fn replace(&mut self, data: Dataset) -> bool {
        if data.ptr_eq(&self.data) {
            return false;
        }
        self.data = data;
        self.version += 1;
        true
    }
}

/// Thread-safe in-memory quad store
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
    published: RwLock<Published>,
}

impl Store {
    /// Create an empty store with the default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store
    pub fn with_config(config: StoreConfig) -> Self {
        info!(
            "Created store (graph names: {}, snapshots: {}, mutable: {})",
            config.with_graph_name, config.snapshots, config.mutable
        );
        Self {
            config,
            published: RwLock::new(Published {
                data: Dataset::new(),
                version: 0,
            }),
        }
    }

    /// Create a store holding `statements`; works for immutable stores too
    pub fn load(
        config: StoreConfig,
        statements: impl IntoIterator<Item = Statement>,
    ) -> StoreResult<Self> {
        let store = Self::with_config(config);
        let mut data = Dataset::new();
        for statement in statements {
            store.check_statement(&statement)?;
            data = data.insert(&statement);
        }
        info!("Loaded {} statements", data.len());
        store.write().replace(data);
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn is_mutable(&self) -> bool {
        self.config.mutable
    }

    /// Check if a capability is available
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::GraphName => self.config.with_graph_name,
            Feature::Inference => false,
            Feature::LiteralEquality => true,
            Feature::AtomicWrite => true,
            Feature::Snapshots => self.config.snapshots,
        }
    }

    /// Isolation offered to transactions
    pub fn isolation_level(&self) -> IsolationLevel {
        if self.config.snapshots {
            IsolationLevel::Serializable
        } else {
            IsolationLevel::ReadCommitted
        }
    }

    /// Version of the published root; bumps on every effective write
    pub fn version(&self) -> u64 {
        self.read().version
    }

    /// Immutable view of the current root, O(1)
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        if !self.config.snapshots {
            return Err(StoreError::SnapshotsUnsupported);
        }
        let published = self.read();
        Ok(Snapshot {
            data: published.data.clone(),
            version: published.version,
        })
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a statement is present
    pub fn contains(&self, statement: &Statement) -> bool {
        self.read().data.contains(statement)
    }

    /// Insert a statement; inserting an existing statement is a no-op
    pub fn insert(&self, statement: Statement) -> StoreResult<()> {
        self.insert_all(std::iter::once(statement))
    }

    /// Delete a statement; deleting an absent statement is a no-op
    pub fn delete(&self, statement: &Statement) -> StoreResult<()> {
        self.delete_insert(std::slice::from_ref(statement), &[])
    }

    /// Insert many statements as one published write
    pub fn insert_all(&self, statements: impl IntoIterator<Item = Statement>) -> StoreResult<()> {
        let statements: Vec<Statement> = statements.into_iter().collect();
        self.delete_insert(&[], &statements)
    }

    /// Delete many statements as one published write
    pub fn delete_all<'a>(
        &self,
        statements: impl IntoIterator<Item = &'a Statement>,
    ) -> StoreResult<()> {
        let statements: Vec<Statement> = statements.into_iter().cloned().collect();
        self.delete_insert(&statements, &[])
    }

    /// Delete, then insert, as one published write
    pub fn delete_insert(&self, deletes: &[Statement], inserts: &[Statement]) -> StoreResult<()> {
        self.check_writable()?;
        for statement in inserts {
            self.check_statement(statement)?;
        }
        let mut published = self.write();
        let data = published.data.apply(deletes, inserts);
        if published.replace(data) {
            debug!(
                "Published version {} ({} deletes, {} inserts)",
                published.version,
                deletes.len(),
                inserts.len()
            );
        }
        Ok(())
    }

    /// Apply a changeset, deletes first, as one published write
    pub fn apply_changeset(&self, changes: &Changeset) -> StoreResult<()> {
        self.delete_insert(changes.deletes(), changes.inserts())
    }

    /// Remove every statement
    pub fn clear(&self) -> StoreResult<()> {
        self.check_writable()?;
        let mut published = self.write();
        if published.replace(Dataset::new()) {
            debug!("Cleared store at version {}", published.version);
        }
        Ok(())
    }

    /// Views of every graph holding statements, default graph included
    pub fn each_graph(&self) -> impl Iterator<Item = GraphView<'_, Store>> {
        let keys: Vec<GraphName> = self.read().data.graph_keys().cloned().collect();
        keys.into_iter().map(move |graph_name| GraphView::new(self, graph_name))
    }

    /// Open a transaction.
    ///
    /// With `graph_name`, reads are confined to that graph and default-graph
    /// writes are placed in it.
    pub fn begin_transaction(
        &self,
        mutable: bool,
        graph_name: Option<GraphName>,
    ) -> TransactionResult<Transaction<'_>> {
        Transaction::begin(self, mutable, graph_name)
    }

    /// Open a transaction over all graphs
    pub fn transaction(&self, mutable: bool) -> TransactionResult<Transaction<'_>> {
        self.begin_transaction(mutable, None)
    }

    /// Run `f` in a mutable transaction.
    ///
    /// The transaction is executed when `f` returns `Ok` and rolled back
    /// when it returns `Err`.
    pub fn transact<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, E>,
        E: From<TransactionError>,
    {
        let mut tx = self.transaction(true)?;
        match f(&mut tx) {
            Ok(value) => {
                tx.execute()?;
                Ok(value)
            }
            Err(e) => {
                tx.rollback()?;
                Err(e)
            }
        }
    }

    /// Publish a transaction's changes if the root is still at `base_version`.
    ///
    /// The check runs even for an empty changeset. `None` skips it
    /// (read-committed stores).
    pub(crate) fn commit(
        &self,
        base_version: Option<u64>,
        changes: &Changeset,
    ) -> TransactionResult<u64> {
        for statement in changes.inserts() {
            self.check_statement(statement)?;
        }
        let mut published = self.write();
        if let Some(base) = base_version {
            if published.version != base {
                warn!(
                    "Transaction conflict: base version {}, live version {}",
                    base, published.version
                );
                return Err(TransactionError::Conflict {
                    base,
                    live: published.version,
                });
            }
        }
        if !changes.is_empty() {
            let data = published.data.apply(changes.deletes(), changes.inserts());
            published.replace(data);
        }
        Ok(published.version)
    }

    /// Current root, O(1)
    pub(crate) fn data(&self) -> Dataset {
        self.read().data.clone()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.config.mutable {
            Ok(())
        } else {
            Err(StoreError::Immutable)
        }
    }

    fn check_statement(&self, statement: &Statement) -> StoreResult<()> {
        if !self.config.with_graph_name && !statement.is_default_graph() {
            return Err(StoreError::GraphNamesUnsupported(statement.to_string()));
        }
        Ok(())
    }

    // The guarded value is a single root handle that is only ever replaced
    // whole, so a poisoned lock still holds a consistent root.
    fn read(&self) -> RwLockReadGuard<'_, Published> {
        self.published.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Published> {
        self.published.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Enumerable for Store {
    fn statements(&self) -> StatementIter<'_> {
        self.data().statements()
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        Store::is_empty(self)
    }

    fn has_statement(&self, statement: &Statement) -> bool {
        self.contains(statement)
    }

    fn has_graph(&self, graph_name: &GraphName) -> bool {
        self.read().data.has_graph(graph_name)
    }

    fn graph_names(&self) -> Vec<GraphName> {
        self.read()
            .data
            .graph_keys()
            .filter(|g| !g.is_default_graph())
            .cloned()
            .collect()
    }
}

impl Queryable for Store {
    fn query_pattern(&self, pattern: &Pattern) -> StatementIter<'_> {
        self.data().query(&pattern.to_quad_pattern())
    }
}

impl Mutable for Store {
    type Error = StoreError;

    fn insert_statement(&mut self, statement: Statement) -> StoreResult<()> {
        self.insert(statement)
    }

    fn delete_statement(&mut self, statement: &Statement) -> StoreResult<()> {
        self.delete(statement)
    }
}

/// Immutable point-in-time view of a store
#[derive(Debug, Clone)]
pub struct Snapshot {
    data: Dataset,
    version: u64,
}

impl Snapshot {
    /// Store version the snapshot was taken at
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.data.contains(statement)
    }
}

impl Enumerable for Snapshot {
    fn statements(&self) -> StatementIter<'_> {
        self.data.statements()
    }

    fn count(&self) -> usize {
        self.data.len()
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn has_statement(&self, statement: &Statement) -> bool {
        self.data.contains(statement)
    }

    fn has_graph(&self, graph_name: &GraphName) -> bool {
        self.data.has_graph(graph_name)
    }
}

impl Queryable for Snapshot {
    fn query_pattern(&self, pattern: &Pattern) -> StatementIter<'_> {
        self.data.query(&pattern.to_quad_pattern())
    }
}
