//! Pending deletes and inserts

use super::{Store, StoreResult};
use crate::rdf::Statement;

/// Ordered deletes and inserts, applied deletes first.
///
/// Neither list is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    deletes: Vec<Statement>,
    inserts: Vec<Statement>,
}

impl Changeset {
    /// Create an empty changeset
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a statement for insertion
    pub fn insert(&mut self, statement: Statement) {
        self.inserts.push(statement);
    }

    /// Queue a statement for deletion
    pub fn delete(&mut self, statement: Statement) {
        self.deletes.push(statement);
    }

    pub fn inserts(&self) -> &[Statement] {
        &self.inserts
    }

    pub fn deletes(&self) -> &[Statement] {
        &self.deletes
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.inserts.is_empty()
    }

    /// Total queued operations
    pub fn len(&self) -> usize {
        self.deletes.len() + self.inserts.len()
    }

    /// Drop everything queued
    pub fn clear(&mut self) {
        self.deletes.clear();
        self.inserts.clear();
    }

    /// Apply to a store as one published write
    pub fn apply(&self, store: &Store) -> StoreResult<()> {
        store.apply_changeset(self)
    }
}
