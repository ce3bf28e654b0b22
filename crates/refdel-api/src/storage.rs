use serde::{Deserialize, Serialize};

use crate::error::StorageResult;
use crate::record::RecordId;
use crate::schema::RelationshipDef;

/// A single storage mutation staged by the delete executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Clear the given foreign-key column of a record.
    ClearForeignKey {
        table: String,
        id: RecordId,
        column: String,
    },
    /// Remove a record.
    DeleteRecord { table: String, id: RecordId },
}

/// Ordered list of mutations applied as one atomic unit.
///
/// The executor stages dependents before their parent, so applying the batch
/// in order never leaves a dangling reference behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationBatch(Vec<Mutation>);

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.0.push(mutation);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for MutationBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Transactional storage collaborator consumed by the delete engine.
///
/// The engine never reimplements persistence; it only orchestrates reads and
/// an atomic batch apply against this seam. Implementations must guarantee
/// that [`Storage::apply`] either applies every mutation or none.
pub trait Storage {
    /// Whether the given record exists.
    fn contains_record(&self, table: &str, id: RecordId) -> StorageResult<bool>;

    /// Records in the relationship's dependent table whose foreign-key column
    /// references `parent`.
    ///
    /// Must reflect the current persisted state at call time; callers rely on
    /// fresh reads and never cache the result across calls.
    fn dependents_of(&self, rel: &RelationshipDef, parent: RecordId)
    -> StorageResult<Vec<RecordId>>;

    /// Applies the batch atomically.
    ///
    /// On error no mutation may be observable, including referential
    /// integrity violations detected mid-batch.
    fn apply(&mut self, batch: MutationBatch) -> StorageResult<()>;
}
