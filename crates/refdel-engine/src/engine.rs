//! The delete executor: plans a deletion under the configured policies, then
//! applies the staged mutations atomically.

mod plan;
mod state;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use refdel_api::prelude::{
    ConfigError, EngineError, EngineResult, Outcome, PolicyConfig, RecordId, RelationshipId,
    SchemaDef, Storage, StorageError,
};

use self::plan::{Plan, Planner};
pub use self::state::DeletePhase;
use self::state::DeleteOperation;
use crate::locks::LockManager;
use crate::registry::PolicyRegistry;
use crate::report::{FinalState, report};

/// Maximum cascade recursion depth.
pub const MAX_CASCADE_DEPTH: usize = 32;

/// Default time an operation waits for relationship locks before aborting.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Cooperative cancellation flag for a delete operation.
///
/// Cancellation is observed any time before mutations are applied; once the
/// batch apply begins the operation runs to commit or full rollback.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The delete executor.
///
/// Holds the validated policy registry, the relationship lock manager and
/// the storage collaborator. Each deletion request runs as one logical
/// transaction: requests over disjoint relationship sets proceed in
/// parallel, conflicting requests are serialized by the lock manager.
pub struct DeleteEngine<S: Storage> {
    schema: SchemaDef,
    registry: PolicyRegistry,
    locks: LockManager,
    storage: RwLock<S>,
}

impl<S: Storage> DeleteEngine<S> {
    /// Builds the engine, validating the policy configuration against the
    /// schema. Configuration problems are surfaced here, never at delete
    /// time.
    pub fn new(schema: SchemaDef, config: &PolicyConfig, storage: S) -> Result<Self, ConfigError> {
        let registry = PolicyRegistry::new(&schema, config)?;
        let locks = LockManager::new(&schema, DEFAULT_LOCK_TIMEOUT);
        Ok(Self {
            schema,
            registry,
            locks,
            storage: RwLock::new(storage),
        })
    }

    /// Replaces the lock acquisition timeout.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.locks = LockManager::new(&self.schema, timeout);
        self
    }

    pub fn schema(&self) -> &SchemaDef {
        &self.schema
    }

    /// Executes a closure with read access to the storage collaborator.
    pub fn with_storage<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        f(&self.storage.read())
    }

    /// Executes a closure with write access to the storage collaborator.
    ///
    /// Meant for application-side record management (inserts, foreign-key
    /// reassignment); deletes of parents must go through
    /// [`DeleteEngine::delete_parent`].
    pub fn with_storage_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        f(&mut self.storage.write())
    }

    /// Deletes a parent record under the configured policies.
    ///
    /// The single entry point of the engine. Never panics: errors fold into
    /// [`Outcome::Failed`], carrying the typed error and leaving storage
    /// untouched.
    pub fn delete_parent(&self, table: &str, parent: RecordId) -> Outcome {
        match self.execute(table, parent, None) {
            Ok(outcome) => outcome,
            Err(error) => report(FinalState::Aborted { parent, error }),
        }
    }

    /// Same contract as [`DeleteEngine::delete_parent`], with a cooperative
    /// cancellation point before mutations are applied.
    pub fn delete_parent_cancellable(
        &self,
        table: &str,
        parent: RecordId,
        token: &CancelToken,
    ) -> Outcome {
        match self.execute(table, parent, Some(token)) {
            Ok(outcome) => outcome,
            Err(error) => report(FinalState::Aborted { parent, error }),
        }
    }

    /// `Result` form of [`DeleteEngine::delete_parent`] for callers
    /// propagating errors with `?`.
    pub fn try_delete_parent(&self, table: &str, parent: RecordId) -> EngineResult<Outcome> {
        self.execute(table, parent, None)
    }

    fn execute(
        &self,
        table: &str,
        parent: RecordId,
        cancel: Option<&CancelToken>,
    ) -> EngineResult<Outcome> {
        let mut op = DeleteOperation::new(table, parent);
        if cancel.is_some_and(CancelToken::is_cancelled) {
            op.advance(DeletePhase::Aborted);
            return Err(EngineError::Cancelled);
        }

        // serialize against operations touching an overlapping relationship
        // set; dependents are read only after acquisition
        let reachable = reachable_relationships(&self.schema, table);
        let _guards = self.locks.acquire(&reachable)?;

        for relationship in &reachable {
            self.registry.policy(relationship)?;
        }
        op.advance(DeletePhase::PolicyResolved);

        let plan = {
            let storage = self.storage.read();
            if !storage.contains_record(table, parent)? {
                return Err(EngineError::Storage(StorageError::RecordNotFound {
                    table: table.to_string(),
                    id: parent,
                }));
            }
            Planner::new(&self.schema, &self.registry, &*storage).plan(table, parent)?
        };
        op.advance(DeletePhase::DependentsFetched);

        match plan {
            Plan::Blocked { blocking } => {
                op.advance(DeletePhase::Blocked);
                Ok(report(FinalState::Blocked { parent, blocking }))
            }
            Plan::Commit {
                batch,
                cascaded,
                deferred,
            } => {
                // last cancellation point: nothing has been mutated yet
                if cancel.is_some_and(CancelToken::is_cancelled) {
                    op.advance(DeletePhase::Aborted);
                    return Err(EngineError::Cancelled);
                }
                op.advance(DeletePhase::ActionApplied);

                let result = self.storage.write().apply(batch);
                match result {
                    Ok(()) => {
                        op.advance(DeletePhase::Committed);
                        Ok(report(FinalState::Committed { parent, cascaded }))
                    }
                    Err(StorageError::ForeignKeyViolation {
                        table: dependent_table,
                        referencing,
                        ..
                    }) if deferred => {
                        op.advance(DeletePhase::Blocked);
                        Ok(report(FinalState::Blocked {
                            parent,
                            blocking: referencing
                                .into_iter()
                                .map(|id| (dependent_table.clone(), id))
                                .collect(),
                        }))
                    }
                    Err(err) => {
                        op.advance(DeletePhase::Aborted);
                        Err(err.into())
                    }
                }
            }
        }
    }
}

/// Relationships reachable from the given table by following dependent
/// tables transitively. This is the lock set of a delete operation.
fn reachable_relationships(schema: &SchemaDef, table: &str) -> BTreeSet<RelationshipId> {
    let mut pending = vec![table.to_string()];
    let mut seen: BTreeSet<String> = pending.iter().cloned().collect();
    let mut relationships = BTreeSet::new();

    while let Some(current) = pending.pop() {
        for rel in schema.relationships_with_parent(&current) {
            relationships.insert(rel.id.clone());
            if seen.insert(rel.dependent_table.clone()) {
                pending.push(rel.dependent_table.clone());
            }
        }
    }
    relationships
}
