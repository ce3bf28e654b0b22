use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use refdel_api::prelude::{RelationshipId, SchemaDef, StorageError, StorageResult};

/// Serializes delete operations that touch overlapping relationship sets.
///
/// One mutex per declared relationship. Operations acquire the locks for
/// every relationship they can reach, always in identifier order so two
/// concurrent operations can never deadlock on each other; operations over
/// disjoint relationship sets proceed in parallel.
pub struct LockManager {
    locks: BTreeMap<RelationshipId, Mutex<()>>,
    timeout: Duration,
}

impl LockManager {
    pub fn new(schema: &SchemaDef, timeout: Duration) -> Self {
        Self {
            locks: schema
                .relationships()
                .iter()
                .map(|rel| (rel.id.clone(), Mutex::new(())))
                .collect(),
            timeout,
        }
    }

    /// Acquires the locks for the given relationships, in identifier order.
    ///
    /// A lock that cannot be acquired within the configured timeout surfaces
    /// as a retryable [`StorageError::LockTimeout`], never as a policy
    /// decision. Guards are released together when the returned set drops.
    pub fn acquire(
        &self,
        relationships: &BTreeSet<RelationshipId>,
    ) -> StorageResult<Vec<MutexGuard<'_, ()>>> {
        let mut guards = Vec::with_capacity(relationships.len());
        for id in relationships {
            let Some(lock) = self.locks.get(id) else {
                continue;
            };
            let guard = lock
                .try_lock_for(self.timeout)
                .ok_or_else(|| StorageError::LockTimeout(id.clone()))?;
            guards.push(guard);
        }
        Ok(guards)
    }
}
