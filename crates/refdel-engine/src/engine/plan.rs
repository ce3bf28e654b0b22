use std::collections::HashSet;

use refdel_api::prelude::{
    AffectedRecord, ConstraintError, CycleError, DeletePolicy, EngineResult, Mutation,
    MutationBatch, RecordId, SchemaDef, Storage,
};

use super::MAX_CASCADE_DEPTH;
use crate::index::RelationshipIndex;
use crate::registry::PolicyRegistry;

/// Output of the planning pass over a delete request.
///
/// Planning only reads; a returned batch has not been applied yet.
#[derive(Debug)]
pub(super) enum Plan {
    /// Existing dependents block the deletion under a restrict policy.
    Blocked { blocking: Vec<AffectedRecord> },
    /// The staged mutations, ready for one atomic apply.
    Commit {
        batch: MutationBatch,
        /// Records deleted in addition to the requested parent.
        cascaded: Vec<AffectedRecord>,
        /// Whether a no-action relationship deferred its check to storage.
        deferred: bool,
    },
}

/// Builds the mutation batch for a delete request by walking the
/// relationship graph, applying each relationship's configured policy.
pub(super) struct Planner<'a, S: Storage> {
    registry: &'a PolicyRegistry,
    index: RelationshipIndex<'a, S>,
}

#[derive(Default)]
struct PlanCtx {
    batch: MutationBatch,
    cascaded: Vec<AffectedRecord>,
    blocking: Vec<AffectedRecord>,
    deferred: bool,
    /// Records on the current traversal path; a revisit is a cycle.
    path: Vec<(String, RecordId)>,
    /// Records already planned anywhere in the traversal; a revisit through
    /// a sibling branch is a diamond, not a cycle, and is skipped.
    planned: HashSet<(String, RecordId)>,
}

impl<'a, S: Storage> Planner<'a, S> {
    pub fn new(schema: &'a SchemaDef, registry: &'a PolicyRegistry, storage: &'a S) -> Self {
        Self {
            registry,
            index: RelationshipIndex::new(schema, storage),
        }
    }

    /// Plans the deletion of `parent`.
    ///
    /// Any error leaves nothing behind: no mutation has been staged against
    /// storage at this point, planning is read-only.
    pub fn plan(&self, table: &str, parent: RecordId) -> EngineResult<Plan> {
        let mut ctx = PlanCtx::default();
        self.plan_record(table, parent, 0, &mut ctx)?;

        if !ctx.blocking.is_empty() {
            return Ok(Plan::Blocked {
                blocking: ctx.blocking,
            });
        }
        Ok(Plan::Commit {
            batch: ctx.batch,
            cascaded: ctx.cascaded,
            deferred: ctx.deferred,
        })
    }

    fn plan_record(
        &self,
        table: &str,
        id: RecordId,
        depth: usize,
        ctx: &mut PlanCtx,
    ) -> EngineResult<()> {
        let key = (table.to_string(), id);
        if ctx.path.contains(&key) {
            return Err(CycleError::Revisited {
                table: table.to_string(),
                id,
            }
            .into());
        }
        if depth > MAX_CASCADE_DEPTH {
            return Err(CycleError::DepthExceeded {
                max_depth: MAX_CASCADE_DEPTH,
            }
            .into());
        }
        if !ctx.planned.insert(key.clone()) {
            return Ok(());
        }
        ctx.path.push(key);

        let rels = self.index.relationships_for_parent(table);
        // resolve and validate all policies of this record before staging any
        // of its mutations
        let mut resolved = Vec::with_capacity(rels.len());
        for rel in rels {
            let policy = self.registry.policy(&rel.id)?;
            if policy == DeletePolicy::SetNull && !rel.fk_nullable {
                return Err(ConstraintError::NonNullableForeignKey {
                    table: rel.dependent_table.clone(),
                    column: rel.fk_column.clone(),
                }
                .into());
            }
            resolved.push((rel, policy));
        }

        for (rel, policy) in resolved {
            let dependents = self.index.find_dependents(rel, id)?;
            tracing::debug!(
                relationship = %rel.id,
                policy = %policy,
                dependents = dependents.len(),
                "applying delete policy"
            );
            match policy {
                DeletePolicy::Restrict => {
                    ctx.blocking.extend(
                        dependents
                            .into_iter()
                            .map(|dependent| (rel.dependent_table.clone(), dependent)),
                    );
                }
                DeletePolicy::NoAction => {
                    // no pre-check: the storage collaborator enforces the
                    // constraint at commit time
                    ctx.deferred = true;
                }
                DeletePolicy::SetNull => {
                    for dependent in dependents {
                        ctx.batch.push(Mutation::ClearForeignKey {
                            table: rel.dependent_table.clone(),
                            id: dependent,
                            column: rel.fk_column.clone(),
                        });
                    }
                }
                DeletePolicy::Cascade => {
                    for dependent in dependents {
                        self.plan_record(&rel.dependent_table, dependent, depth + 1, ctx)?;
                    }
                }
            }
        }

        ctx.path.pop();
        // dependents are staged before the record itself
        ctx.batch.push(Mutation::DeleteRecord {
            table: table.to_string(),
            id,
        });
        if depth > 0 {
            ctx.cascaded.push((table.to_string(), id));
        }
        Ok(())
    }
}
