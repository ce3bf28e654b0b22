use std::collections::HashMap;

use refdel_api::prelude::{
    ConfigError, DeletePolicy, EngineError, EngineResult, PolicyConfig, RelationshipId, SchemaDef,
};

/// Immutable snapshot of delete policies, one per declared relationship.
///
/// Built once at startup from the schema and the policy configuration; every
/// relationship must carry an explicit policy, there is no implicit default.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: HashMap<RelationshipId, DeletePolicy>,
}

impl PolicyRegistry {
    /// Validates the configuration against the schema and builds the
    /// registry.
    ///
    /// Fails when a declared relationship has no configured policy, or when
    /// the configuration names a relationship the schema does not declare.
    pub fn new(schema: &SchemaDef, config: &PolicyConfig) -> Result<Self, ConfigError> {
        for rel in schema.relationships() {
            if config.policy(&rel.id).is_none() {
                return Err(ConfigError::MissingPolicy(rel.id.clone()));
            }
        }
        for (id, policy) in config.iter() {
            let Some(rel) = schema.relationship(id) else {
                return Err(ConfigError::UnknownRelationship(id.clone()));
            };
            // statically contradictory: such a relationship can never be
            // deleted through, and every attempt will end in ConstraintError
            if policy == DeletePolicy::SetNull && !rel.fk_nullable {
                tracing::warn!(
                    relationship = %id,
                    column = %rel.fk_column,
                    "set-null policy configured on a non-nullable foreign key"
                );
            }
        }

        Ok(Self {
            policies: config
                .iter()
                .map(|(id, policy)| (id.clone(), policy))
                .collect(),
        })
    }

    /// Policy configured for the given relationship.
    ///
    /// Infallible for every relationship declared in the schema the registry
    /// was validated against.
    pub fn policy(&self, relationship: &RelationshipId) -> EngineResult<DeletePolicy> {
        self.policies.get(relationship).copied().ok_or_else(|| {
            EngineError::Config(ConfigError::MissingPolicy(relationship.clone()))
        })
    }
}
