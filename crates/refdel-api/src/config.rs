use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::DeletePolicy;
use crate::schema::RelationshipId;

/// Mapping from relationship identifier to its delete policy.
///
/// Loaded once at startup by the bootstrap collaborator and handed to the
/// policy registry as an immutable snapshot. There is no implicit default:
/// a relationship without an entry fails registry validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig(BTreeMap<RelationshipId, DeletePolicy>);

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration from a JSON object mapping relationship
    /// identifiers to policy names, e.g. `{"orders_customer": "restrict"}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|err| ConfigError::InvalidJson(err.to_string()))
    }

    /// Sets the policy for a relationship.
    pub fn with_policy(
        mut self,
        relationship: impl Into<RelationshipId>,
        policy: DeletePolicy,
    ) -> Self {
        self.0.insert(relationship.into(), policy);
        self
    }

    /// Configured policy for the given relationship, if any.
    pub fn policy(&self, relationship: &RelationshipId) -> Option<DeletePolicy> {
        self.0.get(relationship).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelationshipId, DeletePolicy)> {
        self.0.iter().map(|(id, policy)| (id, *policy))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_load_config_from_json() {
        let config = PolicyConfig::from_json(
            r#"{"orders_customer": "restrict", "items_order": "cascade"}"#,
        )
        .expect("config should load");

        assert_eq!(config.len(), 2);
        assert_eq!(
            config.policy(&RelationshipId::from("orders_customer")),
            Some(DeletePolicy::Restrict)
        );
        assert_eq!(
            config.policy(&RelationshipId::from("items_order")),
            Some(DeletePolicy::Cascade)
        );
        assert_eq!(config.policy(&RelationshipId::from("unknown")), None);
    }

    #[test]
    fn test_should_reject_invalid_json() {
        let result = PolicyConfig::from_json(r#"{"orders_customer": "client-cascade"}"#);
        assert!(matches!(result, Err(ConfigError::InvalidJson(_))));
    }

    #[test]
    fn test_should_build_config_programmatically() {
        let config = PolicyConfig::new()
            .with_policy("orders_customer", DeletePolicy::SetNull)
            .with_policy("orders_customer", DeletePolicy::Restrict);

        // last write wins
        assert_eq!(config.len(), 1);
        assert_eq!(
            config.policy(&RelationshipId::from("orders_customer")),
            Some(DeletePolicy::Restrict)
        );
    }
}
