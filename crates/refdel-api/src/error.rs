use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::RecordId;
use crate::schema::RelationshipId;

/// Top-level error type of the delete policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("constraint error: {0}")]
    Constraint(#[from] ConstraintError),
    #[error("cycle error: {0}")]
    Cycle(#[from] CycleError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("delete operation cancelled before mutations were applied")]
    Cancelled,
}

impl EngineError {
    /// Whether the failed operation may be retried as-is.
    ///
    /// Lock timeouts, storage contention and cancellations are transient;
    /// everything else requires the caller to change something first.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(err) => err.is_retryable(),
            Self::Cancelled => true,
            _ => false,
        }
    }
}

/// Engine result type.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors in the schema or policy configuration.
///
/// These are surfaced at startup validation, never first discovered at
/// delete time.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("no delete policy registered for relationship '{0}'")]
    MissingPolicy(RelationshipId),
    #[error("delete policy registered for unknown relationship '{0}'")]
    UnknownRelationship(RelationshipId),
    #[error("duplicate relationship '{0}'")]
    DuplicateRelationship(RelationshipId),
    #[error("relationship '{id}' references undeclared table '{table}'")]
    UnknownTable { id: RelationshipId, table: String },
    #[error("invalid policy configuration: {0}")]
    InvalidJson(String),
}

/// Schema constraint violated by the requested delete action.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConstraintError {
    #[error(
        "cannot set-null foreign key '{column}' on table '{table}': column is not nullable"
    )]
    NonNullableForeignKey { table: String, column: String },
}

/// Cascade traversal failures. Detected before any mutation is staged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CycleError {
    #[error("cascade revisits record {id} in table '{table}' already pending deletion")]
    Revisited { table: String, id: RecordId },
    #[error("cascade exceeded the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },
}

/// Errors reported by the storage collaborator or the lock manager.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StorageError {
    #[error("table '{table}' not found")]
    TableNotFound { table: String },
    #[error("record {id} not found in table '{table}'")]
    RecordNotFound { table: String, id: RecordId },
    #[error("record {id} already exists in table '{table}'")]
    DuplicateRecord { table: String, id: RecordId },
    #[error("table '{table}' has no foreign-key column '{column}'")]
    UnknownColumn { table: String, column: String },
    #[error("foreign key '{column}' on table '{table}' is not nullable")]
    NullNotAllowed { table: String, column: String },
    #[error("foreign key '{column}' on table '{table}' references missing record {parent}")]
    BrokenReference {
        table: String,
        column: String,
        parent: RecordId,
    },
    #[error(
        "foreign key constraint violation: records in table '{table}' still reference the deleted record through '{column}'"
    )]
    ForeignKeyViolation {
        table: String,
        column: String,
        referencing: Vec<RecordId>,
    },
    #[error("timed out waiting for the lock on relationship '{0}'")]
    LockTimeout(RelationshipId),
    #[error("storage contention: {0}")]
    Contention(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StorageError {
    /// Transient failures the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_) | Self::Contention(_))
    }
}

/// Storage result type.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_classify_retryable_errors() {
        assert!(
            EngineError::Storage(StorageError::LockTimeout(RelationshipId::from("rel")))
                .is_retryable()
        );
        assert!(
            EngineError::Storage(StorageError::Contention("busy".to_string())).is_retryable()
        );
        assert!(EngineError::Cancelled.is_retryable());
        assert!(
            !EngineError::Config(ConfigError::MissingPolicy(RelationshipId::from("rel")))
                .is_retryable()
        );
        assert!(
            !EngineError::Storage(StorageError::TableNotFound {
                table: "orders".to_string()
            })
            .is_retryable()
        );
    }

    #[test]
    fn test_should_wrap_sub_errors() {
        let err: EngineError = ConstraintError::NonNullableForeignKey {
            table: "orders".to_string(),
            column: "customer_id".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Constraint(_)));
        assert!(err.to_string().contains("customer_id"));
    }
}
