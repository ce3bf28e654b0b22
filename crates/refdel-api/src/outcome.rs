use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::record::RecordId;

/// A record affected by a delete operation: its table and identity.
pub type AffectedRecord = (String, RecordId);

/// Caller-facing result of a parent delete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The parent was deleted; no dependents had to be removed.
    Deleted { parent: RecordId },
    /// The parent and its transitive dependents were deleted, atomically.
    DeletedCascaded {
        parent: RecordId,
        dependents: Vec<AffectedRecord>,
    },
    /// Deletion was blocked by existing dependents; nothing was mutated.
    ///
    /// Not a failure: the caller must remove or reassign the blocking
    /// dependents and retry.
    Blocked {
        parent: RecordId,
        blocking: Vec<AffectedRecord>,
    },
    /// The operation aborted before commit; nothing was mutated.
    Failed {
        parent: RecordId,
        error: EngineError,
    },
}

impl Outcome {
    /// Whether the parent record was removed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Deleted { .. } | Self::DeletedCascaded { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// The error carried by a failed outcome, if any.
    pub fn error(&self) -> Option<&EngineError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
