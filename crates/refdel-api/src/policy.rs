use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Defines the behavior applied to dependent records when their parent is deleted.
///
/// Exactly one policy is configured per relationship and it never changes
/// during a single delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    /// Delete dependents along with the parent, recursively.
    Cascade,
    /// Clear the dependents' foreign key, then delete the parent.
    SetNull,
    /// Block the deletion while dependents exist. Checked by the engine
    /// before any mutation is staged.
    Restrict,
    /// Same observable contract as [`DeletePolicy::Restrict`], but the check
    /// is performed by the storage collaborator at commit time.
    NoAction,
}

impl DeletePolicy {
    /// Whether enforcement is deferred to the storage collaborator.
    pub fn defers_to_storage(&self) -> bool {
        matches!(self, Self::NoAction)
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cascade => write!(f, "cascade"),
            Self::SetNull => write!(f, "set-null"),
            Self::Restrict => write!(f, "restrict"),
            Self::NoAction => write!(f, "no-action"),
        }
    }
}

impl FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cascade" => Ok(Self::Cascade),
            "set-null" => Ok(Self::SetNull),
            "restrict" => Ok(Self::Restrict),
            "no-action" => Ok(Self::NoAction),
            other => Err(format!("unknown delete policy '{other}'")),
        }
    }
}
