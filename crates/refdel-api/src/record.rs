use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a stored record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RecordId(pub u64);

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stored record: its identity plus the foreign-key columns it holds.
///
/// A record may be a dependent in one relationship and a parent in another
/// at the same time; only its foreign-key columns are modeled here, since
/// they are the only attributes the delete engine ever reads or mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key of the record.
    pub id: RecordId,
    /// Foreign-key column name to referenced parent, if any.
    pub foreign_keys: BTreeMap<String, Option<RecordId>>,
}

impl Record {
    /// Creates a record with no foreign keys.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            foreign_keys: BTreeMap::new(),
        }
    }

    /// Sets a foreign-key column on the record.
    pub fn with_foreign_key(
        mut self,
        column: impl Into<String>,
        parent: Option<RecordId>,
    ) -> Self {
        self.foreign_keys.insert(column.into(), parent);
        self
    }

    /// Value of the given foreign-key column; `None` if the column is absent,
    /// which is treated as a null reference.
    pub fn foreign_key(&self, column: &str) -> Option<RecordId> {
        self.foreign_keys.get(column).copied().flatten()
    }
}
