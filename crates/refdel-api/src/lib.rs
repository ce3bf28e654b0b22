#![crate_name = "refdel_api"]
#![crate_type = "lib"]

//! # Refdel API
//!
//! This crate exposes the types shared between the refdel delete policy
//! engine and its callers: the delete policy set, schema and relationship
//! declarations, the policy configuration snapshot, the storage collaborator
//! seam and the full error taxonomy.
//!
//! You can import all the useful types and traits by using the prelude
//! module:
//!
//! ```rust
//! use refdel_api::prelude::*;
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod record;
pub mod schema;
pub mod storage;

pub mod prelude {
    //! Re-exports of all public types.

    pub use crate::config::PolicyConfig;
    pub use crate::error::{
        ConfigError, ConstraintError, CycleError, EngineError, EngineResult, StorageError,
        StorageResult,
    };
    pub use crate::outcome::{AffectedRecord, Outcome};
    pub use crate::policy::DeletePolicy;
    pub use crate::record::{Record, RecordId};
    pub use crate::schema::{RelationshipDef, RelationshipId, SchemaDef, SchemaDefBuilder};
    pub use crate::storage::{Mutation, MutationBatch, Storage};
}
