#![crate_name = "refdel_engine"]
#![crate_type = "lib"]

//! # Refdel Engine
//!
//! A referential delete policy engine: given a deletion request for a parent
//! record, it consults the configured policy for each relationship and either
//! cascades the removal, detaches the dependents, blocks the deletion or
//! defers the check to the storage collaborator.
//!
//! The engine orchestrates a pluggable [`Storage`](refdel_api::storage::Storage)
//! seam; it never reimplements persistence. All mutations of one delete
//! operation are applied as a single atomic batch, so no partial state is
//! ever observable.
//!
//! ```rust
//! use refdel_engine::prelude::*;
//!
//! let schema = SchemaDef::builder()
//!     .table("customers")
//!     .table("orders")
//!     .relationship("orders_customer", "customers", "orders", "customer_id", true)
//!     .build()
//!     .unwrap();
//!
//! let mut storage = MemoryStorage::new(schema.clone());
//! storage.insert("customers", Record::new(1)).unwrap();
//! storage
//!     .insert("orders", Record::new(10).with_foreign_key("customer_id", Some(RecordId(1))))
//!     .unwrap();
//!
//! let config = PolicyConfig::from_json(r#"{"orders_customer": "restrict"}"#).unwrap();
//! let engine = DeleteEngine::new(schema, &config, storage).unwrap();
//!
//! let outcome = engine.delete_parent("customers", RecordId(1));
//! assert!(outcome.is_blocked());
//! ```

pub mod engine;
pub mod index;
pub mod locks;
pub mod memory;
pub mod registry;
pub mod report;
#[cfg(test)]
mod tests;

pub use refdel_api as api;

pub mod prelude {
    //! Re-exports of the engine types and of the whole [`refdel_api`]
    //! prelude.

    pub use refdel_api::prelude::*;

    pub use crate::engine::{CancelToken, DeleteEngine, DeletePhase, MAX_CASCADE_DEPTH};
    pub use crate::index::RelationshipIndex;
    pub use crate::locks::LockManager;
    pub use crate::memory::MemoryStorage;
    pub use crate::registry::PolicyRegistry;
    pub use crate::report::{FinalState, report};
}
