use refdel_api::prelude::{
    RecordId, RelationshipDef, SchemaDef, Storage, StorageResult,
};

/// Read-side lookup of dependent records, always against current storage
/// state.
///
/// The index never caches: every call goes back to the storage collaborator,
/// so a lookup repeated after acquiring locks reflects concurrent changes
/// instead of acting on stale dependents.
pub struct RelationshipIndex<'a, S: Storage> {
    schema: &'a SchemaDef,
    storage: &'a S,
}

impl<'a, S: Storage> RelationshipIndex<'a, S> {
    pub fn new(schema: &'a SchemaDef, storage: &'a S) -> Self {
        Self { schema, storage }
    }

    /// Relationships in which the given table is the parent side.
    pub fn relationships_for_parent(&self, table: &str) -> Vec<&'a RelationshipDef> {
        self.schema.relationships_with_parent(table).collect()
    }

    /// Identifiers of the records referencing `parent` through the given
    /// relationship. Fresh read on every call.
    pub fn find_dependents(
        &self,
        rel: &RelationshipDef,
        parent: RecordId,
    ) -> StorageResult<Vec<RecordId>> {
        self.storage.dependents_of(rel, parent)
    }
}

#[cfg(test)]
mod test {

    use refdel_api::prelude::Record;

    use super::*;
    use crate::memory::MemoryStorage;

    #[test]
    fn test_should_reflect_storage_state_on_every_call() {
        let schema = SchemaDef::builder()
            .table("customers")
            .table("orders")
            .relationship("orders_customer", "customers", "orders", "customer_id", true)
            .build()
            .expect("schema should build");
        let rel = schema
            .relationship(&"orders_customer".into())
            .expect("relationship should exist")
            .clone();

        let mut storage = MemoryStorage::new(schema.clone());
        storage
            .insert("customers", Record::new(1))
            .expect("customer should insert");

        {
            let index = RelationshipIndex::new(&schema, &storage);
            assert!(
                index
                    .find_dependents(&rel, RecordId(1))
                    .expect("lookup should succeed")
                    .is_empty()
            );
        }

        storage
            .insert(
                "orders",
                Record::new(10).with_foreign_key("customer_id", Some(RecordId(1))),
            )
            .expect("order should insert");

        let index = RelationshipIndex::new(&schema, &storage);
        assert_eq!(
            index
                .find_dependents(&rel, RecordId(1))
                .expect("lookup should succeed"),
            vec![RecordId(10)]
        );
        assert_eq!(index.relationships_for_parent("customers").len(), 1);
        assert!(index.relationships_for_parent("orders").is_empty());
    }
}
