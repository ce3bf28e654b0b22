use std::collections::BTreeMap;

use refdel_api::prelude::{
    Mutation, MutationBatch, Record, RecordId, RelationshipDef, SchemaDef, Storage, StorageError,
    StorageResult,
};

type Tables = BTreeMap<String, BTreeMap<RecordId, Record>>;

/// Schema-aware in-memory implementation of the [`Storage`] collaborator.
///
/// Records live in per-table ordered maps. Batches are applied with a
/// stage-validate-swap scheme: mutations run against a staged copy, the copy
/// is integrity-checked, and only then swapped in. A failing batch therefore
/// leaves the storage byte-for-byte unchanged, which is what the engine's
/// rollback guarantee relies on.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    schema: SchemaDef,
    tables: Tables,
}

impl MemoryStorage {
    /// Creates an empty storage for the given schema.
    pub fn new(schema: SchemaDef) -> Self {
        let tables = schema
            .tables()
            .iter()
            .map(|table| (table.clone(), BTreeMap::new()))
            .collect();
        Self { schema, tables }
    }

    /// Inserts a record, validating its foreign keys against the schema.
    ///
    /// An insert is valid when the table is declared, the record's id is
    /// unused, every foreign-key column belongs to a declared relationship,
    /// every non-null reference points at an existing parent and every null
    /// reference is allowed by the column's nullability.
    pub fn insert(&mut self, table: &str, record: Record) -> StorageResult<()> {
        if !self.schema.has_table(table) {
            return Err(StorageError::TableNotFound {
                table: table.to_string(),
            });
        }
        if self.record(table, record.id).is_some() {
            return Err(StorageError::DuplicateRecord {
                table: table.to_string(),
                id: record.id,
            });
        }
        for column in record.foreign_keys.keys() {
            let declared = self
                .schema
                .relationships_with_dependent(table)
                .any(|rel| rel.fk_column == *column);
            if !declared {
                return Err(StorageError::UnknownColumn {
                    table: table.to_string(),
                    column: column.clone(),
                });
            }
        }
        for rel in self.schema.relationships_with_dependent(table) {
            match record.foreign_keys.get(&rel.fk_column).copied().flatten() {
                Some(parent) => {
                    if self.record(&rel.parent_table, parent).is_none() {
                        return Err(StorageError::BrokenReference {
                            table: table.to_string(),
                            column: rel.fk_column.clone(),
                            parent,
                        });
                    }
                }
                None if !rel.fk_nullable => {
                    return Err(StorageError::NullNotAllowed {
                        table: table.to_string(),
                        column: rel.fk_column.clone(),
                    });
                }
                None => {}
            }
        }

        self.tables
            .get_mut(table)
            .expect("declared tables are always materialized")
            .insert(record.id, record);
        Ok(())
    }

    /// Reassigns or clears a foreign-key column of an existing record.
    ///
    /// This is the application-side escape hatch for a blocked delete: move
    /// the dependents to another parent, or detach them, then retry.
    pub fn set_foreign_key(
        &mut self,
        table: &str,
        id: RecordId,
        column: &str,
        parent: Option<RecordId>,
    ) -> StorageResult<()> {
        let rel = self
            .schema
            .relationships_with_dependent(table)
            .find(|rel| rel.fk_column == column)
            .cloned()
            .ok_or_else(|| StorageError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        match parent {
            Some(parent) if self.record(&rel.parent_table, parent).is_none() => {
                return Err(StorageError::BrokenReference {
                    table: table.to_string(),
                    column: column.to_string(),
                    parent,
                });
            }
            None if !rel.fk_nullable => {
                return Err(StorageError::NullNotAllowed {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
            _ => {}
        }

        let record = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound {
                table: table.to_string(),
            })?
            .get_mut(&id)
            .ok_or_else(|| StorageError::RecordNotFound {
                table: table.to_string(),
                id,
            })?;
        record.foreign_keys.insert(column.to_string(), parent);
        Ok(())
    }

    /// Reads a record.
    pub fn record(&self, table: &str, id: RecordId) -> Option<&Record> {
        self.tables.get(table).and_then(|records| records.get(&id))
    }

    /// Number of records in a table; zero for unknown tables.
    pub fn table_len(&self, table: &str) -> usize {
        self.tables.get(table).map(BTreeMap::len).unwrap_or(0)
    }

    /// Verifies that no record references a missing parent.
    ///
    /// This is the commit-time backstop the no-action policy defers to.
    fn check_integrity(schema: &SchemaDef, tables: &Tables) -> StorageResult<()> {
        for rel in schema.relationships() {
            let parents = tables.get(&rel.parent_table);
            let Some(dependents) = tables.get(&rel.dependent_table) else {
                continue;
            };
            let dangling: Vec<RecordId> = dependents
                .values()
                .filter(|record| {
                    record
                        .foreign_key(&rel.fk_column)
                        .is_some_and(|parent| !parents.is_some_and(|p| p.contains_key(&parent)))
                })
                .map(|record| record.id)
                .collect();
            if !dangling.is_empty() {
                return Err(StorageError::ForeignKeyViolation {
                    table: rel.dependent_table.clone(),
                    column: rel.fk_column.clone(),
                    referencing: dangling,
                });
            }
        }
        Ok(())
    }

    fn apply_to(tables: &mut Tables, mutation: Mutation) -> StorageResult<()> {
        match mutation {
            Mutation::ClearForeignKey { table, id, column } => {
                let record = tables
                    .get_mut(&table)
                    .ok_or_else(|| StorageError::TableNotFound {
                        table: table.clone(),
                    })?
                    .get_mut(&id)
                    .ok_or_else(|| StorageError::RecordNotFound {
                        table: table.clone(),
                        id,
                    })?;
                record.foreign_keys.insert(column, None);
                Ok(())
            }
            Mutation::DeleteRecord { table, id } => {
                let removed = tables
                    .get_mut(&table)
                    .ok_or_else(|| StorageError::TableNotFound {
                        table: table.clone(),
                    })?
                    .remove(&id);
                if removed.is_none() {
                    return Err(StorageError::RecordNotFound { table, id });
                }
                Ok(())
            }
        }
    }
}

impl Storage for MemoryStorage {
    fn contains_record(&self, table: &str, id: RecordId) -> StorageResult<bool> {
        if !self.schema.has_table(table) {
            return Err(StorageError::TableNotFound {
                table: table.to_string(),
            });
        }
        Ok(self.record(table, id).is_some())
    }

    fn dependents_of(
        &self,
        rel: &RelationshipDef,
        parent: RecordId,
    ) -> StorageResult<Vec<RecordId>> {
        let records =
            self.tables
                .get(&rel.dependent_table)
                .ok_or_else(|| StorageError::TableNotFound {
                    table: rel.dependent_table.clone(),
                })?;
        Ok(records
            .values()
            .filter(|record| record.foreign_key(&rel.fk_column) == Some(parent))
            .map(|record| record.id)
            .collect())
    }

    fn apply(&mut self, batch: MutationBatch) -> StorageResult<()> {
        let mut staged = self.tables.clone();
        for mutation in batch {
            Self::apply_to(&mut staged, mutation)?;
        }
        Self::check_integrity(&self.schema, &staged)?;
        self.tables = staged;
        Ok(())
    }
}
