use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Unique identifier of a declared relationship.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId(pub String);

impl From<&str> for RelationshipId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RelationshipId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A one-to-many association between a parent table and a dependent table.
///
/// Declared once at configuration time and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDef {
    /// Unique name of the relationship.
    pub id: RelationshipId,
    /// Table owning the referenced primary key.
    pub parent_table: String,
    /// Table holding the foreign key.
    pub dependent_table: String,
    /// Name of the dependent column holding the parent reference.
    pub fk_column: String,
    /// Whether the foreign-key column may hold a null reference.
    pub fk_nullable: bool,
}

/// The set of tables and relationships the engine operates on.
///
/// Built once through [`SchemaDef::builder`] and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    tables: Vec<String>,
    relationships: Vec<RelationshipDef>,
}

impl SchemaDef {
    pub fn builder() -> SchemaDefBuilder {
        SchemaDefBuilder::default()
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn relationships(&self) -> &[RelationshipDef] {
        &self.relationships
    }

    /// Whether the given table is declared in the schema.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.iter().any(|table| table == name)
    }

    /// Looks up a relationship by its identifier.
    pub fn relationship(&self, id: &RelationshipId) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|rel| rel.id == *id)
    }

    /// Relationships in which the given table is the parent side.
    pub fn relationships_with_parent<'a, 'b>(
        &'a self,
        table: &'b str,
    ) -> impl Iterator<Item = &'a RelationshipDef> + use<'a, 'b> {
        self.relationships
            .iter()
            .filter(move |rel| rel.parent_table == table)
    }

    /// Relationships in which the given table is the dependent side.
    pub fn relationships_with_dependent<'a, 'b>(
        &'a self,
        table: &'b str,
    ) -> impl Iterator<Item = &'a RelationshipDef> + use<'a, 'b> {
        self.relationships
            .iter()
            .filter(move |rel| rel.dependent_table == table)
    }
}

/// Builder for [`SchemaDef`]; validates the declaration on build.
#[derive(Debug, Default)]
pub struct SchemaDefBuilder {
    tables: Vec<String>,
    relationships: Vec<RelationshipDef>,
}

impl SchemaDefBuilder {
    /// Declares a table.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.tables.push(name.into());
        self
    }

    /// Declares a one-to-many relationship.
    pub fn relationship(
        mut self,
        id: impl Into<RelationshipId>,
        parent_table: impl Into<String>,
        dependent_table: impl Into<String>,
        fk_column: impl Into<String>,
        fk_nullable: bool,
    ) -> Self {
        self.relationships.push(RelationshipDef {
            id: id.into(),
            parent_table: parent_table.into(),
            dependent_table: dependent_table.into(),
            fk_column: fk_column.into(),
            fk_nullable,
        });
        self
    }

    /// Validates and builds the schema.
    ///
    /// A schema is valid when relationship identifiers are unique and every
    /// relationship references declared tables.
    pub fn build(self) -> Result<SchemaDef, ConfigError> {
        for (i, rel) in self.relationships.iter().enumerate() {
            if self.relationships[..i].iter().any(|other| other.id == rel.id) {
                return Err(ConfigError::DuplicateRelationship(rel.id.clone()));
            }
            for table in [&rel.parent_table, &rel.dependent_table] {
                if !self.tables.iter().any(|declared| declared == table) {
                    return Err(ConfigError::UnknownTable {
                        id: rel.id.clone(),
                        table: table.clone(),
                    });
                }
            }
        }

        Ok(SchemaDef {
            tables: self.tables,
            relationships: self.relationships,
        })
    }
}
