//! Entity-to-table metadata.
//!
//! The engine only consumes the [`EntityMetadata`] trait; [`EntityRegistry`]
//! is an in-memory implementation loadable from TOML or JSON.
//!
//! ```toml
//! [[entities]]
//! name = "User"
//! table = "users"
//!
//! [[entities.fields]]
//! property = "id"
//! data_type = "BigInt"
//! primary_key = true
//! identity = true
//!
//! [[entities.fields]]
//! property = "name"
//! column = "user_name"
//! data_type = { String = 64 }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::error::{ForgeError, ForgeResult};

/// Lookup of entity definitions by modeled type name.
pub trait EntityMetadata: Send + Sync {
    fn entity(&self, name: &str) -> ForgeResult<&EntityDef>;

    fn field(&self, entity: &str, property: &str) -> ForgeResult<&EntityField> {
        self.entity(entity)?
            .field(property)
            .ok_or_else(|| ForgeError::unknown_field(entity, property))
    }

    fn primary_key_fields(&self, entity: &str) -> ForgeResult<Vec<&EntityField>> {
        Ok(self.entity(entity)?.primary_key_fields().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub table: String,
    pub fields: Vec<EntityField>,
    #[serde(default)]
    pub indexes: Vec<IndexDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityField {
    pub property: String,
    /// Defaults to the property name.
    #[serde(default)]
    pub column: Option<String>,
    pub data_type: DataType,
    #[serde(default)]
    pub primary_key: bool,
    /// Natural ordering column; preferred over the primary key when a
    /// deterministic sort has to be synthesized.
    #[serde(default)]
    pub sequence: bool,
    /// Database-generated value, read back after insert.
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Decimal { precision: u8, scale: u8 },
    /// Bounded string.
    String(u32),
    Text,
    DateTime,
    Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub properties: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl EntityField {
    pub fn new(property: impl Into<String>, data_type: DataType) -> Self {
        Self {
            property: property.into(),
            column: None,
            data_type,
            primary_key: false,
            sequence: false,
            identity: false,
            nullable: false,
            default: None,
        }
    }

    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.property)
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn sequence(mut self) -> Self {
        self.sequence = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl EntityDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: EntityField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn field(&self, property: &str) -> Option<&EntityField> {
        self.fields.iter().find(|f| f.property == property)
    }

    pub fn primary_key_fields(&self) -> impl Iterator<Item = &EntityField> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    pub fn identity_field(&self) -> Option<&EntityField> {
        self.fields.iter().find(|f| f.identity)
    }
}

/// In-memory metadata provider.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: HashMap<String, EntityDef>,
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    entities: Vec<EntityDef>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, entity: EntityDef) -> Self {
        self.insert(entity);
        self
    }

    pub fn insert(&mut self, entity: EntityDef) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn from_toml_str(content: &str) -> ForgeResult<Self> {
        let file: RegistryFile =
            toml::from_str(content).map_err(|e| ForgeError::Config(e.to_string()))?;
        Ok(Self::from_entities(file.entities))
    }

    pub fn from_json_str(content: &str) -> ForgeResult<Self> {
        let file: RegistryFile =
            serde_json::from_str(content).map_err(|e| ForgeError::Config(e.to_string()))?;
        Ok(Self::from_entities(file.entities))
    }

    /// Load from a `.toml` or `.json` file, chosen by extension.
    pub fn load(path: &std::path::Path) -> ForgeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    fn from_entities(entities: Vec<EntityDef>) -> Self {
        let mut registry = Self::new();
        for entity in entities {
            registry.insert(entity);
        }
        registry
    }
}

impl EntityMetadata for EntityRegistry {
    fn entity(&self, name: &str) -> ForgeResult<&EntityDef> {
        self.entities
            .get(name)
            .ok_or_else(|| ForgeError::UnknownEntity(name.to_string()))
    }
}
