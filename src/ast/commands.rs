//! Top-level commands handed to the engine.

use serde::{Deserialize, Serialize};

use crate::ast::{Field, Queryable, Value};

/// Retrieval or paged retrieval of a queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCommand {
    pub queryable: Queryable,
}

impl QueryCommand {
    pub fn new(queryable: Queryable) -> Self {
        Self { queryable }
    }
}

/// A mutation. Each one yields one or more execution statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionCommand {
    Insert {
        entity: String,
        values: Vec<(String, Value)>,
        #[serde(default)]
        must_affect_data: bool,
    },
    Update {
        entity: String,
        values: Vec<UpdateItem>,
        query: Queryable,
        #[serde(default)]
        must_affect_data: bool,
    },
    Delete {
        entity: String,
        query: Queryable,
        #[serde(default)]
        must_affect_data: bool,
    },
    Script {
        text: String,
        #[serde(default)]
        parameters: Vec<(String, Value)>,
        #[serde(default)]
        kind: ScriptKind,
        #[serde(default)]
        must_affect_data: bool,
    },
}

impl ExecutionCommand {
    pub fn insert(entity: impl Into<String>, values: Vec<(&str, Value)>) -> Self {
        ExecutionCommand::Insert {
            entity: entity.into(),
            values: values
                .into_iter()
                .map(|(property, value)| (property.to_string(), value))
                .collect(),
            must_affect_data: false,
        }
    }

    pub fn update(entity: impl Into<String>, values: Vec<UpdateItem>, query: Queryable) -> Self {
        ExecutionCommand::Update {
            entity: entity.into(),
            values,
            query,
            must_affect_data: false,
        }
    }

    pub fn delete(entity: impl Into<String>, query: Queryable) -> Self {
        ExecutionCommand::Delete {
            entity: entity.into(),
            query,
            must_affect_data: false,
        }
    }

    /// Require the statement to report at least one affected row.
    pub fn must_affect_data(mut self) -> Self {
        match &mut self {
            ExecutionCommand::Insert {
                must_affect_data, ..
            }
            | ExecutionCommand::Update {
                must_affect_data, ..
            }
            | ExecutionCommand::Delete {
                must_affect_data, ..
            }
            | ExecutionCommand::Script {
                must_affect_data, ..
            } => *must_affect_data = true,
        }
        self
    }
}

/// One `SET` assignment of an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub property: String,
    #[serde(default)]
    pub op: UpdateOp,
    pub value: Field,
}

impl UpdateItem {
    pub fn set(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            op: UpdateOp::Set,
            value: Field::constant(value),
        }
    }

    pub fn calculate(property: impl Into<String>, op: UpdateOp, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            op,
            value: Field::constant(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateOp {
    #[default]
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl UpdateOp {
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            UpdateOp::Set => None,
            UpdateOp::Add => Some("+"),
            UpdateOp::Subtract => Some("-"),
            UpdateOp::Multiply => Some("*"),
            UpdateOp::Divide => Some("/"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptKind {
    #[default]
    Text,
    StoredProcedure,
}

/// Ordered schema changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MigrationCommand {
    pub actions: Vec<MigrationAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationAction {
    CreateTable {
        entity: String,
        #[serde(default)]
        if_not_exists: bool,
    },
    DropTable {
        entity: String,
        #[serde(default)]
        if_exists: bool,
    },
    AddColumn {
        entity: String,
        property: String,
    },
    DropColumn {
        entity: String,
        column: String,
    },
    RenameColumn {
        entity: String,
        from: String,
        to: String,
    },
    CreateIndex {
        entity: String,
        name: String,
        properties: Vec<String>,
        #[serde(default)]
        unique: bool,
    },
    DropIndex {
        entity: String,
        name: String,
    },
}
