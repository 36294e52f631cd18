//! Translation output handed to the execution layer.

use serde::Serialize;

use crate::ast::{ScriptKind, Value};

/// A bound value and the name its placeholder refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

/// A retrieval statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub script: String,
    pub parameters: Vec<Parameter>,
}

/// A mutation statement, possibly several commands merged into one round
/// trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionStatement {
    pub script: String,
    pub parameters: Vec<Parameter>,
    pub script_kind: ScriptKind,
    /// Fail the unit of work when the statement affects no rows.
    pub must_affect_data: bool,
    /// Select list reading back generated values, e.g. `lastval() AS "id"`.
    pub incremental_script: Option<String>,
    pub has_pre_script: bool,
}

impl ExecutionStatement {
    pub(crate) fn text(script: String, parameters: Vec<Parameter>) -> Self {
        Self {
            script,
            parameters,
            script_kind: ScriptKind::Text,
            must_affect_data: false,
            incremental_script: None,
            has_pre_script: false,
        }
    }

    /// Whether this statement must run in its own round trip.
    pub fn perform_alone(&self, isolate_read_back: bool) -> bool {
        self.has_pre_script
            || self.script_kind != ScriptKind::Text
            || self.must_affect_data
            || (isolate_read_back && self.incremental_script.is_some())
    }

    /// Full read-back query, run right after `script`.
    pub fn read_back_script(&self) -> Option<String> {
        self.incremental_script
            .as_ref()
            .map(|select_list| format!("SELECT {}", select_list))
    }
}
