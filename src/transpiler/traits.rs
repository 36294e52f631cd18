use serde::{Deserialize, Serialize};

use crate::ast::{CombineType, JoinType, Value};
use crate::error::{ForgeError, ForgeResult};
use crate::metadata::{DataType, EntityField};
use crate::transpiler::Dialect;

/// How In/NotIn with a value list is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InParameterMode {
    /// The whole list is one array parameter.
    Collection,
    /// One placeholder per element.
    Split,
}

/// Everything that differs between target databases.
///
/// Builders never emit dialect-specific text themselves; they ask the
/// generator for it.
pub trait SqlGenerator: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Quote an identifier (table, column, index).
    fn quote_identifier(&self, name: &str) -> String;

    /// Placeholder text for the `index`-th (1-based) parameter named `name`.
    fn placeholder(&self, index: usize, name: &str) -> String;

    fn bool_literal(&self, val: bool) -> String {
        if val { "1".to_string() } else { "0".to_string() }
    }

    fn string_literal(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Inline literal, used where values are not bound (projections,
    /// defaults in DDL).
    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.bool_literal(*b),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::DateTime(dt) => {
                self.string_literal(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            Value::String(s) => self.string_literal(s),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(|v| self.literal(v)).collect();
                format!("({})", items.join(", "))
            }
        }
    }

    /// Row limiting clause, including its leading space. Empty when both
    /// are `None`.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut sql = String::new();
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }
        sql
    }

    /// The limit clause is only valid after an ORDER BY.
    fn limit_requires_order(&self) -> bool {
        false
    }

    /// Keyword after `WITH` when a CTE refers to itself.
    fn recursive_keyword(&self) -> &'static str {
        "RECURSIVE "
    }

    fn in_parameter_mode(&self) -> InParameterMode {
        InParameterMode::Split
    }

    /// Membership test against a single array parameter.
    fn in_collection(&self, _left: &str, _placeholder: &str, _negate: bool) -> ForgeResult<String> {
        Err(ForgeError::unsupported(self.dialect(), "array parameters"))
    }

    /// Most placeholders one statement may carry.
    fn max_parameters(&self) -> usize;

    fn supports_join(&self, _join_type: JoinType) -> bool {
        true
    }

    fn supports_combine(&self, _combine_type: CombineType) -> bool {
        true
    }

    /// `UPDATE` with the target aliased so conditions can reference it.
    fn update_statement(&self, table: &str, alias: &str, sets: &[String], condition: Option<&str>) -> String {
        let mut sql = format!("UPDATE {} AS {} SET {}", table, alias, sets.join(", "));
        if let Some(condition) = condition {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        sql
    }

    fn delete_statement(&self, table: &str, alias: &str, condition: Option<&str>) -> String {
        let mut sql = format!("DELETE FROM {} AS {}", table, alias);
        if let Some(condition) = condition {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        sql
    }

    /// Expression returning the identity generated by the last insert.
    fn last_identity(&self) -> &'static str;

    // DDL

    fn type_name(&self, data_type: DataType) -> String;

    /// Column attribute for a database-generated key.
    fn identity_clause(&self) -> &'static str;

    fn column_definition(&self, field: &EntityField) -> String {
        let mut sql = format!(
            "{} {}",
            self.quote_identifier(field.column_name()),
            self.type_name(field.data_type)
        );
        if !field.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &field.default {
            sql.push_str(&format!(" DEFAULT {}", self.literal(default)));
        }
        if field.identity {
            sql.push(' ');
            sql.push_str(self.identity_clause());
        }
        sql
    }

    /// Whether the identity column carries its own PRIMARY KEY, which
    /// suppresses the table-level constraint.
    fn inline_identity_key(&self) -> bool {
        false
    }

    fn create_table(&self, table: &str, body: &str, if_not_exists: bool) -> String {
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        format!("CREATE TABLE {}{} (\n{}\n)", guard, table, body)
    }

    fn drop_table(&self, table: &str, if_exists: bool) -> String {
        let guard = if if_exists { "IF EXISTS " } else { "" };
        format!("DROP TABLE {}{}", guard, table)
    }

    fn add_column(&self, table: &str, definition: &str) -> String {
        format!("ALTER TABLE {} ADD COLUMN {}", table, definition)
    }

    fn rename_column(&self, table: &str, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            table,
            self.quote_identifier(from),
            self.quote_identifier(to)
        )
    }

    fn drop_index(&self, _table: &str, name: &str) -> String {
        format!("DROP INDEX {}", self.quote_identifier(name))
    }
}

/// Quote a dot-separated reference part by part.
pub fn escape_identifier(generator: &dyn SqlGenerator, name: &str) -> String {
    name.split('.')
        .map(|part| generator.quote_identifier(part))
        .collect::<Vec<_>>()
        .join(".")
}
