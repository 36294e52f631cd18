use crate::metadata::{DataType, EntityField};
use crate::transpiler::traits::SqlGenerator;
use crate::transpiler::Dialect;

pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Numbered so a value may be referenced from any position.
    fn placeholder(&self, index: usize, _name: &str) -> String {
        format!("?{}", index)
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(n), Some(off)) => format!(" LIMIT {} OFFSET {}", n, off),
            (Some(n), None) => format!(" LIMIT {}", n),
            (None, Some(off)) => format!(" LIMIT -1 OFFSET {}", off),
            (None, None) => String::new(),
        }
    }

    fn max_parameters(&self) -> usize {
        32766
    }

    fn last_identity(&self) -> &'static str {
        "last_insert_rowid()"
    }

    fn type_name(&self, data_type: DataType) -> String {
        match data_type {
            DataType::Boolean | DataType::Integer | DataType::BigInt => "INTEGER".to_string(),
            DataType::Double => "REAL".to_string(),
            DataType::Decimal { .. } => "NUMERIC".to_string(),
            DataType::String(_) | DataType::Text | DataType::DateTime | DataType::Uuid => {
                "TEXT".to_string()
            }
        }
    }

    fn identity_clause(&self) -> &'static str {
        "PRIMARY KEY AUTOINCREMENT"
    }

    // AUTOINCREMENT is only accepted on an inline `INTEGER PRIMARY KEY`.
    fn column_definition(&self, field: &EntityField) -> String {
        if field.identity {
            return format!(
                "{} INTEGER {}",
                self.quote_identifier(field.column_name()),
                self.identity_clause()
            );
        }
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
        sql
    }

    fn inline_identity_key(&self) -> bool {
        true
    }
}
