use crate::ast::{CombineType, JoinType};
use crate::metadata::DataType;
use crate::transpiler::traits::SqlGenerator;
use crate::transpiler::Dialect;

/// MySQL Generator.
///
/// Placeholders are named (`@P1`) so that binding does not depend on the
/// textual order of fragments.
pub struct MysqlGenerator;

impl SqlGenerator for MysqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn placeholder(&self, _index: usize, name: &str) -> String {
        format!("@{}", name)
    }

    fn string_literal(&self, s: &str) -> String {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        // OFFSET is only valid after LIMIT.
        match (limit, offset) {
            (Some(n), Some(off)) => format!(" LIMIT {} OFFSET {}", n, off),
            (Some(n), None) => format!(" LIMIT {}", n),
            (None, Some(off)) => format!(" LIMIT 18446744073709551615 OFFSET {}", off),
            (None, None) => String::new(),
        }
    }

    fn max_parameters(&self) -> usize {
        65535
    }

    fn supports_join(&self, join_type: JoinType) -> bool {
        join_type != JoinType::Full
    }

    fn supports_combine(&self, combine_type: CombineType) -> bool {
        matches!(combine_type, CombineType::Union | CombineType::UnionAll)
    }

    fn delete_statement(&self, table: &str, alias: &str, condition: Option<&str>) -> String {
        let mut sql = format!("DELETE {} FROM {} AS {}", alias, table, alias);
        if let Some(condition) = condition {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        sql
    }

    fn last_identity(&self) -> &'static str {
        "LAST_INSERT_ID()"
    }

    fn type_name(&self, data_type: DataType) -> String {
        match data_type {
            DataType::Boolean => "TINYINT(1)".to_string(),
            DataType::Integer => "INT".to_string(),
            DataType::BigInt => "BIGINT".to_string(),
            DataType::Double => "DOUBLE".to_string(),
            DataType::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            DataType::String(n) => format!("VARCHAR({})", n),
            DataType::Text => "TEXT".to_string(),
            DataType::DateTime => "DATETIME(6)".to_string(),
            DataType::Uuid => "CHAR(36)".to_string(),
        }
    }

    fn identity_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn drop_index(&self, table: &str, name: &str) -> String {
        format!("DROP INDEX {} ON {}", self.quote_identifier(name), table)
    }
}
