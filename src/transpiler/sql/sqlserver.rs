use crate::metadata::DataType;
use crate::transpiler::traits::SqlGenerator;
use crate::transpiler::Dialect;

pub struct SqlServerGenerator;

impl SqlGenerator for SqlServerGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn placeholder(&self, _index: usize, name: &str) -> String {
        format!("@{}", name)
    }

    fn string_literal(&self, s: &str) -> String {
        format!("N'{}'", s.replace('\'', "''"))
    }

    // T-SQL: OFFSET n ROWS FETCH NEXT m ROWS ONLY, after ORDER BY.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        if limit.is_none() && offset.is_none() {
            return String::new();
        }
        let mut sql = format!(" OFFSET {} ROWS", offset.unwrap_or(0));
        if let Some(n) = limit {
            sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", n));
        }
        sql
    }

    fn limit_requires_order(&self) -> bool {
        true
    }

    fn recursive_keyword(&self) -> &'static str {
        ""
    }

    fn max_parameters(&self) -> usize {
        2100
    }

    fn update_statement(&self, table: &str, alias: &str, sets: &[String], condition: Option<&str>) -> String {
        let mut sql = format!("UPDATE {} SET {} FROM {} AS {}", alias, sets.join(", "), table, alias);
        if let Some(condition) = condition {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        sql
    }

    fn delete_statement(&self, table: &str, alias: &str, condition: Option<&str>) -> String {
        let mut sql = format!("DELETE {} FROM {} AS {}", alias, table, alias);
        if let Some(condition) = condition {
            sql.push_str(&format!(" WHERE {}", condition));
        }
        sql
    }

    fn last_identity(&self) -> &'static str {
        "SCOPE_IDENTITY()"
    }

    fn type_name(&self, data_type: DataType) -> String {
        match data_type {
            DataType::Boolean => "BIT".to_string(),
            DataType::Integer => "INT".to_string(),
            DataType::BigInt => "BIGINT".to_string(),
            DataType::Double => "FLOAT".to_string(),
            DataType::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            DataType::String(n) => format!("NVARCHAR({})", n),
            DataType::Text => "NVARCHAR(MAX)".to_string(),
            DataType::DateTime => "DATETIME2".to_string(),
            DataType::Uuid => "UNIQUEIDENTIFIER".to_string(),
        }
    }

    fn identity_clause(&self) -> &'static str {
        "IDENTITY(1,1)"
    }

    fn create_table(&self, table: &str, body: &str, if_not_exists: bool) -> String {
        let create = format!("CREATE TABLE {} (\n{}\n)", table, body);
        if if_not_exists {
            format!(
                "IF OBJECT_ID({}, 'U') IS NULL {}",
                self.string_literal(table),
                create
            )
        } else {
            create
        }
    }

    fn add_column(&self, table: &str, definition: &str) -> String {
        format!("ALTER TABLE {} ADD {}", table, definition)
    }

    fn rename_column(&self, table: &str, from: &str, to: &str) -> String {
        format!(
            "EXEC sp_rename {}, {}, 'COLUMN'",
            self.string_literal(&format!("{}.{}", table, from)),
            self.string_literal(to)
        )
    }

    fn drop_index(&self, table: &str, name: &str) -> String {
        format!("DROP INDEX {} ON {}", self.quote_identifier(name), table)
    }
}
