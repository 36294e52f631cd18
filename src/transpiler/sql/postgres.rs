use crate::error::ForgeResult;
use crate::metadata::DataType;
use crate::transpiler::traits::{InParameterMode, SqlGenerator};
use crate::transpiler::Dialect;

pub struct PostgresGenerator;

impl SqlGenerator for PostgresGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn placeholder(&self, index: usize, _name: &str) -> String {
        format!("${}", index)
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "TRUE".to_string() } else { "FALSE".to_string() }
    }

    fn in_parameter_mode(&self) -> InParameterMode {
        InParameterMode::Collection
    }

    fn in_collection(&self, left: &str, placeholder: &str, negate: bool) -> ForgeResult<String> {
        Ok(if negate {
            format!("{} <> ALL({})", left, placeholder)
        } else {
            format!("{} = ANY({})", left, placeholder)
        })
    }

    fn max_parameters(&self) -> usize {
        65535
    }

    fn last_identity(&self) -> &'static str {
        "lastval()"
    }

    fn type_name(&self, data_type: DataType) -> String {
        match data_type {
            DataType::Boolean => "BOOLEAN".to_string(),
            DataType::Integer => "INTEGER".to_string(),
            DataType::BigInt => "BIGINT".to_string(),
            DataType::Double => "DOUBLE PRECISION".to_string(),
            DataType::Decimal { precision, scale } => format!("NUMERIC({}, {})", precision, scale),
            DataType::String(n) => format!("VARCHAR({})", n),
            DataType::Text => "TEXT".to_string(),
            DataType::DateTime => "TIMESTAMPTZ".to_string(),
            DataType::Uuid => "UUID".to_string(),
        }
    }

    fn identity_clause(&self) -> &'static str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }
}
