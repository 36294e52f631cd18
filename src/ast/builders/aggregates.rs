//! Aggregate and function wrappers expressed as format options.

use crate::ast::{Field, FormatOption, Value};

/// COUNT(field)
pub fn count(field: Field) -> Field {
    field.format(FormatOption::new("COUNT"))
}

/// SUM(field)
pub fn sum(field: Field) -> Field {
    field.format(FormatOption::new("SUM"))
}

/// AVG(field)
pub fn avg(field: Field) -> Field {
    field.format(FormatOption::new("AVG"))
}

/// MAX(field)
pub fn max(field: Field) -> Field {
    field.format(FormatOption::new("MAX"))
}

/// MIN(field)
pub fn min(field: Field) -> Field {
    field.format(FormatOption::new("MIN"))
}

/// UPPER(field)
pub fn upper(field: Field) -> Field {
    field.format(FormatOption::new("UPPER"))
}

/// LOWER(field)
pub fn lower(field: Field) -> Field {
    field.format(FormatOption::new("LOWER"))
}

/// COALESCE(field, fallback) with the fallback bound as a parameter.
pub fn coalesce(field: Field, fallback: impl Into<Value>) -> Field {
    field.format(FormatOption::new("COALESCE").with_parameter(fallback))
}
