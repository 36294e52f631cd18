//! Condition builders for criteria and groups.

use crate::ast::{Condition, Connector, Criterion, Field, Operator, Queryable, Value};

/// Helper to create a criterion
fn make_condition(left: Field, operator: Operator, right: Option<Field>) -> Condition {
    Condition::Criterion(Criterion {
        left: Some(left),
        operator,
        right,
        connector: Connector::And,
        negate: false,
    })
}

/// Compare two fields (e.g. a join connection `a.id = b.user_id`).
pub fn cmp(left: Field, operator: Operator, right: Field) -> Condition {
    make_condition(left, operator, Some(right))
}

/// Create an equality condition (field = value)
pub fn eq(field: Field, value: impl Into<Value>) -> Condition {
    make_condition(field, Operator::Equal, Some(Field::constant(value)))
}

/// Create a not-equal condition (field <> value)
pub fn ne(field: Field, value: impl Into<Value>) -> Condition {
    make_condition(field, Operator::NotEqual, Some(Field::constant(value)))
}

/// Create a greater-than condition (field > value)
pub fn gt(field: Field, value: impl Into<Value>) -> Condition {
    make_condition(field, Operator::GreaterThan, Some(Field::constant(value)))
}

/// Create a greater-than-or-equal condition (field >= value)
pub fn gte(field: Field, value: impl Into<Value>) -> Condition {
    make_condition(
        field,
        Operator::GreaterThanOrEqual,
        Some(Field::constant(value)),
    )
}

/// Create a less-than condition (field < value)
pub fn lt(field: Field, value: impl Into<Value>) -> Condition {
    make_condition(field, Operator::LessThan, Some(Field::constant(value)))
}

/// Create a less-than-or-equal condition (field <= value)
pub fn lte(field: Field, value: impl Into<Value>) -> Condition {
    make_condition(
        field,
        Operator::LessThanOrEqual,
        Some(Field::constant(value)),
    )
}

/// Create an IN condition (field IN (values))
pub fn is_in<V: Into<Value>>(field: Field, values: impl IntoIterator<Item = V>) -> Condition {
    let vals: Vec<Value> = values.into_iter().map(|v| v.into()).collect();
    make_condition(field, Operator::In, Some(Field::constant(Value::List(vals))))
}

/// Create a NOT IN condition (field NOT IN (values))
pub fn not_in<V: Into<Value>>(field: Field, values: impl IntoIterator<Item = V>) -> Condition {
    let vals: Vec<Value> = values.into_iter().map(|v| v.into()).collect();
    make_condition(
        field,
        Operator::NotIn,
        Some(Field::constant(Value::List(vals))),
    )
}

/// Create an IN condition against a subquery
pub fn in_query(field: Field, query: Queryable) -> Condition {
    make_condition(field, Operator::In, Some(Field::subquery(query)))
}

/// `%text%`
pub fn like(field: Field, text: impl Into<String>) -> Condition {
    make_condition(field, Operator::Like, Some(Field::constant(text.into())))
}

/// `text%`
pub fn begin_like(field: Field, text: impl Into<String>) -> Condition {
    make_condition(field, Operator::BeginLike, Some(Field::constant(text.into())))
}

/// `%text`
pub fn end_like(field: Field, text: impl Into<String>) -> Condition {
    make_condition(field, Operator::EndLike, Some(Field::constant(text.into())))
}

/// Create an IS NULL condition
pub fn is_null(field: Field) -> Condition {
    make_condition(field, Operator::IsNull, None)
}

/// Create an IS NOT NULL condition
pub fn not_null(field: Field) -> Condition {
    make_condition(field, Operator::NotNull, None)
}

/// Always true (`1=1`).
pub fn always() -> Condition {
    Condition::Criterion(Criterion {
        left: None,
        operator: Operator::True,
        right: None,
        connector: Connector::And,
        negate: false,
    })
}

/// Always false (`1<>1`).
pub fn never() -> Condition {
    Condition::Criterion(Criterion {
        left: None,
        operator: Operator::False,
        right: None,
        connector: Connector::And,
        negate: false,
    })
}

/// Parenthesized group of conditions.
pub fn group(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Group(Box::new(Queryable::conditions_only(
        conditions.into_iter().collect(),
    )))
}
