//! Criteria, groups, negation and membership tests.

use super::{engine, engine_with};
use crate::ast::builders::*;
use crate::ast::*;
use crate::config::EngineConfig;
use crate::error::ForgeError;
use crate::transpiler::{Dialect, Engine, InParameterMode, Statement};

fn user(property: &str) -> Field {
    Field::property("User", property)
}

fn filtered(engine: &Engine, conditions: Vec<Condition>) -> Statement {
    let mut q = Queryable::new("User").columns(["id"]);
    q.conditions = conditions;
    engine.generate_query_statement(&QueryCommand::new(q)).unwrap()
}

fn where_clause(engine: &Engine, conditions: Vec<Condition>) -> String {
    let script = filtered(engine, conditions).script;
    match script.split_once(" WHERE ") {
        Some((_, condition)) => condition.to_string(),
        None => String::new(),
    }
}

#[test]
fn test_like_wraps_parameter() {
    let engine = engine(Dialect::Postgres);
    let statement = filtered(
        &engine,
        vec![like(user("name"), "ann"), begin_like(user("name"), "a").or()],
    );
    assert_eq!(
        statement.script,
        r#"SELECT TB0."id" FROM "users" AS TB0 WHERE TB0."name" LIKE $1 OR TB0."name" LIKE $2"#
    );
    assert_eq!(statement.parameters[0].value, Value::String("%ann%".into()));
    assert_eq!(statement.parameters[1].value, Value::String("a%".into()));
}

#[test]
fn test_empty_like_pattern_is_dropped() {
    let engine = engine(Dialect::Postgres);
    let statement = filtered(&engine, vec![like(user("name"), "")]);
    assert_eq!(statement.script, r#"SELECT TB0."id" FROM "users" AS TB0"#);
    assert!(statement.parameters.is_empty());
}

#[test]
fn test_null_comparisons() {
    let engine = engine(Dialect::Postgres);
    assert_eq!(
        where_clause(&engine, vec![eq(user("email"), Value::Null)]),
        r#"TB0."email_address" IS NULL"#
    );
    assert_eq!(
        where_clause(&engine, vec![ne(user("email"), Value::Null)]),
        r#"TB0."email_address" IS NOT NULL"#
    );
    assert_eq!(
        where_clause(&engine, vec![is_null(user("email")), not_null(user("name"))]),
        r#"TB0."email_address" IS NULL AND TB0."name" IS NOT NULL"#
    );
}

#[test]
fn test_groups_parenthesize_and_collapse() {
    let engine = engine(Dialect::Postgres);
    assert_eq!(
        where_clause(
            &engine,
            vec![
                eq(user("age"), 1),
                group([eq(user("name"), "a"), eq(user("name"), "b").or()]),
            ]
        ),
        r#"TB0."age" = $1 AND (TB0."name" = $2 OR TB0."name" = $3)"#
    );
    // A single surviving condition needs no parentheses.
    assert_eq!(
        where_clause(&engine, vec![group([eq(user("name"), "a"), like(user("name"), "")])]),
        r#"TB0."name" = $1"#
    );
    assert_eq!(where_clause(&engine, vec![group([])]), "");
}

#[test]
fn test_negation() {
    let engine = engine(Dialect::Postgres);
    assert_eq!(
        where_clause(&engine, vec![eq(user("name"), "a").not()]),
        r#"NOT (TB0."name" = $1)"#
    );
    assert_eq!(
        where_clause(&engine, vec![eq(user("name"), "a").not().not()]),
        r#"NOT (NOT (TB0."name" = $1))"#
    );
    assert_eq!(
        where_clause(
            &engine,
            vec![group([eq(user("name"), "a"), eq(user("age"), 3).or()]).not()]
        ),
        r#"NOT (TB0."name" = $1 OR TB0."age" = $2)"#
    );
}

#[test]
fn test_constant_conditions() {
    let engine = engine(Dialect::Postgres);
    assert_eq!(where_clause(&engine, vec![always()]), "1=1");
    assert_eq!(where_clause(&engine, vec![never().or()]), "1<>1");
}

#[test]
fn test_in_collection_on_postgres() {
    let engine = engine(Dialect::Postgres);
    let statement = filtered(&engine, vec![is_in(user("id"), [1, 2, 3])]);
    assert!(statement.script.ends_with(r#"WHERE TB0."id" = ANY($1)"#));
    assert_eq!(statement.parameters.len(), 1);
    assert_eq!(
        statement.parameters[0].value,
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );

    assert_eq!(
        where_clause(&engine, vec![not_in(user("id"), [4])]),
        r#"TB0."id" <> ALL($1)"#
    );
}

#[test]
fn test_in_split_mode() {
    let engine = engine(Dialect::SQLite);
    let statement = filtered(&engine, vec![is_in(user("id"), [1, 2, 3])]);
    assert!(statement.script.ends_with(r#"WHERE TB0."id" IN (?1, ?2, ?3)"#));
    assert_eq!(statement.parameters.len(), 3);

    let mut config = EngineConfig::for_dialect(Dialect::Postgres);
    config.in_parameter_mode = Some(InParameterMode::Split);
    let engine = engine_with(config);
    assert_eq!(
        where_clause(&engine, vec![not_in(user("id"), [1, 2])]),
        r#"TB0."id" NOT IN ($1, $2)"#
    );
}

#[test]
fn test_in_empty_list() {
    let engine = engine(Dialect::SQLite);
    let statement = filtered(&engine, vec![is_in(user("id"), Vec::<i64>::new())]);
    assert!(statement.script.ends_with("WHERE 1<>1"));
    assert!(statement.parameters.is_empty());
    assert_eq!(
        where_clause(&engine, vec![not_in(user("id"), Vec::<i64>::new())]),
        "1=1"
    );
}

#[test]
fn test_in_split_respects_parameter_limit() {
    let engine = engine(Dialect::SqlServer);
    let mut q = Queryable::new("User");
    q.conditions = vec![is_in(user("id"), 0..2101)];
    let err = engine.generate_query_statement(&QueryCommand::new(q)).unwrap_err();
    assert!(matches!(
        err,
        ForgeError::ParameterLimitExceeded {
            limit: 2100,
            requested: 2101,
            ..
        }
    ));
}

#[test]
fn test_cyclic_group_is_rejected() {
    let engine = engine(Dialect::Postgres);
    let mut g = Queryable::conditions_only(vec![eq(user("name"), "a")]);
    let mut itself = g.clone();
    itself.id = g.id;
    g.conditions.push(Condition::Group(Box::new(itself)));

    let q = Queryable::new("User").filter(Condition::Group(Box::new(g)));
    let err = engine.generate_query_statement(&QueryCommand::new(q)).unwrap_err();
    assert!(matches!(err, ForgeError::CyclicQueryable(_)));
}

#[test]
fn test_max_depth() {
    let mut config = EngineConfig::for_dialect(Dialect::Postgres);
    config.max_depth = 2;
    let engine = engine_with(config);
    let q = Queryable::new("User").filter(group([group([eq(user("name"), "a")])]));
    let err = engine.generate_query_statement(&QueryCommand::new(q)).unwrap_err();
    assert!(matches!(err, ForgeError::MaxDepthExceeded(2)));
}

#[test]
fn test_missing_operand() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").filter(Condition::Criterion(Criterion {
        left: Some(user("age")),
        operator: Operator::GreaterThan,
        right: None,
        connector: Connector::And,
        negate: false,
    }));
    let err = engine.generate_query_statement(&QueryCommand::new(q)).unwrap_err();
    assert!(matches!(err, ForgeError::MissingOperand(ref op) if op == "GreaterThan"));
}

#[test]
fn test_field_to_field_comparison() {
    let engine = engine(Dialect::Postgres);
    let statement = filtered(
        &engine,
        vec![cmp(user("name"), Operator::NotEqual, user("email"))],
    );
    assert!(statement.script.ends_with(r#"WHERE TB0."name" <> TB0."email_address""#));
    assert!(statement.parameters.is_empty());
}
