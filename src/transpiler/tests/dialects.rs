//! Dialect-specific rendering tests (placeholders, quoting, limits).

use super::engine;
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::ForgeError;
use crate::transpiler::{Dialect, Engine};

fn user(property: &str) -> Field {
    Field::property("User", property)
}

fn sql(engine: &Engine, q: Queryable) -> String {
    engine.generate_query_statement(&QueryCommand::new(q)).unwrap().script
}

fn filtered_take() -> Queryable {
    Queryable::new("User")
        .columns(["id", "name"])
        .filter(eq(user("name"), "ann"))
        .filter(gt(user("age"), 30))
        .sort_asc(user("id"))
        .take(5)
}

#[test]
fn test_postgres_numbered_placeholders() {
    assert_eq!(
        sql(&engine(Dialect::Postgres), filtered_take()),
        r#"SELECT TB0."id", TB0."name" FROM "users" AS TB0 WHERE TB0."name" = $1 AND TB0."age" > $2 ORDER BY TB0."id" ASC LIMIT 5"#
    );
}

#[test]
fn test_sqlite_numbered_placeholders() {
    assert_eq!(
        sql(&engine(Dialect::SQLite), filtered_take()),
        r#"SELECT TB0."id", TB0."name" FROM "users" AS TB0 WHERE TB0."name" = ?1 AND TB0."age" > ?2 ORDER BY TB0."id" ASC LIMIT 5"#
    );
}

#[test]
fn test_mysql_named_placeholders() {
    assert_eq!(
        sql(&engine(Dialect::MySQL), filtered_take()),
        "SELECT TB0.`id`, TB0.`name` FROM `users` AS TB0 WHERE TB0.`name` = @P1 AND TB0.`age` > @P2 ORDER BY TB0.`id` ASC LIMIT 5"
    );
}

#[test]
fn test_sqlserver_offset_fetch() {
    assert_eq!(
        sql(&engine(Dialect::SqlServer), filtered_take()),
        "SELECT TB0.[id], TB0.[name] FROM [users] AS TB0 WHERE TB0.[name] = @P1 AND TB0.[age] > @P2 ORDER BY TB0.[id] ASC OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );
}

#[test]
fn test_sqlserver_take_synthesizes_key_order() {
    let engine = engine(Dialect::SqlServer);
    assert_eq!(
        sql(&engine, Queryable::new("User").take(3)),
        "SELECT TB0.[id], TB0.[name], TB0.[email_address] AS [email], TB0.[age] FROM [users] AS TB0 ORDER BY TB0.[id] ASC OFFSET 0 ROWS FETCH NEXT 3 ROWS ONLY"
    );

    let err = engine
        .generate_query_statement(&QueryCommand::new(Queryable::new("Tag").take(3)))
        .unwrap_err();
    assert!(matches!(err, ForgeError::NondeterministicPaging(ref e) if e == "Tag"));

    // Other dialects take without an order.
    assert_eq!(
        sql(&super::engine(Dialect::Postgres), Queryable::new("Tag").take(3)),
        r#"SELECT TB0."label" FROM "tags" AS TB0 LIMIT 3"#
    );
}

#[test]
fn test_sqlserver_drops_order_in_derived_tables() {
    let engine = engine(Dialect::SqlServer);
    let inner = Queryable::new("User").sort_asc(user("name"));
    let script = sql(&engine, Queryable::nested(inner).columns(["name"]));
    assert_eq!(
        script,
        "SELECT TB0.[name] FROM (SELECT TB1.[id], TB1.[name], TB1.[email_address], TB1.[age] FROM [users] AS TB1) AS TB0"
    );
}

#[test]
fn test_literals_per_dialect() {
    let q = || {
        Queryable::new("User").select([
            Field::constant(true).named("flag"),
            Field::constant("o'k").named("label"),
        ])
    };
    assert_eq!(
        sql(&engine(Dialect::Postgres), q()),
        r#"SELECT TRUE AS "flag", 'o''k' AS "label" FROM "users" AS TB0"#
    );
    assert_eq!(
        sql(&engine(Dialect::SQLite), q()),
        r#"SELECT 1 AS "flag", 'o''k' AS "label" FROM "users" AS TB0"#
    );
    assert_eq!(
        sql(&engine(Dialect::SqlServer), q()),
        "SELECT 1 AS [flag], N'o''k' AS [label] FROM [users] AS TB0"
    );
}

#[test]
fn test_length_formatter_per_dialect() {
    let q = || Queryable::new("User").select([user("name").format(FormatOption::new("LENGTH"))]);
    assert_eq!(
        sql(&engine(Dialect::SqlServer), q()),
        "SELECT LEN(TB0.[name]) AS [name] FROM [users] AS TB0"
    );
    assert_eq!(
        sql(&engine(Dialect::MySQL), q()),
        "SELECT LENGTH(TB0.`name`) AS `name` FROM `users` AS TB0"
    );
}

#[test]
fn test_mysql_rejects_full_join_and_except() {
    let engine = engine(Dialect::MySQL);
    let full = Queryable::new("User").join(
        JoinType::Full,
        Queryable::new("Order"),
        [cmp(
            Field::property("Order", "user_id"),
            Operator::Equal,
            user("id"),
        )],
    );
    let err = engine.generate_query_statement(&QueryCommand::new(full)).unwrap_err();
    assert!(matches!(
        err,
        ForgeError::Unsupported {
            dialect: Dialect::MySQL,
            ..
        }
    ));

    let except = Queryable::new("User")
        .columns(["id"])
        .combine(CombineType::Except, Queryable::new("User").filter(gt(user("age"), 3)));
    let err = engine
        .generate_query_statement(&QueryCommand::new(except.clone()))
        .unwrap_err();
    assert!(matches!(err, ForgeError::Unsupported { .. }));

    let script = sql(&super::engine(Dialect::Postgres), except);
    assert!(script.contains(" EXCEPT SELECT TB1.\"id\" FROM \"users\" AS TB1"));
}

#[test]
fn test_sqlserver_string_parameters_are_named() {
    let engine = engine(Dialect::SqlServer);
    let statement = engine
        .generate_query_statement(&QueryCommand::new(
            Queryable::new("User").columns(["id"]).filter(like(user("name"), "x")),
        ))
        .unwrap();
    assert_eq!(
        statement.script,
        "SELECT TB0.[id] FROM [users] AS TB0 WHERE TB0.[name] LIKE @P1"
    );
    assert_eq!(statement.parameters[0].name, "P1");
}
