//! SELECT shapes: projections, joins, combines, counts and subqueries.

use super::engine;
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::ForgeError;
use crate::transpiler::{Dialect, Engine, FormatContext, SqlGenerator};

fn sql(engine: &Engine, q: Queryable) -> String {
    engine.generate_query_statement(&QueryCommand::new(q)).unwrap().script
}

fn user(property: &str) -> Field {
    Field::property("User", property)
}

fn order(property: &str) -> Field {
    Field::property("Order", property)
}

#[test]
fn test_select_all_fields() {
    let engine = engine(Dialect::Postgres);
    assert_eq!(
        sql(&engine, Queryable::new("User")),
        r#"SELECT TB0."id", TB0."name", TB0."email_address" AS "email", TB0."age" FROM "users" AS TB0"#
    );
}

#[test]
fn test_select_filter_sort_take() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User")
        .columns(["id", "name"])
        .filter(gt(user("age"), 18))
        .sort_desc(user("name"))
        .take(5);
    let statement = engine.generate_query_statement(&QueryCommand::new(q)).unwrap();
    assert_eq!(
        statement.script,
        r#"SELECT TB0."id", TB0."name" FROM "users" AS TB0 WHERE TB0."age" > $1 ORDER BY TB0."name" DESC LIMIT 5"#
    );
    assert_eq!(statement.parameters.len(), 1);
    assert_eq!(statement.parameters[0].name, "P1");
    assert_eq!(statement.parameters[0].value, Value::Int(18));
}

#[test]
fn test_aliases_are_deterministic() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User")
        .select([user("name"), order("total")])
        .inner_join(
            Queryable::new("Order"),
            cmp(order("user_id"), Operator::Equal, user("id")),
        );
    let first = sql(&engine, q.clone());
    assert_eq!(first, sql(&engine, q));
    assert_eq!(
        first,
        r#"SELECT TB0."name", TB1."total" FROM "users" AS TB0 INNER JOIN "orders" AS TB1 ON TB1."user_id" = TB0."id""#
    );
}

#[test]
fn test_self_join_by_ordinal() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("Node")
        .select([
            Field::property("Node", "label"),
            Field::property("Node", "id").ordinal(1),
        ])
        .self_join(
            JoinType::Left,
            Queryable::new("Node"),
            1,
            [cmp(
                Field::property("Node", "id").ordinal(1),
                Operator::Equal,
                Field::property("Node", "parent_id"),
            )],
        );
    assert_eq!(
        sql(&engine, q),
        r#"SELECT TB0."label", TB1."id" FROM "nodes" AS TB0 LEFT JOIN "nodes" AS TB1 ON TB1."id" = TB0."parent_id""#
    );
}

#[test]
fn test_join_filtered_target_as_derived_table() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User")
        .select([user("name"), order("total")])
        .inner_join(
            Queryable::new("Order").filter(gt(order("total"), 100)),
            cmp(order("user_id"), Operator::Equal, user("id")),
        );
    assert_eq!(
        sql(&engine, q),
        r#"SELECT TB0."name", TB1."total" FROM "users" AS TB0 INNER JOIN (SELECT TB2."id", TB2."user_id", TB2."total" FROM "orders" AS TB2 WHERE TB2."total" > $1) AS TB1 ON TB1."user_id" = TB0."id""#
    );
}

#[test]
fn test_cross_join() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User")
        .columns(["id"])
        .cross_join(Queryable::new("Order"));
    assert_eq!(
        sql(&engine, q),
        r#"SELECT TB0."id" FROM "users" AS TB0 CROSS JOIN "orders" AS TB1"#
    );
}

#[test]
fn test_join_connection_rules() {
    let engine = engine(Dialect::Postgres);

    let cross = Queryable::new("User").join(
        JoinType::Cross,
        Queryable::new("Order"),
        [cmp(order("user_id"), Operator::Equal, user("id"))],
    );
    let err = engine
        .generate_query_statement(&QueryCommand::new(cross))
        .unwrap_err();
    assert!(matches!(err, ForgeError::CrossJoinConnection(ref e) if e == "Order"));

    let inner = Queryable::new("User").join(JoinType::Inner, Queryable::new("Order"), []);
    let err = engine
        .generate_query_statement(&QueryCommand::new(inner))
        .unwrap_err();
    assert!(matches!(err, ForgeError::MissingJoinConnection { .. }));
}

#[test]
fn test_count_output() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").filter(eq(user("name"), "ann")).count();
    assert_eq!(
        sql(&engine, q),
        r#"SELECT COUNT(1) FROM "users" AS TB0 WHERE TB0."name" = $1"#
    );
}

#[test]
fn test_count_of_limited_rows_wraps_derived_table() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").take(10).count();
    assert_eq!(
        sql(&engine, q),
        r#"SELECT COUNT(1) FROM (SELECT TB0."id", TB0."name", TB0."email_address", TB0."age" FROM "users" AS TB0 LIMIT 10) AS TB1"#
    );
}

#[test]
fn test_predicate_output() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").filter(eq(user("id"), 1)).exists();
    assert_eq!(
        sql(&engine, q),
        r#"SELECT CASE WHEN EXISTS(SELECT TB0."id", TB0."name", TB0."email_address", TB0."age" FROM "users" AS TB0 WHERE TB0."id" = $1) THEN 1 ELSE 0 END"#
    );
}

#[test]
fn test_group_by_having() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("Order")
        .select([order("user_id"), sum(order("total"))])
        .group_by([order("user_id")])
        .having([gt(sum(order("total")), 100)]);
    let statement = engine.generate_query_statement(&QueryCommand::new(q)).unwrap();
    assert_eq!(
        statement.script,
        r#"SELECT TB0."user_id", SUM(TB0."total") AS "total" FROM "orders" AS TB0 GROUP BY TB0."user_id" HAVING SUM(TB0."total") > $1"#
    );
    assert_eq!(statement.parameters[0].value, Value::Int(100));
}

#[test]
fn test_distinct() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").columns(["name"]).distinct();
    assert_eq!(sql(&engine, q), r#"SELECT DISTINCT TB0."name" FROM "users" AS TB0"#);
}

#[test]
fn test_constant_output_needs_name() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").select([user("id"), Field::constant("x").named("kind")]);
    assert_eq!(
        sql(&engine, q),
        r#"SELECT TB0."id", 'x' AS "kind" FROM "users" AS TB0"#
    );

    let unnamed = Queryable::new("User").select([Field::constant(1)]);
    let err = engine
        .generate_query_statement(&QueryCommand::new(unnamed))
        .unwrap_err();
    assert!(matches!(err, ForgeError::InvalidValue(_)));
}

#[test]
fn test_correlated_subquery_field() {
    let engine = engine(Dialect::Postgres);
    let orders = Queryable::new("Order")
        .filter(cmp(order("user_id"), Operator::Equal, user("id")))
        .count();
    let q = Queryable::new("User").select([user("name"), Field::subquery(orders).named("orders")]);
    assert_eq!(
        sql(&engine, q),
        r#"SELECT TB0."name", (SELECT COUNT(1) FROM "orders" AS TB1 WHERE TB1."user_id" = TB0."id") AS "orders" FROM "users" AS TB0"#
    );
}

#[test]
fn test_in_subquery() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User")
        .columns(["id"])
        .filter(in_query(user("id"), Queryable::new("Order").columns(["user_id"])));
    assert_eq!(
        sql(&engine, q),
        r#"SELECT TB0."id" FROM "users" AS TB0 WHERE TB0."id" IN (SELECT TB1."user_id" FROM "orders" AS TB1)"#
    );
}

#[test]
fn test_subquery_must_select_fields() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").filter(in_query(user("id"), Queryable::new("Order")));
    let err = engine.generate_query_statement(&QueryCommand::new(q)).unwrap_err();
    assert!(matches!(err, ForgeError::EmptySubquerySelection(ref e) if e == "Order"));
}

#[test]
fn test_nested_target() {
    let engine = engine(Dialect::Postgres);
    let inner = Queryable::new("User").filter(gt(user("age"), 30));
    let q = Queryable::nested(inner).columns(["name"]);
    assert_eq!(
        sql(&engine, q),
        r#"SELECT TB0."name" FROM (SELECT TB1."id", TB1."name", TB1."email_address", TB1."age" FROM "users" AS TB1 WHERE TB1."age" > $1) AS TB0"#
    );
}

#[test]
fn test_union_becomes_cte() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User")
        .columns(["id", "name"])
        .filter(lt(user("age"), 20))
        .union(Queryable::new("User").filter(gt(user("age"), 60)))
        .sort_asc(user("name"));
    let statement = engine.generate_query_statement(&QueryCommand::new(q)).unwrap();
    assert_eq!(
        statement.script,
        r#"WITH COMBINE0 AS (SELECT TB0."id", TB0."name" FROM "users" AS TB0 WHERE TB0."age" < $1 UNION SELECT TB1."id", TB1."name" FROM "users" AS TB1 WHERE TB1."age" > $2) SELECT TB0."id", TB0."name" FROM COMBINE0 AS TB0 ORDER BY TB0."name" ASC"#
    );
    let values: Vec<&Value> = statement.parameters.iter().map(|p| &p.value).collect();
    assert_eq!(values, vec![&Value::Int(20), &Value::Int(60)]);
}

#[test]
fn test_union_of_branches_from_one_base() {
    let engine = engine(Dialect::Postgres);
    let base = Queryable::new("User").columns(["name"]);
    let q = base
        .clone()
        .filter(eq(user("age"), 1))
        .union(base.clone().filter(eq(user("age"), 2)));
    assert_eq!(
        sql(&engine, q),
        r#"WITH COMBINE0 AS (SELECT TB0."name" FROM "users" AS TB0 WHERE TB0."age" = $1 UNION SELECT TB1."name" FROM "users" AS TB1 WHERE TB1."age" = $2) SELECT TB0."name" FROM COMBINE0 AS TB0"#
    );
}

#[test]
fn test_formatted_outputs_are_aliased() {
    let engine = engine(Dialect::Postgres);
    let q = Queryable::new("User").select([upper(user("name")), coalesce(user("email"), "none")]);
    let statement = engine.generate_query_statement(&QueryCommand::new(q)).unwrap();
    assert_eq!(
        statement.script,
        r#"SELECT UPPER(TB0."name") AS "name", COALESCE(TB0."email_address", $1) AS "email" FROM "users" AS TB0"#
    );
    assert_eq!(statement.parameters[0].value, Value::String("none".into()));
}

fn doubled(cx: &FormatContext<'_>) -> crate::error::ForgeResult<String> {
    Ok(format!("({} * 2)", cx.text))
}

#[test]
fn test_custom_formatter() {
    let mut engine = engine(Dialect::Postgres);
    engine.register_formatter("doubled", doubled);
    let q = Queryable::new("User").select([user("age").format(FormatOption::new("DOUBLED"))]);
    assert_eq!(sql(&engine, q), r#"SELECT (TB0."age" * 2) AS "age" FROM "users" AS TB0"#);

    let unknown = Queryable::new("User").select([user("age").format(FormatOption::new("nope"))]);
    let err = engine
        .generate_query_statement(&QueryCommand::new(unknown))
        .unwrap_err();
    assert!(matches!(err, ForgeError::UnknownFormatter(_)));
}

#[test]
fn test_unknown_entity_and_field() {
    let engine = engine(Dialect::Postgres);
    let err = engine
        .generate_query_statement(&QueryCommand::new(Queryable::new("Ghost")))
        .unwrap_err();
    assert!(matches!(err, ForgeError::UnknownEntity(ref e) if e == "Ghost"));

    let q = Queryable::new("User").columns(["nickname"]);
    let err = engine.generate_query_statement(&QueryCommand::new(q)).unwrap_err();
    assert!(matches!(err, ForgeError::UnknownField { .. }));
}

#[test]
fn test_script_queryable_passes_through() {
    let engine = engine(Dialect::SqlServer);
    let q = Queryable::script("SELECT * FROM users WHERE id = @id", vec![("id".to_string(), Value::Int(3))]);
    let statement = engine.generate_query_statement(&QueryCommand::new(q)).unwrap();
    assert_eq!(statement.script, "SELECT * FROM users WHERE id = @id");
    assert_eq!(statement.parameters[0].name, "id");
}

/// Angle-bracket quoting and `:name` placeholders.
struct AngleGenerator;

impl SqlGenerator for AngleGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("<{}>", name)
    }

    fn placeholder(&self, _index: usize, name: &str) -> String {
        format!(":{}", name)
    }

    fn max_parameters(&self) -> usize {
        10
    }

    fn last_identity(&self) -> &'static str {
        "IDENTITY()"
    }

    fn type_name(&self, _data_type: crate::metadata::DataType) -> String {
        "ANY".to_string()
    }

    fn identity_clause(&self) -> &'static str {
        "AUTO"
    }
}

#[test]
fn test_custom_generator() {
    let engine = engine(Dialect::Postgres).with_generator(Box::new(AngleGenerator));
    let q = Queryable::new("User")
        .columns(["name"])
        .filter(is_in(user("id"), [1, 2]));
    assert_eq!(
        sql(&engine, q),
        "SELECT TB0.<name> FROM <users> AS TB0 WHERE TB0.<id> IN (:P1, :P2)"
    );
}
