//! Migration statement tests.

use super::engine;
use crate::ast::*;
use crate::error::ForgeError;
use crate::transpiler::{Dialect, Engine};

fn migrate(engine: &Engine, actions: Vec<MigrationAction>) -> Vec<String> {
    engine
        .generate_migration_statements(&MigrationCommand { actions })
        .unwrap()
        .into_iter()
        .map(|s| s.script)
        .collect()
}

fn create(entity: &str, if_not_exists: bool) -> MigrationAction {
    MigrationAction::CreateTable {
        entity: entity.to_string(),
        if_not_exists,
    }
}

#[test]
fn test_create_table_postgres() {
    let scripts = migrate(&engine(Dialect::Postgres), vec![create("User", false)]);
    assert_eq!(
        scripts,
        vec![
            concat!(
                "CREATE TABLE \"users\" (\n",
                "    \"id\" BIGINT NOT NULL GENERATED BY DEFAULT AS IDENTITY,\n",
                "    \"name\" VARCHAR(64) NOT NULL,\n",
                "    \"email_address\" VARCHAR(128),\n",
                "    \"age\" INTEGER NOT NULL DEFAULT 0,\n",
                "    PRIMARY KEY (\"id\")\n",
                ")"
            )
            .to_string(),
            "CREATE UNIQUE INDEX \"ix_users_email\" ON \"users\" (\"email_address\")".to_string(),
        ]
    );
}

#[test]
fn test_create_table_sqlite_inlines_identity_key() {
    let scripts = migrate(&engine(Dialect::SQLite), vec![create("User", true)]);
    assert_eq!(
        scripts[0],
        concat!(
            "CREATE TABLE IF NOT EXISTS \"users\" (\n",
            "    \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n",
            "    \"name\" TEXT NOT NULL,\n",
            "    \"email_address\" TEXT,\n",
            "    \"age\" INTEGER NOT NULL DEFAULT 0\n",
            ")"
        )
    );

    // Keys without identity keep the table constraint.
    let scripts = migrate(&engine(Dialect::SQLite), vec![create("Node", false)]);
    assert!(scripts[0].ends_with("    PRIMARY KEY (\"id\")\n)"));
}

#[test]
fn test_create_table_mysql_and_sqlserver() {
    let scripts = migrate(&engine(Dialect::MySQL), vec![create("Order", false)]);
    assert_eq!(
        scripts[0],
        "CREATE TABLE `orders` (\n    `id` BIGINT NOT NULL AUTO_INCREMENT,\n    `user_id` BIGINT NOT NULL,\n    `total` DECIMAL(10, 2) NOT NULL,\n    PRIMARY KEY (`id`)\n)"
    );

    let scripts = migrate(&engine(Dialect::SqlServer), vec![create("Tag", true)]);
    assert_eq!(
        scripts[0],
        "IF OBJECT_ID(N'[tags]', 'U') IS NULL CREATE TABLE [tags] (\n    [label] NVARCHAR(32) NOT NULL\n)"
    );
}

#[test]
fn test_alter_actions() {
    let actions = || {
        vec![
            MigrationAction::AddColumn {
                entity: "User".to_string(),
                property: "age".to_string(),
            },
            MigrationAction::DropColumn {
                entity: "User".to_string(),
                column: "legacy".to_string(),
            },
            MigrationAction::RenameColumn {
                entity: "User".to_string(),
                from: "nick".to_string(),
                to: "name".to_string(),
            },
        ]
    };
    assert_eq!(
        migrate(&engine(Dialect::Postgres), actions()),
        vec![
            r#"ALTER TABLE "users" ADD COLUMN "age" INTEGER NOT NULL DEFAULT 0"#,
            r#"ALTER TABLE "users" DROP COLUMN "legacy""#,
            r#"ALTER TABLE "users" RENAME COLUMN "nick" TO "name""#,
        ]
    );
    assert_eq!(
        migrate(&engine(Dialect::SqlServer), actions()),
        vec![
            "ALTER TABLE [users] ADD [age] INT NOT NULL DEFAULT 0",
            "ALTER TABLE [users] DROP COLUMN [legacy]",
            "EXEC sp_rename N'[users].nick', N'name', 'COLUMN'",
        ]
    );
}

#[test]
fn test_index_and_drop_actions() {
    let actions = || {
        vec![
            MigrationAction::CreateIndex {
                entity: "Order".to_string(),
                name: "ix_orders_user".to_string(),
                properties: vec!["user_id".to_string(), "total".to_string()],
                unique: false,
            },
            MigrationAction::DropIndex {
                entity: "Order".to_string(),
                name: "ix_orders_user".to_string(),
            },
            MigrationAction::DropTable {
                entity: "Order".to_string(),
                if_exists: true,
            },
        ]
    };
    assert_eq!(
        migrate(&engine(Dialect::Postgres), actions()),
        vec![
            r#"CREATE INDEX "ix_orders_user" ON "orders" ("user_id", "total")"#,
            r#"DROP INDEX "ix_orders_user""#,
            r#"DROP TABLE IF EXISTS "orders""#,
        ]
    );
    assert_eq!(
        migrate(&engine(Dialect::MySQL), actions())[1],
        "DROP INDEX `ix_orders_user` ON `orders`"
    );
}

#[test]
fn test_migration_errors() {
    let engine = engine(Dialect::Postgres);
    let err = engine
        .generate_migration_statements(&MigrationCommand {
            actions: vec![MigrationAction::CreateIndex {
                entity: "User".to_string(),
                name: "ix".to_string(),
                properties: vec!["nickname".to_string()],
                unique: false,
            }],
        })
        .unwrap_err();
    assert!(matches!(err, ForgeError::UnknownField { .. }));

    let err = engine
        .generate_migration_statements(&MigrationCommand {
            actions: vec![create("Ghost", false)],
        })
        .unwrap_err();
    assert!(matches!(err, ForgeError::UnknownEntity(_)));
}
