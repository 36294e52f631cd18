//! # qail-forge: queryable-to-SQL translation
//!
//! Describe what to fetch or change as a [`Queryable`](ast::Queryable) graph
//! (conditions, joins, unions, grouping, tree traversal, paging) and let the
//! [`Engine`](transpiler::Engine) render parameterized SQL for PostgreSQL,
//! MySQL, SQLite or SQL Server.
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use qail_forge::prelude::*;
//!
//! let registry = EntityRegistry::new().register(
//!     EntityDef::new("User", "users")
//!         .with_field(EntityField::new("id", DataType::BigInt).primary_key())
//!         .with_field(EntityField::new("name", DataType::String(64))),
//! );
//! let engine = Engine::new(EngineConfig::for_dialect(Dialect::SQLite), Arc::new(registry));
//!
//! let query = Queryable::new("User").filter(eq(Field::property("User", "id"), 7));
//! let statement = engine.generate_query_statement(&QueryCommand::new(query)).unwrap();
//! assert_eq!(
//!     statement.script,
//!     r#"SELECT TB0."id", TB0."name" FROM "users" AS TB0 WHERE TB0."id" = ?1"#
//! );
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod metadata;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::config::EngineConfig;
    pub use crate::error::*;
    pub use crate::metadata::{DataType, EntityDef, EntityField, EntityMetadata, EntityRegistry, IndexDef};
    pub use crate::transpiler::{
        Dialect, Engine, ExecutionStatement, FieldFormatter, FormatContext, FormatterRegistry,
        InParameterMode, Parameter, SqlGenerator, Statement,
    };
}
