//! Translator test modules.
//!
//! Tests are organized by category:
//! - `core`: SELECT shapes, projections, joins, combines, counts
//! - `conditions`: criteria, groups, negation, membership
//! - `dialects`: placeholder, quoting and limit differences
//! - `paging`: paged statements and deterministic ordering
//! - `tree`: recursive traversal
//! - `batch`: execution statements and batching
//! - `ddl`: migration statements

mod conditions;
mod core;
mod ddl;
mod dialects;

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::metadata::{DataType, EntityDef, EntityField, EntityRegistry, IndexDef};
use crate::transpiler::{Dialect, Engine};

/// User, Order, Node (self-referencing) and Tag (no key).
pub(crate) fn registry() -> EntityRegistry {
    EntityRegistry::new()
        .register(
            EntityDef::new("User", "users")
                .with_field(EntityField::new("id", DataType::BigInt).primary_key().identity())
                .with_field(EntityField::new("name", DataType::String(64)))
                .with_field(
                    EntityField::new("email", DataType::String(128))
                        .column("email_address")
                        .nullable(),
                )
                .with_field(EntityField::new("age", DataType::Integer).default_value(0))
                .with_index(IndexDef {
                    name: "ix_users_email".to_string(),
                    properties: vec!["email".to_string()],
                    unique: true,
                }),
        )
        .register(
            EntityDef::new("Order", "orders")
                .with_field(EntityField::new("id", DataType::BigInt).primary_key().identity())
                .with_field(EntityField::new("user_id", DataType::BigInt))
                .with_field(EntityField::new(
                    "total",
                    DataType::Decimal {
                        precision: 10,
                        scale: 2,
                    },
                )),
        )
        .register(
            EntityDef::new("Node", "nodes")
                .with_field(EntityField::new("id", DataType::Integer).primary_key())
                .with_field(EntityField::new("parent_id", DataType::Integer).nullable())
                .with_field(EntityField::new("label", DataType::String(32))),
        )
        .register(
            EntityDef::new("Tag", "tags")
                .with_field(EntityField::new("label", DataType::String(32))),
        )
}

pub(crate) fn engine(dialect: Dialect) -> Engine {
    engine_with(EngineConfig::for_dialect(dialect))
}

pub(crate) fn engine_with(config: EngineConfig) -> Engine {
    Engine::new(config, Arc::new(registry()))
}
