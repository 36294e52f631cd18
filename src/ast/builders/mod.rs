//! Ergonomic builder functions for queryables, conditions and fields.
//!
//! # Example
//! ```
//! use qail_forge::ast::builders::*;
//! use qail_forge::ast::{Field, Queryable};
//!
//! let query = Queryable::new("User")
//!     .columns(["id", "name"])
//!     .filter(eq(Field::property("User", "active"), true))
//!     .or_filter(begin_like(Field::property("User", "name"), "adm"))
//!     .sort_desc(Field::property("User", "id"))
//!     .page(2, 20);
//! assert_eq!(query.conditions.len(), 2);
//! ```

pub mod aggregates;
pub mod conditions;
pub mod queryable;

pub use aggregates::*;
pub use conditions::*;
