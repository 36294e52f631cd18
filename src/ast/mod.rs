//! The queryable model: what to fetch or mutate, independent of dialect.

pub mod builders;
pub mod commands;
pub mod conditions;
pub mod fields;
pub mod queryable;
pub mod values;

pub use commands::*;
pub use conditions::*;
pub use fields::*;
pub use queryable::*;
pub use values::*;
