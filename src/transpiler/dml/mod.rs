//! Statement builders.

pub mod delete;
pub mod insert;
pub mod paging;
pub mod select;
pub mod tree;
pub mod update;

use crate::ast::Field;
use crate::transpiler::fields::QueryLocation;

/// A column projected after the output fields under a fixed name.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtraColumn {
    pub field: Field,
    pub name: String,
}

/// How a queryable is being rendered as a SELECT.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SelectOptions<'f> {
    pub location: QueryLocation,
    pub with_sort: bool,
    /// Projected after the output fields (sort-only columns of a paged
    /// inner select). Combine members project them too.
    pub extra_columns: &'f [ExtraColumn],
}

impl SelectOptions<'static> {
    pub fn top() -> Self {
        Self::nested(QueryLocation::Top)
    }

    pub fn nested(location: QueryLocation) -> Self {
        Self {
            location,
            with_sort: true,
            extra_columns: &[],
        }
    }
}
