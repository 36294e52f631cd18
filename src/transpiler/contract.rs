//! Names shared with the execution layer that maps result sets back.
//!
//! A paged statement returns `TotalCount`, then an empty `Splitter` column,
//! then the page rows. Changing any of these breaks row mapping.

/// CTE holding the full filtered result of a paged query.
pub const PAGING: &str = "PAGING";

/// CTE holding the row count of [`PAGING`].
pub const PAGING_COUNT: &str = "PAGING_COUNT";

pub const TOTAL_COUNT: &str = "TotalCount";

pub const SPLITTER: &str = "Splitter";

/// Prefix of generated parameter names (`P1`, `P2`, ...).
pub const DEFAULT_PARAMETER_PREFIX: &str = "P";

/// Prefix of generated table aliases.
pub const TABLE_ALIAS_PREFIX: &str = "TB";
