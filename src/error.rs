//! Error types for qail-forge.

use thiserror::Error;

use crate::transpiler::Dialect;

/// The main error type for translation operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// A correlated subquery selects nothing.
    #[error("Subquery on '{0}' selects zero fields")]
    EmptySubquerySelection(String),

    /// A non-cross join has no connection condition.
    #[error("{join} join on '{entity}' requires a connection condition")]
    MissingJoinConnection { join: String, entity: String },

    /// A cross join was given a connection condition.
    #[error("Cross join on '{0}' cannot carry a connection condition")]
    CrossJoinConnection(String),

    /// The requested output type cannot be produced by this operation.
    #[error("Output type {output} is not supported for {operation}")]
    UnsupportedOutput {
        output: String,
        operation: &'static str,
    },

    /// A binary operator is missing one of its operands.
    #[error("Operator {0} requires both a left and a right field")]
    MissingOperand(String),

    /// Paging was requested but no sort could be made deterministic.
    #[error("Cannot order '{0}' deterministically: no sort given and no sequence or primary key field")]
    NondeterministicPaging(String),

    /// A queryable that must read rows has no target.
    #[error("Queryable has no target entity")]
    MissingTarget,

    /// Entity is not known to the metadata provider.
    #[error("Unknown entity: '{0}'")]
    UnknownEntity(String),

    /// Property is not known on the entity.
    #[error("Unknown field '{property}' on entity '{entity}'")]
    UnknownField { entity: String, property: String },

    /// Format option references a formatter that is not registered.
    #[error("Unknown formatter: '{0}'")]
    UnknownFormatter(String),

    /// A property field references an entity with no alias in scope.
    #[error("No alias in scope for entity '{entity}' (join ordinal {ordinal})")]
    UnresolvedAlias { entity: String, ordinal: usize },

    /// A queryable references itself, directly or transitively.
    #[error("Cyclic queryable on '{0}'")]
    CyclicQueryable(String),

    /// Nesting is deeper than the configured limit.
    #[error("Queryable nesting exceeds the maximum depth of {0}")]
    MaxDepthExceeded(usize),

    /// More placeholders than the dialect can bind.
    #[error("{dialect:?} binds at most {limit} parameters, statement needs {requested}")]
    ParameterLimitExceeded {
        dialect: Dialect,
        limit: usize,
        requested: usize,
    },

    /// The target dialect cannot express the operation.
    #[error("{dialect:?} does not support {feature}")]
    Unsupported { dialect: Dialect, feature: String },

    /// Invalid value.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForgeError {
    /// Create an unsupported-feature error for a dialect.
    pub fn unsupported(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }

    /// Create an unknown field error.
    pub fn unknown_field(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            property: property.into(),
        }
    }
}

/// Result type alias for translation operations.
pub type ForgeResult<T> = Result<T, ForgeError>;
