use serde::{Deserialize, Serialize};

use crate::ast::{Field, Queryable};

/// A node in a queryable's condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Criterion(Criterion),
    /// The nested queryable's conditions render as one parenthesized unit;
    /// its `connector` and `negate` apply to the whole group.
    Group(Box<Queryable>),
}

/// Single comparison between two fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(default)]
    pub left: Option<Field>,
    pub operator: Operator,
    #[serde(default)]
    pub right: Option<Field>,
    #[serde(default)]
    pub connector: Connector,
    #[serde(default)]
    pub negate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
    Like,
    BeginLike,
    EndLike,
    NotLike,
    NotBeginLike,
    NotEndLike,
    IsNull,
    NotNull,
    True,
    False,
}

impl Operator {
    /// Operators that take no right-hand value.
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Operator::IsNull | Operator::NotNull | Operator::True | Operator::False
        )
    }

    pub fn is_like(&self) -> bool {
        matches!(
            self,
            Operator::Like
                | Operator::BeginLike
                | Operator::EndLike
                | Operator::NotLike
                | Operator::NotBeginLike
                | Operator::NotEndLike
        )
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Wrap a like pattern with the wildcards this operator implies.
    pub fn like_pattern(&self, text: &str) -> String {
        match self {
            Operator::Like | Operator::NotLike => format!("%{}%", text),
            Operator::BeginLike | Operator::NotBeginLike => format!("{}%", text),
            Operator::EndLike | Operator::NotEndLike => format!("%{}", text),
            _ => text.to_string(),
        }
    }

    /// SQL operator text.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Like | Operator::BeginLike | Operator::EndLike => "LIKE",
            Operator::NotLike | Operator::NotBeginLike | Operator::NotEndLike => "NOT LIKE",
            Operator::IsNull => "IS NULL",
            Operator::NotNull => "IS NOT NULL",
            Operator::True => "1=1",
            Operator::False => "1<>1",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Condition {
    pub fn connector(&self) -> Connector {
        match self {
            Condition::Criterion(c) => c.connector,
            Condition::Group(q) => q.connector,
        }
    }

    pub fn negated(&self) -> bool {
        match self {
            Condition::Criterion(c) => c.negate,
            Condition::Group(q) => q.negate,
        }
    }

    /// Joined to its previous sibling with OR instead of AND.
    pub fn or(mut self) -> Self {
        self.set_connector(Connector::Or);
        self
    }

    /// Wrap in `NOT (...)`. Applying twice wraps twice.
    pub fn not(self) -> Self {
        match self {
            Condition::Criterion(mut c) if !c.negate => {
                c.negate = true;
                Condition::Criterion(c)
            }
            Condition::Group(mut q) if !q.negate => {
                q.negate = true;
                Condition::Group(q)
            }
            already => {
                let connector = already.connector();
                let mut wrapper = Queryable::conditions_only(vec![already]);
                wrapper.connector = connector;
                wrapper.negate = true;
                Condition::Group(Box::new(wrapper))
            }
        }
    }

    fn set_connector(&mut self, connector: Connector) {
        match self {
            Condition::Criterion(c) => c.connector = connector,
            Condition::Group(q) => q.connector = connector,
        }
    }
}
