use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::ast::{Condition, Connector, Field, Value};

static NEXT_QUERYABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a queryable, keying its table aliases and the nesting guard.
/// Constructors, clones and deserialization each assign a fresh one; reusing
/// an id inside one graph makes the nodes the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryableId(u64);

impl QueryableId {
    pub fn fresh() -> Self {
        QueryableId(NEXT_QUERYABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Declarative description of what to fetch or mutate.
///
/// Equality is structural and ignores `id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Queryable {
    #[serde(skip, default = "QueryableId::fresh")]
    pub id: QueryableId,
    /// `None` only for pure condition groups.
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub sorts: Vec<SortEntry>,
    #[serde(default)]
    pub joins: Vec<JoinEntry>,
    #[serde(default)]
    pub combines: Vec<CombineEntry>,
    #[serde(default)]
    pub group_by: Vec<Field>,
    #[serde(default)]
    pub having: Option<Box<Queryable>>,
    #[serde(default)]
    pub tree: Option<TreeInfo>,
    #[serde(default)]
    pub paging: Option<PagingFilter>,
    #[serde(default)]
    pub take: Option<u64>,
    #[serde(default)]
    pub output: OutputType,
    /// Empty selects every field of the target entity.
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub connector: Connector,
    #[serde(default)]
    pub negate: bool,
}

impl Clone for Queryable {
    /// A clone is a separate node of the graph, so two branches built from
    /// one base never share aliases.
    fn clone(&self) -> Self {
        Self {
            id: QueryableId::fresh(),
            target: self.target.clone(),
            mode: self.mode.clone(),
            conditions: self.conditions.clone(),
            sorts: self.sorts.clone(),
            joins: self.joins.clone(),
            combines: self.combines.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            tree: self.tree.clone(),
            paging: self.paging,
            take: self.take,
            output: self.output,
            fields: self.fields.clone(),
            distinct: self.distinct,
            connector: self.connector,
            negate: self.negate,
        }
    }
}

impl PartialEq for Queryable {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.mode == other.mode
            && self.conditions == other.conditions
            && self.sorts == other.sorts
            && self.joins == other.joins
            && self.combines == other.combines
            && self.group_by == other.group_by
            && self.having == other.having
            && self.tree == other.tree
            && self.paging == other.paging
            && self.take == other.take
            && self.output == other.output
            && self.fields == other.fields
            && self.distinct == other.distinct
            && self.connector == other.connector
            && self.negate == other.negate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Entity(String),
    Nested(Box<Queryable>),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    #[default]
    Regular,
    /// Raw script passed through untouched.
    Script {
        text: String,
        #[serde(default)]
        parameters: Vec<(String, Value)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputType {
    #[default]
    Entities,
    Count,
    Predicate,
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortEntry {
    pub field: Field,
    #[serde(default)]
    pub desc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Cross,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Cross => "CROSS JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinEntry {
    pub join_type: JoinType,
    pub target: Queryable,
    #[serde(default)]
    pub join_ordinal: usize,
    #[serde(default)]
    pub connection: Vec<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineType {
    Union,
    UnionAll,
    Except,
    Intersect,
}

impl CombineType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CombineType::Union => "UNION",
            CombineType::UnionAll => "UNION ALL",
            CombineType::Except => "EXCEPT",
            CombineType::Intersect => "INTERSECT",
        }
    }
}

impl std::fmt::Display for CombineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineEntry {
    pub combine_type: CombineType,
    pub target: Queryable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeDirection {
    /// Ancestors of the matched rows.
    Up,
    /// Descendants of the matched rows.
    Down,
}

/// Recursive traversal over a self-referential parent/child relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeInfo {
    /// Property holding the row's own key.
    pub data_field: String,
    /// Property holding the parent's key.
    pub parent_field: String,
    pub direction: TreeDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingFilter {
    pub page: u64,
    pub size: u64,
}

impl PagingFilter {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// Rows to skip; page numbers start at 1.
    pub fn offset(&self) -> u64 {
        self.page.max(1).saturating_sub(1).saturating_mul(self.size)
    }
}

impl Queryable {
    /// Empty queryable over an entity.
    pub fn new(entity: impl Into<String>) -> Self {
        Self::with_target(Some(Target::Entity(entity.into())))
    }

    /// Queryable selecting from another queryable's result.
    pub fn nested(inner: Queryable) -> Self {
        Self::with_target(Some(Target::Nested(Box::new(inner))))
    }

    /// Target-less queryable used as a condition group.
    pub fn conditions_only(conditions: Vec<Condition>) -> Self {
        let mut q = Self::with_target(None);
        q.conditions = conditions;
        q
    }

    fn with_target(target: Option<Target>) -> Self {
        Self {
            id: QueryableId::fresh(),
            target,
            mode: ExecutionMode::Regular,
            conditions: Vec::new(),
            sorts: Vec::new(),
            joins: Vec::new(),
            combines: Vec::new(),
            group_by: Vec::new(),
            having: None,
            tree: None,
            paging: None,
            take: None,
            output: OutputType::Entities,
            fields: Vec::new(),
            distinct: false,
            connector: Connector::And,
            negate: false,
        }
    }

    /// Raw script queryable.
    pub fn script(text: impl Into<String>, parameters: Vec<(String, Value)>) -> Self {
        let mut q = Self::with_target(None);
        q.mode = ExecutionMode::Script {
            text: text.into(),
            parameters,
        };
        q
    }

    /// The modeled entity this queryable ultimately reads from.
    pub fn entity(&self) -> Option<&str> {
        match &self.target {
            Some(Target::Entity(name)) => Some(name),
            Some(Target::Nested(inner)) => inner.entity(),
            None => None,
        }
    }

    /// True when the queryable is a bare entity reference that can be
    /// rendered as `table AS alias`.
    pub fn is_plain_entity(&self) -> bool {
        matches!(self.target, Some(Target::Entity(_)))
            && matches!(self.mode, ExecutionMode::Regular)
            && self.conditions.is_empty()
            && self.sorts.is_empty()
            && self.joins.is_empty()
            && self.combines.is_empty()
            && self.group_by.is_empty()
            && self.having.is_none()
            && self.tree.is_none()
            && self.paging.is_none()
            && self.take.is_none()
            && self.fields.is_empty()
            && !self.distinct
    }

    /// Queryable with no conditions contributes nothing as a group.
    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}
