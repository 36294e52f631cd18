use serde::{Deserialize, Serialize};

use crate::ast::{Queryable, Value};

/// One logical field: a column, a literal or a correlated subquery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    Property(PropertyField),
    Constant(ConstantField),
    Queryable(QueryableField),
}

/// Column of a modeled entity. `join_ordinal` distinguishes the copies of
/// an entity in a self-join (0 is the queryable's own target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyField {
    pub entity: String,
    pub property: String,
    #[serde(default)]
    pub join_ordinal: usize,
    #[serde(default)]
    pub format: Option<FormatOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantField {
    pub value: Value,
    /// Output name when projected.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<FormatOption>,
}

/// Scalar subquery used as a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryableField {
    pub query: Box<Queryable>,
    /// Output name when projected.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<FormatOption>,
}

/// A named format function applied to a rendered field, chained through
/// `next`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOption {
    pub name: String,
    #[serde(default)]
    pub parameter: Option<FormatParameter>,
    #[serde(default)]
    pub next: Option<Box<FormatOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormatParameter {
    Literal(Value),
    Field(Box<Field>),
}

impl FormatOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: None,
            next: None,
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<Value>) -> Self {
        self.parameter = Some(FormatParameter::Literal(parameter.into()));
        self
    }

    pub fn with_field_parameter(mut self, field: Field) -> Self {
        self.parameter = Some(FormatParameter::Field(Box::new(field)));
        self
    }

    /// Append `next` at the end of this chain.
    pub fn then(mut self, next: FormatOption) -> Self {
        let mut slot = &mut self.next;
        while let Some(option) = slot {
            slot = &mut option.next;
        }
        *slot = Some(Box::new(next));
        self
    }

    /// Options in application order.
    pub fn chain(&self) -> impl Iterator<Item = &FormatOption> {
        std::iter::successors(Some(self), |option| option.next.as_deref())
    }
}

impl Field {
    pub fn property(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Field::Property(PropertyField {
            entity: entity.into(),
            property: property.into(),
            join_ordinal: 0,
            format: None,
        })
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Field::Constant(ConstantField {
            value: value.into(),
            name: None,
            format: None,
        })
    }

    pub fn subquery(query: Queryable) -> Self {
        Field::Queryable(QueryableField {
            query: Box::new(query),
            name: None,
            format: None,
        })
    }

    /// Name a constant or subquery field for projection.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Field::Constant(c) => c.name = Some(name.into()),
            Field::Queryable(q) => q.name = Some(name.into()),
            Field::Property(_) => {}
        }
        self
    }

    /// Point a property field at another copy of its entity in a self-join.
    pub fn ordinal(mut self, join_ordinal: usize) -> Self {
        if let Field::Property(p) = &mut self {
            p.join_ordinal = join_ordinal;
        }
        self
    }

    /// Append a format option to the field's chain.
    pub fn format(mut self, option: FormatOption) -> Self {
        let slot = self.format_slot();
        *slot = Some(match slot.take() {
            Some(existing) => existing.then(option),
            None => option,
        });
        self
    }

    pub fn format_option(&self) -> Option<&FormatOption> {
        match self {
            Field::Property(p) => p.format.as_ref(),
            Field::Constant(c) => c.format.as_ref(),
            Field::Queryable(q) => q.format.as_ref(),
        }
    }

    fn format_slot(&mut self) -> &mut Option<FormatOption> {
        match self {
            Field::Property(p) => &mut p.format,
            Field::Constant(c) => &mut c.format,
            Field::Queryable(q) => &mut q.format,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyField> {
        match self {
            Field::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_formatted(&self) -> bool {
        self.format_option().is_some()
    }
}
