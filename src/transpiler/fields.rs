//! Rendering a single [`Field`] for the place it appears in.

use crate::ast::{ConstantField, Field, FormatOption, FormatParameter, Operator, OutputType, Queryable, Value};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::formatters::FormatContext;
use crate::transpiler::Translator;

/// Where the queryable owning the field sits in the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLocation {
    /// The statement's own result set.
    Top,
    /// Correlated subquery or derived table.
    Subquery,
    /// Join target rendered as a derived table.
    Join,
    /// Member of a UNION / EXCEPT / INTERSECT.
    Combine,
}

impl QueryLocation {
    pub fn is_top(&self) -> bool {
        matches!(self, QueryLocation::Top)
    }
}

/// Where the field sits inside its queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    Output,
    Criterion,
    Sort,
    GroupBy,
    InsertValue,
    UpdateValue,
    FormatParameter,
}

impl FieldLocation {
    /// Constants here become bound parameters; elsewhere they are inlined.
    fn binds_constants(&self) -> bool {
        matches!(
            self,
            FieldLocation::Criterion | FieldLocation::InsertValue | FieldLocation::UpdateValue
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpot<'s> {
    pub query_location: QueryLocation,
    pub field_location: FieldLocation,
    /// Operator of the enclosing criterion, for like-pattern wrapping.
    pub operator: Option<Operator>,
    /// Use this alias instead of resolving the property's entity.
    pub alias_override: Option<&'s str>,
}

impl<'s> FieldSpot<'s> {
    pub fn new(query_location: QueryLocation, field_location: FieldLocation) -> Self {
        Self {
            query_location,
            field_location,
            operator: None,
            alias_override: None,
        }
    }

    pub fn criterion(operator: Operator) -> Self {
        Self {
            operator: Some(operator),
            ..Self::new(QueryLocation::Top, FieldLocation::Criterion)
        }
    }

    pub fn with_alias(mut self, alias: &'s str) -> Self {
        self.alias_override = Some(alias);
        self
    }
}

impl Translator<'_> {
    /// Render `field` for `spot`: resolve the base expression, apply the
    /// format chain, then append the projection alias for outputs.
    pub(crate) fn format_field(
        &self,
        cx: &mut ResolutionContext,
        field: &Field,
        spot: FieldSpot<'_>,
    ) -> ForgeResult<String> {
        let base = match field {
            Field::Property(p) => {
                let alias = match spot.alias_override {
                    Some(alias) => alias.to_string(),
                    None => cx.lookup_alias(&p.entity, p.join_ordinal)?,
                };
                let column = self.metadata.field(&p.entity, &p.property)?.column_name();
                format!("{}.{}", alias, self.generator.quote_identifier(column))
            }
            Field::Constant(c) => self.constant_text(cx, c, spot),
            Field::Queryable(q) => format!("({})", self.build_subquery(cx, &q.query)?),
        };

        let formatted = match field.format_option() {
            Some(option) => self.apply_format_chain(cx, option, base)?,
            None => base,
        };

        if spot.field_location != FieldLocation::Output {
            return Ok(formatted);
        }
        let (column_name, output_name) = self.field_names(field)?;
        let name = if spot.query_location.is_top() {
            output_name
        } else {
            column_name
        };
        let needs_alias = match field {
            Field::Property(_) => {
                field.is_formatted() || (spot.query_location.is_top() && column_name != output_name)
            }
            _ => true,
        };
        Ok(if needs_alias {
            format!("{} AS {}", formatted, self.generator.quote_identifier(name))
        } else {
            formatted
        })
    }

    /// `(column name, output name)` of a projected field: the column it is
    /// stored under in intermediate results and the name the caller sees.
    pub(crate) fn field_names<'f>(&'f self, field: &'f Field) -> ForgeResult<(&'f str, &'f str)> {
        match field {
            Field::Property(p) => {
                let column = self.metadata.field(&p.entity, &p.property)?.column_name();
                Ok((column, p.property.as_str()))
            }
            Field::Constant(c) => Self::required_name(c.name.as_deref()),
            Field::Queryable(q) => Self::required_name(q.name.as_deref()),
        }
    }

    fn required_name(name: Option<&str>) -> ForgeResult<(&str, &str)> {
        name.map(|n| (n, n)).ok_or_else(|| {
            ForgeError::InvalidValue("constant and subquery outputs need a name".to_string())
        })
    }

    fn constant_text(&self, cx: &mut ResolutionContext, field: &ConstantField, spot: FieldSpot<'_>) -> String {
        if !spot.field_location.binds_constants() {
            return self.generator.literal(&field.value);
        }
        let value = match (&field.value, spot.operator) {
            (Value::String(s), Some(op)) if op.is_like() => Value::String(op.like_pattern(s)),
            (value, _) => value.clone(),
        };
        cx.add_parameter(value, self.generator)
    }

    /// A correlated subquery used as a field. It must select something.
    pub(crate) fn build_subquery(&self, cx: &mut ResolutionContext, query: &Queryable) -> ForgeResult<String> {
        if query.output == OutputType::Entities && query.fields.is_empty() && query.target.is_some() {
            return Err(ForgeError::EmptySubquerySelection(
                query.entity().unwrap_or_default().to_string(),
            ));
        }
        self.build_select(cx, query, super::dml::SelectOptions::nested(QueryLocation::Subquery))
    }

    fn apply_format_chain(&self, cx: &mut ResolutionContext, option: &FormatOption, base: String) -> ForgeResult<String> {
        let mut text = base;
        for option in option.chain() {
            let formatter = self.formatters.get(&option.name)?;
            let parameter = match &option.parameter {
                None => None,
                Some(FormatParameter::Literal(value)) if formatter.parameterize() => {
                    Some(cx.add_parameter(value.clone(), self.generator))
                }
                Some(FormatParameter::Literal(value)) => Some(self.generator.literal(value)),
                Some(FormatParameter::Field(field)) => Some(self.format_field(
                    cx,
                    field,
                    FieldSpot::new(QueryLocation::Subquery, FieldLocation::FormatParameter),
                )?),
            };
            let name = option.name.to_ascii_uppercase();
            text = formatter.format(&FormatContext {
                name: &name,
                text: &text,
                parameter: parameter.as_deref(),
                dialect: self.generator.dialect(),
            })?;
        }
        Ok(text)
    }
}
