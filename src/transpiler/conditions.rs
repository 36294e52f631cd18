//! Condition trees to WHERE / ON / HAVING text.

use crate::ast::{Condition, Criterion, Field, Operator, Queryable, Value};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::fields::FieldSpot;
use crate::transpiler::traits::InParameterMode;
use crate::transpiler::Translator;

impl Translator<'_> {
    /// Render a condition list joined by each condition's connector.
    /// Returns `None` when every condition dropped out.
    pub(crate) fn translate_conditions(
        &self,
        cx: &mut ResolutionContext,
        conditions: &[Condition],
    ) -> ForgeResult<Option<String>> {
        Ok(self.join_conditions(cx, conditions)?.map(|(sql, _)| sql))
    }

    /// Rendered text and the number of conditions that survived.
    fn join_conditions(
        &self,
        cx: &mut ResolutionContext,
        conditions: &[Condition],
    ) -> ForgeResult<Option<(String, usize)>> {
        let mut sql = String::new();
        let mut count = 0;
        for condition in conditions {
            let Some(fragment) = self.translate_condition(cx, condition)? else {
                continue;
            };
            if count > 0 {
                sql.push(' ');
                sql.push_str(condition.connector().as_sql());
                sql.push(' ');
            }
            sql.push_str(&fragment);
            count += 1;
        }
        Ok((count > 0).then_some((sql, count)))
    }

    fn translate_condition(&self, cx: &mut ResolutionContext, condition: &Condition) -> ForgeResult<Option<String>> {
        let negate = condition.negated();
        Ok(match condition {
            Condition::Criterion(criterion) => self
                .translate_criterion(cx, criterion)?
                .map(|sql| if negate { format!("NOT ({})", sql) } else { sql }),
            Condition::Group(group) => self.translate_group(cx, group)?.map(|(sql, count)| {
                if negate {
                    format!("NOT ({})", sql)
                } else if count > 1 {
                    format!("({})", sql)
                } else {
                    sql
                }
            }),
        })
    }

    /// Joined conditions of a group and how many survived.
    fn translate_group(&self, cx: &mut ResolutionContext, group: &Queryable) -> ForgeResult<Option<(String, usize)>> {
        cx.enter(group)?;
        let joined = self.join_conditions(cx, &group.conditions);
        cx.leave();
        joined
    }

    fn translate_criterion(&self, cx: &mut ResolutionContext, criterion: &Criterion) -> ForgeResult<Option<String>> {
        let op = criterion.operator;
        match op {
            Operator::True | Operator::False => Ok(Some(op.as_sql().to_string())),
            Operator::IsNull | Operator::NotNull => {
                let field = criterion
                    .left
                    .as_ref()
                    .or(criterion.right.as_ref())
                    .ok_or_else(|| ForgeError::MissingOperand(op.to_string()))?;
                let side = self.format_field(cx, field, FieldSpot::criterion(op))?;
                Ok(Some(format!("{} {}", side, op.as_sql())))
            }
            _ if op.is_collection() => self.translate_membership(cx, criterion),
            _ => {
                let (left, right) = Self::operands(criterion)?;
                if op.is_like() && Self::is_empty_pattern(right) {
                    return Ok(None);
                }
                if let Some(null_test) = Self::null_comparison(op, right) {
                    let side = self.format_field(cx, left, FieldSpot::criterion(op))?;
                    return Ok(Some(format!("{} {}", side, null_test)));
                }
                let left = self.format_field(cx, left, FieldSpot::criterion(op))?;
                let right = self.format_field(cx, right, FieldSpot::criterion(op))?;
                Ok(Some(format!("{} {} {}", left, op.as_sql(), right)))
            }
        }
    }

    fn translate_membership(&self, cx: &mut ResolutionContext, criterion: &Criterion) -> ForgeResult<Option<String>> {
        let op = criterion.operator;
        let negate = op == Operator::NotIn;
        let (left, right) = Self::operands(criterion)?;

        let values = match right {
            Field::Constant(c) if c.format.is_none() => match &c.value {
                Value::List(items) => items.clone(),
                scalar => vec![scalar.clone()],
            },
            _ => {
                let left = self.format_field(cx, left, FieldSpot::criterion(op))?;
                let right = self.format_field(cx, right, FieldSpot::criterion(op))?;
                let right = if right.starts_with('(') { right } else { format!("({})", right) };
                return Ok(Some(format!("{} {} {}", left, op.as_sql(), right)));
            }
        };

        if values.is_empty() {
            // Nothing is in the empty set.
            return Ok(Some(if negate { "1=1" } else { "1<>1" }.to_string()));
        }

        let left = self.format_field(cx, left, FieldSpot::criterion(op))?;
        let mode = self
            .config
            .in_parameter_mode
            .unwrap_or_else(|| self.generator.in_parameter_mode());
        match mode {
            InParameterMode::Collection => {
                let placeholder = cx.add_parameter(Value::List(values), self.generator);
                Ok(Some(self.generator.in_collection(&left, &placeholder, negate)?))
            }
            InParameterMode::Split => {
                let limit = self.generator.max_parameters();
                let requested = cx.parameter_count() + values.len();
                if requested > limit {
                    return Err(ForgeError::ParameterLimitExceeded {
                        dialect: self.generator.dialect(),
                        limit,
                        requested,
                    });
                }
                let placeholders: Vec<String> = values
                    .into_iter()
                    .map(|value| cx.add_parameter(value, self.generator))
                    .collect();
                Ok(Some(format!("{} {} ({})", left, op.as_sql(), placeholders.join(", "))))
            }
        }
    }

    fn operands(criterion: &Criterion) -> ForgeResult<(&Field, &Field)> {
        match (&criterion.left, &criterion.right) {
            (Some(left), Some(right)) => Ok((left, right)),
            _ => Err(ForgeError::MissingOperand(criterion.operator.to_string())),
        }
    }

    fn is_empty_pattern(field: &Field) -> bool {
        matches!(field, Field::Constant(c) if matches!(&c.value, Value::String(s) if s.is_empty()))
    }

    /// `= NULL` never matches; compare with IS [NOT] NULL instead.
    fn null_comparison(op: Operator, right: &Field) -> Option<&'static str> {
        let Field::Constant(c) = right else {
            return None;
        };
        match (op, c.value.is_null()) {
            (Operator::Equal, true) => Some("IS NULL"),
            (Operator::NotEqual, true) => Some("IS NOT NULL"),
            _ => None,
        }
    }
}
