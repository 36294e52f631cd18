//! Per-queryable clause assembly.
//!
//! Stages run in a fixed order (condition, sort, combine, join, group,
//! having, tree) and fill a [`TranslationResult`] that the select builder
//! renders. Later stages may rewrite earlier output: the tree stage moves
//! the condition and joins into its anchor CTE.

use crate::ast::{Field, JoinType, OutputType, Queryable, SortEntry};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::dml::SelectOptions;
use crate::transpiler::fields::{FieldLocation, FieldSpot, QueryLocation};
use crate::transpiler::Translator;

#[derive(Debug, Default)]
pub struct TranslationResult {
    pub condition: Option<String>,
    pub sort: Option<String>,
    pub combine: Option<String>,
    pub join: Option<String>,
    pub group: Option<String>,
    pub having: Option<String>,
    /// CTE the queryable selects from instead of its own target.
    pub pre_output: Option<String>,
    pub output_fields: Vec<Field>,
}

impl Translator<'_> {
    pub(crate) fn assemble(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        options: &SelectOptions<'_>,
        main_alias: &str,
    ) -> ForgeResult<TranslationResult> {
        let mut tr = TranslationResult {
            output_fields: self.output_fields(q)?,
            ..Default::default()
        };

        tr.condition = self.translate_conditions(cx, &q.conditions)?;

        if self.renders_sort(q, options) {
            let sorts = self.resolve_sorts(q, self.needs_deterministic_order(q))?;
            tr.sort = self.render_sorts(cx, &sorts, options.location)?;
        }

        if !q.combines.is_empty() {
            tr.combine = Some(self.translate_combines(cx, q, options)?);
        }

        if !q.joins.is_empty() {
            tr.join = Some(self.translate_joins(cx, q)?);
        }

        if !q.group_by.is_empty() {
            let spot = FieldSpot::new(options.location, FieldLocation::GroupBy);
            let fields = q
                .group_by
                .iter()
                .map(|f| self.format_field(cx, f, spot))
                .collect::<ForgeResult<Vec<_>>>()?;
            tr.group = Some(fields.join(", "));
        }

        if let Some(having) = q.having.as_deref().filter(|h| h.has_conditions()) {
            tr.having = self.translate_conditions(cx, &having.conditions)?;
        }

        if let Some(tree) = &q.tree {
            self.compose_tree(cx, q, tree, main_alias, &mut tr)?;
        }

        tracing::trace!(
            entity = q.entity().unwrap_or_default(),
            alias = main_alias,
            "assembled clauses"
        );
        Ok(tr)
    }

    /// Explicit fields, or every field of the target entity.
    pub(crate) fn output_fields(&self, q: &Queryable) -> ForgeResult<Vec<Field>> {
        if !q.fields.is_empty() {
            return Ok(q.fields.clone());
        }
        let entity = q.entity().ok_or(ForgeError::MissingTarget)?;
        Ok(self
            .metadata
            .entity(entity)?
            .fields
            .iter()
            .map(|f| Field::property(entity, &f.property))
            .collect())
    }

    /// `(limit, offset)` the queryable asks for.
    pub(crate) fn row_limit(&self, q: &Queryable) -> Option<(Option<u64>, Option<u64>)> {
        match (q.paging, q.take) {
            (Some(paging), _) => Some((Some(paging.size), Some(paging.offset()))),
            (None, Some(take)) => Some((Some(take), None)),
            (None, None) => None,
        }
    }

    fn needs_deterministic_order(&self, q: &Queryable) -> bool {
        q.paging.is_some() || (q.take.is_some() && self.generator.limit_requires_order())
    }

    /// ORDER BY is only meaningful on the statement's own rows or next to
    /// a row limit; SQL Server rejects it elsewhere.
    fn renders_sort(&self, q: &Queryable, options: &SelectOptions<'_>) -> bool {
        options.with_sort
            && (self.row_limit(q).is_some()
                || (options.location.is_top() && q.output == OutputType::Entities))
    }

    /// Given sorts, or a synthesized key sort when order must be
    /// deterministic: sequence fields first, else the primary key.
    pub(crate) fn resolve_sorts(&self, q: &Queryable, deterministic: bool) -> ForgeResult<Vec<SortEntry>> {
        if !q.sorts.is_empty() || !deterministic {
            return Ok(q.sorts.clone());
        }
        let entity_name = q.entity().ok_or(ForgeError::MissingTarget)?;
        let entity = self.metadata.entity(entity_name)?;
        let sequence: Vec<_> = entity.fields.iter().filter(|f| f.sequence).collect();
        let keys = if sequence.is_empty() {
            entity.primary_key_fields().collect()
        } else {
            sequence
        };
        if keys.is_empty() {
            return Err(ForgeError::NondeterministicPaging(entity_name.to_string()));
        }
        Ok(keys
            .into_iter()
            .map(|f| SortEntry {
                field: Field::property(entity_name, &f.property),
                desc: false,
            })
            .collect())
    }

    fn render_sorts(
        &self,
        cx: &mut ResolutionContext,
        sorts: &[SortEntry],
        location: QueryLocation,
    ) -> ForgeResult<Option<String>> {
        if sorts.is_empty() {
            return Ok(None);
        }
        let spot = FieldSpot::new(location, FieldLocation::Sort);
        let mut parts = Vec::with_capacity(sorts.len());
        for sort in sorts {
            let field = self.format_field(cx, &sort.field, spot)?;
            parts.push(format!("{} {}", field, if sort.desc { "DESC" } else { "ASC" }));
        }
        Ok(Some(parts.join(", ")))
    }

    fn translate_combines(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        options: &SelectOptions<'_>,
    ) -> ForgeResult<String> {
        let mut sql = String::new();
        for entry in &q.combines {
            if !self.generator.supports_combine(entry.combine_type) {
                return Err(ForgeError::unsupported(
                    self.generator.dialect(),
                    entry.combine_type.as_sql(),
                ));
            }
            // Members without a projection mirror the base projection.
            let member = if entry.target.fields.is_empty() && entry.target.entity() == q.entity() {
                let mut member = entry.target.clone();
                member.fields = q.fields.clone();
                member
            } else {
                entry.target.clone()
            };
            // Extra columns of the combined set are projected by every member.
            if let Some(extra) = options
                .extra_columns
                .iter()
                .find(|extra| !Self::resolves_in(&member, &extra.field))
            {
                return Err(ForgeError::InvalidValue(format!(
                    "sort field '{}' is not available in every combined member",
                    extra.field.as_property().map_or("<computed>", |p| p.property.as_str())
                )));
            }
            let select = self.build_select(
                cx,
                &member,
                SelectOptions {
                    extra_columns: options.extra_columns,
                    ..SelectOptions::nested(QueryLocation::Combine)
                },
            )?;
            sql.push_str(&format!(" {} {}", entry.combine_type.as_sql(), select));
        }
        Ok(sql)
    }

    fn translate_joins(&self, cx: &mut ResolutionContext, q: &Queryable) -> ForgeResult<String> {
        let mut parts = Vec::with_capacity(q.joins.len());
        for join in &q.joins {
            let entity = join.target.entity().ok_or(ForgeError::MissingTarget)?;
            if !self.generator.supports_join(join.join_type) {
                return Err(ForgeError::unsupported(
                    self.generator.dialect(),
                    join.join_type.as_sql(),
                ));
            }
            if join.join_type == JoinType::Cross && !join.connection.is_empty() {
                return Err(ForgeError::CrossJoinConnection(entity.to_string()));
            }
            let alias = cx.table_alias(q.id, entity, join.join_ordinal);
            let source = self.join_source(cx, &join.target, &alias)?;
            if join.join_type == JoinType::Cross {
                parts.push(format!("{} {}", join.join_type.as_sql(), source));
                continue;
            }
            let on = self
                .translate_conditions(cx, &join.connection)?
                .ok_or_else(|| ForgeError::MissingJoinConnection {
                    join: join.join_type.to_string(),
                    entity: entity.to_string(),
                })?;
            parts.push(format!("{} {} ON {}", join.join_type.as_sql(), source, on));
        }
        Ok(parts.join(" "))
    }

    /// Whether a property field names the queryable's own target or one of
    /// its joins.
    fn resolves_in(q: &Queryable, field: &Field) -> bool {
        let Some(property) = field.as_property() else {
            return false;
        };
        let entity = Some(property.entity.as_str());
        (property.join_ordinal == 0 && q.entity() == entity)
            || q
                .joins
                .iter()
                .any(|join| join.join_ordinal == property.join_ordinal && join.target.entity() == entity)
    }

    /// `table AS alias` for a bare entity, else a derived table.
    fn join_source(&self, cx: &mut ResolutionContext, target: &Queryable, alias: &str) -> ForgeResult<String> {
        if target.is_plain_entity() {
            return self.from_source(cx, target, alias);
        }
        let select = self.build_select(cx, target, SelectOptions::nested(QueryLocation::Join))?;
        Ok(format!("({}) AS {}", select, alias))
    }
}
