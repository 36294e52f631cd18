use crate::ast::{ExecutionMode, Field, OutputType, Queryable, Target};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::clauses::TranslationResult;
use crate::transpiler::context::{PreScript, ResolutionContext};
use crate::transpiler::dml::{ExtraColumn, SelectOptions};
use crate::transpiler::fields::{FieldLocation, FieldSpot, QueryLocation};
use crate::transpiler::Translator;

impl Translator<'_> {
    /// Render a queryable as a SELECT. Pre-scripts it needs are registered
    /// on `cx`; the caller emits the WITH list.
    pub(crate) fn build_select(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        options: SelectOptions<'_>,
    ) -> ForgeResult<String> {
        if let ExecutionMode::Script { text, parameters } = &q.mode {
            for (name, value) in parameters {
                cx.add_named_parameter(name.clone(), value.clone());
            }
            return Ok(text.clone());
        }
        cx.enter(q)?;
        let sql = self.build_select_scoped(cx, q, options);
        cx.leave();
        sql
    }

    fn build_select_scoped(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        options: SelectOptions<'_>,
    ) -> ForgeResult<String> {
        let entity = q.entity().ok_or(ForgeError::MissingTarget)?;
        // Aliases are fixed up front so conditions can reference any join.
        let main_alias = cx.table_alias(q.id, entity, 0);
        for join in &q.joins {
            let join_entity = join.target.entity().ok_or(ForgeError::MissingTarget)?;
            cx.table_alias(q.id, join_entity, join.join_ordinal);
        }

        let tr = self.assemble(cx, q, &options, &main_alias)?;

        match q.output {
            OutputType::Entities => {
                let mut sql = self.compose_rows(cx, q, &tr, &main_alias, options.location, options.extra_columns)?;
                self.push_order_and_limit(&mut sql, q, &tr);
                Ok(sql)
            }
            OutputType::Count => self.compose_count(cx, q, &tr, &main_alias),
            OutputType::Predicate => {
                let mut rows = self.compose_rows(cx, q, &tr, &main_alias, QueryLocation::Subquery, &[])?;
                self.push_order_and_limit(&mut rows, q, &tr);
                Ok(format!("SELECT CASE WHEN EXISTS({}) THEN 1 ELSE 0 END", rows))
            }
        }
    }

    /// SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ..., without order
    /// or limit. A combined queryable is registered as a CTE and selected
    /// from under its main alias.
    fn compose_rows(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        tr: &TranslationResult,
        alias: &str,
        location: QueryLocation,
        extra_columns: &[ExtraColumn],
    ) -> ForgeResult<String> {
        let distinct = if q.distinct { "DISTINCT " } else { "" };
        let from = self.from_clause(cx, q, tr, alias)?;

        let Some(combine) = &tr.combine else {
            let fields = self.projection(cx, &tr.output_fields, extra_columns, location)?;
            let mut sql = format!("SELECT {}{} FROM {}", distinct, fields, from);
            Self::push_filters(&mut sql, tr);
            return Ok(sql);
        };

        let fields = self.projection(cx, &tr.output_fields, extra_columns, QueryLocation::Combine)?;
        let mut body = format!("SELECT {}{} FROM {}", distinct, fields, from);
        Self::push_filters(&mut body, tr);
        body.push_str(combine);

        let name = cx.cte_name("COMBINE");
        cx.push_pre_script(PreScript {
            name: name.clone(),
            alias: alias.to_string(),
            body,
            recursive: false,
        });
        let fields = self.rebased_projection(&tr.output_fields, extra_columns, alias, location)?;
        Ok(format!("SELECT {} FROM {} AS {}", fields, name, alias))
    }

    fn compose_count(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        tr: &TranslationResult,
        alias: &str,
    ) -> ForgeResult<String> {
        let counts_rows = q.distinct
            || !q.group_by.is_empty()
            || tr.combine.is_some()
            || self.row_limit(q).is_some();
        if counts_rows {
            let mut rows = self.compose_rows(cx, q, tr, alias, QueryLocation::Subquery, &[])?;
            self.push_order_and_limit(&mut rows, q, tr);
            let derived = cx.allocate_alias();
            return Ok(format!("SELECT COUNT(1) FROM ({}) AS {}", rows, derived));
        }
        let mut sql = format!("SELECT COUNT(1) FROM {}", self.from_clause(cx, q, tr, alias)?);
        if let Some(condition) = &tr.condition {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        Ok(sql)
    }

    fn from_clause(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        tr: &TranslationResult,
        alias: &str,
    ) -> ForgeResult<String> {
        if let Some(cte) = &tr.pre_output {
            return Ok(format!("{} AS {}", cte, alias));
        }
        let mut sql = self.from_source(cx, q, alias)?;
        if let Some(join) = &tr.join {
            sql.push(' ');
            sql.push_str(join);
        }
        Ok(sql)
    }

    /// The queryable's own target under `alias`.
    pub(crate) fn from_source(&self, cx: &mut ResolutionContext, q: &Queryable, alias: &str) -> ForgeResult<String> {
        match &q.target {
            Some(Target::Entity(entity)) => Ok(format!("{} AS {}", self.table_name(entity)?, alias)),
            Some(Target::Nested(inner)) => {
                let select = self.build_select(cx, inner, SelectOptions::nested(QueryLocation::Subquery))?;
                Ok(format!("({}) AS {}", select, alias))
            }
            None => Err(ForgeError::MissingTarget),
        }
    }

    pub(crate) fn projection(
        &self,
        cx: &mut ResolutionContext,
        fields: &[Field],
        extra_columns: &[ExtraColumn],
        location: QueryLocation,
    ) -> ForgeResult<String> {
        let spot = FieldSpot::new(location, FieldLocation::Output);
        let mut rendered = fields
            .iter()
            .map(|field| self.format_field(cx, field, spot))
            .collect::<ForgeResult<Vec<_>>>()?;
        let extra_spot = FieldSpot::new(location, FieldLocation::Sort);
        for extra in extra_columns {
            let sql = self.format_field(cx, &extra.field, extra_spot)?;
            rendered.push(format!("{} AS {}", sql, self.generator.quote_identifier(&extra.name)));
        }
        Ok(rendered.join(", "))
    }

    /// Output fields read back from an intermediate result by column name.
    fn rebased_projection(
        &self,
        fields: &[Field],
        extra_columns: &[ExtraColumn],
        alias: &str,
        location: QueryLocation,
    ) -> ForgeResult<String> {
        let mut rendered = Vec::with_capacity(fields.len() + extra_columns.len());
        for field in fields {
            let (column, output) = self.field_names(field)?;
            let mut sql = format!("{}.{}", alias, self.generator.quote_identifier(column));
            if location.is_top() && column != output {
                sql.push_str(&format!(" AS {}", self.generator.quote_identifier(output)));
            }
            rendered.push(sql);
        }
        for extra in extra_columns {
            rendered.push(format!("{}.{}", alias, self.generator.quote_identifier(&extra.name)));
        }
        Ok(rendered.join(", "))
    }

    fn push_filters(sql: &mut String, tr: &TranslationResult) {
        if let Some(condition) = &tr.condition {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        if let Some(group) = &tr.group {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }
        if let Some(having) = &tr.having {
            sql.push_str(" HAVING ");
            sql.push_str(having);
        }
    }

    fn push_order_and_limit(&self, sql: &mut String, q: &Queryable, tr: &TranslationResult) {
        if let Some(sort) = &tr.sort {
            sql.push_str(" ORDER BY ");
            sql.push_str(sort);
        }
        if let Some((limit, offset)) = self.row_limit(q) {
            sql.push_str(&self.generator.limit_offset(limit, offset));
        }
    }
}
