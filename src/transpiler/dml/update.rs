use crate::ast::{Field, OutputType, Queryable, Target, UpdateItem};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::dml::SelectOptions;
use crate::transpiler::fields::{FieldLocation, FieldSpot, QueryLocation};
use crate::transpiler::Translator;

impl Translator<'_> {
    pub(crate) fn build_update(
        &self,
        cx: &mut ResolutionContext,
        entity_name: &str,
        items: &[UpdateItem],
        query: &Queryable,
    ) -> ForgeResult<String> {
        if items.is_empty() {
            return Err(ForgeError::InvalidValue(format!(
                "update of '{}' sets no values",
                entity_name
            )));
        }
        let q = Self::mutation_target(entity_name, query)?;
        cx.enter(&q)?;
        let sql = self.build_update_scoped(cx, entity_name, items, &q);
        cx.leave();
        sql
    }

    fn build_update_scoped(
        &self,
        cx: &mut ResolutionContext,
        entity_name: &str,
        items: &[UpdateItem],
        q: &Queryable,
    ) -> ForgeResult<String> {
        let entity = self.metadata.entity(entity_name)?;
        let alias = cx.table_alias(q.id, entity_name, 0);
        let spot = FieldSpot::new(QueryLocation::Top, FieldLocation::UpdateValue);

        let mut sets = Vec::with_capacity(items.len());
        for item in items {
            let field = entity
                .field(&item.property)
                .ok_or_else(|| ForgeError::unknown_field(entity_name, &item.property))?;
            let column = self.generator.quote_identifier(field.column_name());
            let value = self.format_field(cx, &item.value, spot)?;
            sets.push(match item.op.as_sql() {
                Some(op) => format!("{} = {} {} {}", column, column, op, value),
                None => format!("{} = {}", column, value),
            });
        }

        let condition = self.mutation_filter(cx, entity_name, q, &alias)?;
        Ok(self.generator.update_statement(
            &self.table_name(entity_name)?,
            &alias,
            &sets,
            condition.as_deref(),
        ))
    }

    /// The mutation's query, defaulted onto the mutated entity.
    pub(crate) fn mutation_target(entity_name: &str, query: &Queryable) -> ForgeResult<Queryable> {
        let mut q = query.clone();
        match q.entity().map(str::to_string) {
            None => q.target = Some(Target::Entity(entity_name.to_string())),
            Some(entity) if entity != entity_name => {
                return Err(ForgeError::InvalidValue(format!(
                    "mutation of '{}' filtered by a query on '{}'",
                    entity_name, entity
                )));
            }
            Some(_) => {}
        }
        Ok(q)
    }

    /// WHERE text of an update or delete. Plain conditions apply to the
    /// target directly; anything needing joins, traversal or row limits is
    /// evaluated as a key subquery.
    pub(crate) fn mutation_filter(
        &self,
        cx: &mut ResolutionContext,
        entity_name: &str,
        q: &Queryable,
        alias: &str,
    ) -> ForgeResult<Option<String>> {
        let simple = q.joins.is_empty()
            && q.combines.is_empty()
            && q.group_by.is_empty()
            && q.tree.is_none()
            && q.take.is_none()
            && q.paging.is_none()
            && matches!(q.target, Some(Target::Entity(_)));
        if simple {
            return self.translate_conditions(cx, &q.conditions);
        }

        let keys = self.metadata.primary_key_fields(entity_name)?;
        let [key] = keys.as_slice() else {
            return Err(ForgeError::unsupported(
                self.generator.dialect(),
                format!("filtered mutation of '{}' without a single-column key", entity_name),
            ));
        };
        let column = self.generator.quote_identifier(key.column_name());

        let mut keyed = q.clone();
        keyed.output = OutputType::Entities;
        keyed.fields = vec![Field::property(entity_name, &key.property)];
        let select = self.build_select(cx, &keyed, SelectOptions::nested(QueryLocation::Subquery))?;
        // The extra derived table lets MySQL read the table it is modifying.
        let derived = cx.allocate_alias();
        Ok(Some(format!(
            "{}.{} IN (SELECT {}.{} FROM ({}) AS {})",
            alias, column, derived, column, select, derived
        )))
    }
}
