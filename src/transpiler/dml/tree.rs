//! Recursive parent/child traversal as a recursive CTE.
//!
//! ```sql
//! WITH RECURSIVE TREE0 AS (
//!   SELECT TB0."id", TB0."parent_id" FROM "nodes" AS TB0 WHERE TB0."id" = $1
//!   UNION ALL
//!   SELECT TB1."id", TB1."parent_id" FROM "nodes" AS TB1
//!   INNER JOIN TREE0 AS TB2 ON TB1."parent_id" = TB2."id"
//! )
//! SELECT TB0."id", TB0."parent_id" FROM TREE0 AS TB0
//! ```

use crate::ast::{Field, Queryable, TreeDirection, TreeInfo};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::clauses::TranslationResult;
use crate::transpiler::context::{PreScript, ResolutionContext};
use crate::transpiler::fields::{FieldLocation, FieldSpot, QueryLocation};
use crate::transpiler::Translator;

impl Translator<'_> {
    /// Register the traversal CTE and point the queryable at it. The
    /// condition and joins move into the anchor member.
    pub(crate) fn compose_tree(
        &self,
        cx: &mut ResolutionContext,
        q: &Queryable,
        tree: &TreeInfo,
        alias: &str,
        tr: &mut TranslationResult,
    ) -> ForgeResult<()> {
        let entity_name = q.entity().ok_or(ForgeError::MissingTarget)?;
        let entity = self.metadata.entity(entity_name)?;
        let data = self
            .generator
            .quote_identifier(self.metadata.field(entity_name, &tree.data_field)?.column_name());
        let parent = self
            .generator
            .quote_identifier(self.metadata.field(entity_name, &tree.parent_field)?.column_name());
        let columns: Vec<Field> = entity
            .fields
            .iter()
            .map(|f| Field::property(entity_name, &f.property))
            .collect();

        let mut anchor = format!(
            "SELECT {} FROM {}",
            self.projection(cx, &columns, &[], QueryLocation::Subquery)?,
            self.from_source(cx, q, alias)?
        );
        if let Some(join) = tr.join.take() {
            anchor.push(' ');
            anchor.push_str(&join);
        }
        if let Some(condition) = tr.condition.take() {
            anchor.push_str(" WHERE ");
            anchor.push_str(&condition);
        }

        let name = cx.cte_name("TREE");
        let row = cx.allocate_alias();
        let prior = cx.allocate_alias();
        let spot = FieldSpot::new(QueryLocation::Subquery, FieldLocation::Output).with_alias(&row);
        let member_fields = columns
            .iter()
            .map(|f| self.format_field(cx, f, spot))
            .collect::<ForgeResult<Vec<_>>>()?;
        let link = match tree.direction {
            TreeDirection::Down => format!("{}.{} = {}.{}", row, parent, prior, data),
            TreeDirection::Up => format!("{}.{} = {}.{}", row, data, prior, parent),
        };
        let recursive = format!(
            "SELECT {} FROM {} AS {} INNER JOIN {} AS {} ON {}",
            member_fields.join(", "),
            self.table_name(entity_name)?,
            row,
            name,
            prior,
            link
        );

        cx.push_pre_script(PreScript {
            name: name.clone(),
            alias: alias.to_string(),
            body: format!("{} UNION ALL {}", anchor, recursive),
            recursive: true,
        });
        tr.pre_output = Some(name);
        Ok(())
    }
}
