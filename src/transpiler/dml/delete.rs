use crate::ast::Queryable;
use crate::error::ForgeResult;
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::Translator;

impl Translator<'_> {
    pub(crate) fn build_delete(
        &self,
        cx: &mut ResolutionContext,
        entity_name: &str,
        query: &Queryable,
    ) -> ForgeResult<String> {
        let q = Self::mutation_target(entity_name, query)?;
        cx.enter(&q)?;
        let sql = self.build_delete_scoped(cx, entity_name, &q);
        cx.leave();
        sql
    }

    fn build_delete_scoped(
        &self,
        cx: &mut ResolutionContext,
        entity_name: &str,
        q: &Queryable,
    ) -> ForgeResult<String> {
        let alias = cx.table_alias(q.id, entity_name, 0);
        let condition = self.mutation_filter(cx, entity_name, q, &alias)?;
        Ok(self
            .generator
            .delete_statement(&self.table_name(entity_name)?, &alias, condition.as_deref()))
    }
}
