//! Paged retrieval: one statement returning the total row count and one
//! page of rows.
//!
//! ```sql
//! WITH PAGING AS (SELECT ...),
//!      PAGING_COUNT AS (SELECT COUNT(1) AS "TotalCount" FROM PAGING)
//! SELECT (SELECT "TotalCount" FROM PAGING_COUNT) AS "TotalCount", '' AS "Splitter",
//!        TB1."id", TB1."name"
//! FROM PAGING AS TB1 ORDER BY TB1."id" ASC LIMIT 10 OFFSET 10
//! ```

use crate::ast::{ExecutionMode, Field, OutputType, PagingFilter, Queryable};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::contract::{PAGING, PAGING_COUNT, SPLITTER, TOTAL_COUNT};
use crate::transpiler::dml::{ExtraColumn, SelectOptions};
use crate::transpiler::fields::QueryLocation;
use crate::transpiler::Translator;

/// Page size when the queryable carries no paging filter.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Name stem of sort-only columns carried through `PAGING`.
const SORT_COLUMN_PREFIX: &str = "SORT";

impl Translator<'_> {
    pub(crate) fn build_paging(&self, cx: &mut ResolutionContext, q: &Queryable) -> ForgeResult<String> {
        if q.output != OutputType::Entities {
            return Err(ForgeError::UnsupportedOutput {
                output: q.output.to_string(),
                operation: "paging",
            });
        }
        if matches!(q.mode, ExecutionMode::Script { .. }) {
            return Err(ForgeError::InvalidValue(
                "script queryables cannot be paged".to_string(),
            ));
        }
        let paging = q.paging.unwrap_or(PagingFilter::new(1, DEFAULT_PAGE_SIZE));
        let quote = |name: &str| self.generator.quote_identifier(name);

        let output = self.output_fields(q)?;
        let mut names = Vec::with_capacity(output.len());
        for field in &output {
            names.push(self.field_names(field)?.1.to_string());
        }

        // Sort columns travel through the PAGING CTE by output name; sort
        // fields that are not projected ride along as SORT{n} columns so
        // they cannot collide with a projected name.
        let mut extra_columns: Vec<ExtraColumn> = Vec::new();
        let mut order = Vec::new();
        for sort in self.resolve_sorts(q, true)? {
            let name = match output.iter().position(|f| *f == sort.field) {
                Some(pos) => names[pos].clone(),
                None => match &sort.field {
                    Field::Property(_) if !sort.field.is_formatted() => {
                        match extra_columns.iter().find(|c| c.field == sort.field) {
                            Some(column) => column.name.clone(),
                            None => {
                                let name = format!("{}{}", SORT_COLUMN_PREFIX, extra_columns.len());
                                extra_columns.push(ExtraColumn {
                                    field: sort.field.clone(),
                                    name: name.clone(),
                                });
                                name
                            }
                        }
                    }
                    _ => {
                        return Err(ForgeError::InvalidValue(
                            "computed sort fields must also be selected to page".to_string(),
                        ));
                    }
                },
            };
            order.push((name, sort.desc));
        }

        let mut inner_q = q.clone();
        inner_q.paging = None;
        inner_q.take = None;
        let inner = self.build_select(
            cx,
            &inner_q,
            SelectOptions {
                location: QueryLocation::Top,
                with_sort: false,
                extra_columns: &extra_columns,
            },
        )?;

        let alias = cx.allocate_alias();
        let total = quote(TOTAL_COUNT);
        let count = format!("SELECT COUNT(1) AS {} FROM {}", total, PAGING);
        let with = ResolutionContext::with_clause(
            self.generator,
            &cx.take_pre_scripts(),
            &[(PAGING.to_string(), inner), (PAGING_COUNT.to_string(), count)],
        );
        let columns: Vec<String> = names
            .iter()
            .map(|name| format!("{}.{}", alias, quote(name)))
            .collect();
        let order: Vec<String> = order
            .iter()
            .map(|(name, desc)| {
                format!("{}.{} {}", alias, quote(name), if *desc { "DESC" } else { "ASC" })
            })
            .collect();

        Ok(format!(
            "{}SELECT (SELECT {total} FROM {PAGING_COUNT}) AS {total}, '' AS {splitter}, {columns} FROM {PAGING} AS {alias} ORDER BY {order}{limit}",
            with,
            total = total,
            splitter = quote(SPLITTER),
            columns = columns.join(", "),
            alias = alias,
            order = order.join(", "),
            limit = self
                .generator
                .limit_offset(Some(paging.size), Some(paging.offset())),
        ))
    }
}
