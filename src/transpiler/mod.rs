//! Queryable-to-SQL translation.
//!
//! [`Engine`] is the entry point: it owns the dialect generator, entity
//! metadata, formatters and configuration, and creates a fresh
//! [`ResolutionContext`](context::ResolutionContext) for every call.

pub mod batch;
pub mod clauses;
pub mod conditions;
pub mod context;
pub mod contract;
pub mod ddl;
pub mod dialect;
pub mod dml;
pub mod fields;
pub mod formatters;
pub mod sql;
pub mod statement;
pub mod traits;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::ast::{ExecutionCommand, MigrationCommand, QueryCommand};
use crate::config::EngineConfig;
use crate::error::ForgeResult;
use crate::metadata::EntityMetadata;

use context::ResolutionContext;
use dml::SelectOptions;

pub use dialect::Dialect;
pub use formatters::{FieldFormatter, FormatContext, FormatterRegistry};
pub use statement::{ExecutionStatement, Parameter, Statement};
pub use traits::{escape_identifier, InParameterMode, SqlGenerator};

/// Translates query, execution and migration commands into SQL for one
/// dialect. Immutable after construction and safe to share across threads.
pub struct Engine {
    generator: Box<dyn SqlGenerator>,
    metadata: Arc<dyn EntityMetadata>,
    formatters: FormatterRegistry,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig, metadata: Arc<dyn EntityMetadata>) -> Self {
        Self {
            generator: config.dialect.generator(),
            metadata,
            formatters: FormatterRegistry::with_builtins(),
            config,
        }
    }

    /// Replace the dialect generator, e.g. with a test double.
    pub fn with_generator(mut self, generator: Box<dyn SqlGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_formatters(mut self, formatters: FormatterRegistry) -> Self {
        self.formatters = formatters;
        self
    }

    pub fn register_formatter(&mut self, name: &str, formatter: impl FieldFormatter + 'static) {
        self.formatters.register(name, formatter);
    }

    pub fn dialect(&self) -> Dialect {
        self.generator.dialect()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn generate_query_statement(&self, command: &QueryCommand) -> ForgeResult<Statement> {
        let translator = self.translator();
        let mut cx = translator.new_context();
        let body = translator.build_select(&mut cx, &command.queryable, SelectOptions::top())?;
        let with = ResolutionContext::with_clause(self.generator.as_ref(), &cx.take_pre_scripts(), &[]);
        let statement = Statement {
            script: format!("{}{}", with, body),
            parameters: cx.into_parameters(),
        };
        tracing::debug!(
            dialect = %self.dialect(),
            parameters = statement.parameters.len(),
            "query: {}",
            statement.script
        );
        Ok(statement)
    }

    /// Paged retrieval; the first two result columns are `TotalCount` and
    /// `Splitter`.
    pub fn generate_query_paging_statement(&self, command: &QueryCommand) -> ForgeResult<Statement> {
        let translator = self.translator();
        let mut cx = translator.new_context();
        let script = translator.build_paging(&mut cx, &command.queryable)?;
        let statement = Statement {
            script,
            parameters: cx.into_parameters(),
        };
        tracing::debug!(
            dialect = %self.dialect(),
            parameters = statement.parameters.len(),
            "paging query: {}",
            statement.script
        );
        Ok(statement)
    }

    pub fn generate_execution_statements(
        &self,
        commands: &[ExecutionCommand],
    ) -> ForgeResult<Vec<ExecutionStatement>> {
        let statements = self.translator().batch_execution(commands)?;
        for statement in &statements {
            tracing::debug!(
                dialect = %self.dialect(),
                parameters = statement.parameters.len(),
                alone = statement.perform_alone(self.config.isolate_read_back),
                "execution: {}",
                statement.script
            );
        }
        Ok(statements)
    }

    pub fn generate_migration_statements(&self, command: &MigrationCommand) -> ForgeResult<Vec<Statement>> {
        let statements = self.translator().build_migration(command)?;
        tracing::debug!(
            dialect = %self.dialect(),
            statements = statements.len(),
            "migration generated"
        );
        Ok(statements)
    }

    fn translator(&self) -> Translator<'_> {
        Translator {
            generator: self.generator.as_ref(),
            metadata: self.metadata.as_ref(),
            formatters: &self.formatters,
            config: &self.config,
        }
    }
}

/// Borrowed view of an engine handed to every builder.
pub(crate) struct Translator<'a> {
    pub(crate) generator: &'a dyn SqlGenerator,
    pub(crate) metadata: &'a dyn EntityMetadata,
    pub(crate) formatters: &'a FormatterRegistry,
    pub(crate) config: &'a EngineConfig,
}

impl Translator<'_> {
    pub(crate) fn new_context(&self) -> ResolutionContext {
        ResolutionContext::new(&self.config.parameter_prefix, self.config.max_depth)
    }

    /// Quoted table of an entity.
    pub(crate) fn table_name(&self, entity: &str) -> ForgeResult<String> {
        Ok(escape_identifier(self.generator, &self.metadata.entity(entity)?.table))
    }
}
