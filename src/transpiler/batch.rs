//! Execution statement batching.
//!
//! Mutations that can share a round trip are concatenated into one
//! statement; the rest run alone. A group shares one resolution context so
//! parameter names never collide inside it.

use crate::ast::{ExecutionCommand, ScriptKind};
use crate::error::ForgeResult;
use crate::transpiler::context::ResolutionContext;
use crate::transpiler::statement::ExecutionStatement;
use crate::transpiler::Translator;

struct PendingGroup {
    cx: ResolutionContext,
    statements: Vec<ExecutionStatement>,
}

impl PendingGroup {
    /// A statement joins unless it overflows the parameter budget or
    /// reuses a name already bound in the group (raw scripts).
    fn accepts(&self, statement: &ExecutionStatement, fork: &ResolutionContext, max_parameters: usize) -> bool {
        if self.statements.is_empty() {
            return true;
        }
        fork.parameter_count() <= max_parameters
            && statement
                .parameters
                .iter()
                .all(|p| !self.cx.has_parameter(&p.name))
    }
}

impl Translator<'_> {
    pub(crate) fn batch_execution(&self, commands: &[ExecutionCommand]) -> ForgeResult<Vec<ExecutionStatement>> {
        let max_statements = self.config.max_batch_statements.max(1);
        let max_parameters = self
            .config
            .max_batch_parameters
            .min(self.generator.max_parameters());
        let isolate_read_back = self.config.isolate_read_back;

        let mut output = Vec::new();
        let mut group = PendingGroup {
            cx: self.new_context(),
            statements: Vec::new(),
        };

        for command in commands {
            // Translate into a fork; the group only sees it once committed.
            let mut fork = group.cx.clone();
            let statement = self.translate_execution(&mut fork, command)?;

            if statement.perform_alone(isolate_read_back) {
                self.flush(&mut group, &mut output);
                let mut cx = self.new_context();
                output.push(self.translate_execution(&mut cx, command)?);
                continue;
            }

            if group.accepts(&statement, &fork, max_parameters) {
                group.cx = fork;
                group.statements.push(statement);
            } else {
                self.flush(&mut group, &mut output);
                let statement = self.translate_execution(&mut group.cx, command)?;
                group.statements.push(statement);
            }

            // A read-back must run right after the insert it reads, so it
            // closes the group.
            let reads_back = group
                .statements
                .last()
                .is_some_and(|s| s.incremental_script.is_some());
            if reads_back
                || group.statements.len() >= max_statements
                || group.cx.parameter_count() >= max_parameters
            {
                self.flush(&mut group, &mut output);
            }
        }
        self.flush(&mut group, &mut output);

        tracing::debug!(
            commands = commands.len(),
            statements = output.len(),
            "batched execution statements"
        );
        Ok(output)
    }

    /// One command to one statement, with its pre-scripts hoisted and only
    /// the parameters it bound.
    pub(crate) fn translate_execution(
        &self,
        cx: &mut ResolutionContext,
        command: &ExecutionCommand,
    ) -> ForgeResult<ExecutionStatement> {
        let start = cx.parameter_count();
        let mut read_back = None;
        let (script, script_kind, must_affect_data) = match command {
            ExecutionCommand::Insert {
                entity,
                values,
                must_affect_data,
            } => {
                let (sql, identity) = self.build_insert(cx, entity, values)?;
                read_back = identity;
                (sql, ScriptKind::Text, *must_affect_data)
            }
            ExecutionCommand::Update {
                entity,
                values,
                query,
                must_affect_data,
            } => (
                self.build_update(cx, entity, values, query)?,
                ScriptKind::Text,
                *must_affect_data,
            ),
            ExecutionCommand::Delete {
                entity,
                query,
                must_affect_data,
            } => (self.build_delete(cx, entity, query)?, ScriptKind::Text, *must_affect_data),
            ExecutionCommand::Script {
                text,
                parameters,
                kind,
                must_affect_data,
            } => {
                for (name, value) in parameters {
                    cx.add_named_parameter(name.clone(), value.clone());
                }
                (text.clone(), *kind, *must_affect_data)
            }
        };

        let pre_scripts = cx.take_pre_scripts();
        let with = ResolutionContext::with_clause(self.generator, &pre_scripts, &[]);
        Ok(ExecutionStatement {
            script: format!("{}{}", with, script),
            parameters: cx.parameters_since(start),
            script_kind,
            must_affect_data,
            incremental_script: read_back,
            has_pre_script: !pre_scripts.is_empty(),
        })
    }

    fn flush(&self, group: &mut PendingGroup, output: &mut Vec<ExecutionStatement>) {
        let statements = std::mem::take(&mut group.statements);
        group.cx = self.new_context();
        match statements.len() {
            0 => {}
            1 => output.extend(statements),
            n => {
                tracing::trace!(statements = n, "flushing batch group");
                output.push(Self::merge(statements));
            }
        }
    }

    fn merge(statements: Vec<ExecutionStatement>) -> ExecutionStatement {
        let mut scripts = Vec::with_capacity(statements.len());
        let mut parameters = Vec::new();
        let mut read_back = None;
        for statement in statements {
            scripts.push(statement.script);
            parameters.extend(statement.parameters);
            // Only the closing statement of a group carries one.
            read_back = statement.incremental_script.or(read_back);
        }
        let mut merged = ExecutionStatement::text(scripts.join(";\n"), parameters);
        merged.incremental_script = read_back;
        merged
    }
}
