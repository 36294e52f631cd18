//! Per-statement translation state: table aliases, bound parameters,
//! hoisted CTEs and the nesting stack.
//!
//! One context is created per top-level command (or per batch group) and
//! threaded through every builder by `&mut`. Cloning it forks the state, which
//! the batcher uses to try a command against a group without committing.

use std::collections::HashMap;

use crate::ast::{Queryable, QueryableId, Value};
use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::contract::TABLE_ALIAS_PREFIX;
use crate::transpiler::statement::Parameter;
use crate::transpiler::traits::SqlGenerator;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AliasKey {
    queryable: QueryableId,
    entity: String,
    ordinal: usize,
}

/// A CTE registered during translation, emitted in the statement's `WITH`
/// list.
#[derive(Debug, Clone, PartialEq)]
pub struct PreScript {
    pub name: String,
    /// Alias under which the owning queryable selects from it.
    pub alias: String,
    pub body: String,
    pub recursive: bool,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    aliases: HashMap<AliasKey, String>,
    alias_seq: usize,
    parameters: Vec<Parameter>,
    parameter_prefix: String,
    parameter_seq: usize,
    pre_scripts: Vec<PreScript>,
    cte_seq: usize,
    scopes: Vec<QueryableId>,
    max_depth: usize,
}

impl ResolutionContext {
    pub fn new(parameter_prefix: impl Into<String>, max_depth: usize) -> Self {
        Self {
            aliases: HashMap::new(),
            alias_seq: 0,
            parameters: Vec::new(),
            parameter_prefix: parameter_prefix.into(),
            parameter_seq: 0,
            pre_scripts: Vec::new(),
            cte_seq: 0,
            scopes: Vec::new(),
            max_depth,
        }
    }

    /// Push a queryable onto the nesting stack. Fails when it is already
    /// being translated further out, or when the stack is too deep.
    pub fn enter(&mut self, queryable: &Queryable) -> ForgeResult<()> {
        let label = queryable.entity().unwrap_or("<group>");
        if self.scopes.contains(&queryable.id) {
            return Err(ForgeError::CyclicQueryable(label.to_string()));
        }
        if self.scopes.len() >= self.max_depth {
            return Err(ForgeError::MaxDepthExceeded(self.max_depth));
        }
        tracing::trace!(depth = self.scopes.len(), entity = %label, "enter queryable");
        self.scopes.push(queryable.id);
        Ok(())
    }

    pub fn leave(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Alias of `(queryable, entity, ordinal)`, allocated on first request.
    pub fn table_alias(&mut self, queryable: QueryableId, entity: &str, ordinal: usize) -> String {
        let key = AliasKey {
            queryable,
            entity: entity.to_string(),
            ordinal,
        };
        if let Some(alias) = self.aliases.get(&key) {
            return alias.clone();
        }
        let alias = self.allocate_alias();
        self.aliases.insert(key, alias.clone());
        alias
    }

    /// Fresh alias not bound to any entity (derived tables, recursion legs).
    pub fn allocate_alias(&mut self) -> String {
        let alias = format!("{}{}", TABLE_ALIAS_PREFIX, self.alias_seq);
        self.alias_seq += 1;
        alias
    }

    /// Resolve a property's entity against the innermost scope that
    /// allocated it, walking outward for correlated references.
    pub fn lookup_alias(&self, entity: &str, ordinal: usize) -> ForgeResult<String> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| {
                self.aliases.get(&AliasKey {
                    queryable: *scope,
                    entity: entity.to_string(),
                    ordinal,
                })
            })
            .cloned()
            .ok_or_else(|| ForgeError::UnresolvedAlias {
                entity: entity.to_string(),
                ordinal,
            })
    }

    /// Bind a value under the next generated name; returns its placeholder.
    pub fn add_parameter(&mut self, value: Value, generator: &dyn SqlGenerator) -> String {
        self.parameter_seq += 1;
        let name = format!("{}{}", self.parameter_prefix, self.parameter_seq);
        let placeholder = generator.placeholder(self.parameters.len() + 1, &name);
        self.parameters.push(Parameter { name, value });
        placeholder
    }

    /// Bind a value under a caller-chosen name (raw scripts).
    pub fn add_named_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.push(Parameter {
            name: name.into(),
            value,
        });
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parameters bound since `start`.
    pub fn parameters_since(&self, start: usize) -> Vec<Parameter> {
        self.parameters[start.min(self.parameters.len())..].to_vec()
    }

    pub fn into_parameters(self) -> Vec<Parameter> {
        self.parameters
    }

    /// Next CTE name with the given stem, e.g. `TREE0`.
    pub fn cte_name(&mut self, stem: &str) -> String {
        let name = format!("{}{}", stem, self.cte_seq);
        self.cte_seq += 1;
        name
    }

    pub fn push_pre_script(&mut self, pre_script: PreScript) {
        tracing::trace!(name = %pre_script.name, recursive = pre_script.recursive, "register pre-script");
        self.pre_scripts.push(pre_script);
    }

    pub fn pre_scripts(&self) -> &[PreScript] {
        &self.pre_scripts
    }

    pub fn take_pre_scripts(&mut self) -> Vec<PreScript> {
        std::mem::take(&mut self.pre_scripts)
    }

    /// `WITH` clause (with trailing space) for `pre_scripts` and any extra
    /// members, or empty when there are none.
    pub fn with_clause(
        generator: &dyn SqlGenerator,
        pre_scripts: &[PreScript],
        extra: &[(String, String)],
    ) -> String {
        if pre_scripts.is_empty() && extra.is_empty() {
            return String::new();
        }
        let recursive = if pre_scripts.iter().any(|p| p.recursive) {
            generator.recursive_keyword()
        } else {
            ""
        };
        let members: Vec<String> = pre_scripts
            .iter()
            .map(|p| (p.name.as_str(), p.body.as_str()))
            .chain(extra.iter().map(|(n, b)| (n.as_str(), b.as_str())))
            .map(|(name, body)| format!("{} AS ({})", name, body))
            .collect();
        format!("WITH {}{} ", recursive, members.join(", "))
    }
}
