//! Named field formatters (`COUNT`, `UPPER`, `COALESCE`, ...).
//!
//! A format option on a field is looked up here by name and applied to the
//! field's rendered text. Custom formatters can be registered on the engine.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ForgeError, ForgeResult};
use crate::transpiler::Dialect;

/// Input to a formatter.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    /// Registered name, upper-cased.
    pub name: &'a str,
    /// The field as rendered so far.
    pub text: &'a str,
    /// Rendered option parameter: a placeholder, an inline literal or
    /// another field.
    pub parameter: Option<&'a str>,
    pub dialect: Dialect,
}

pub trait FieldFormatter: Send + Sync {
    fn format(&self, cx: &FormatContext<'_>) -> ForgeResult<String>;

    /// Bind literal parameters instead of inlining them.
    fn parameterize(&self) -> bool {
        false
    }
}

impl<F> FieldFormatter for F
where
    F: Fn(&FormatContext<'_>) -> ForgeResult<String> + Send + Sync,
{
    fn format(&self, cx: &FormatContext<'_>) -> ForgeResult<String> {
        self(cx)
    }
}

/// `NAME(text)` or `NAME(text, parameter)`.
struct FunctionFormatter {
    function: &'static str,
    parameterize: bool,
}

impl FieldFormatter for FunctionFormatter {
    fn format(&self, cx: &FormatContext<'_>) -> ForgeResult<String> {
        Ok(match cx.parameter {
            Some(parameter) => format!("{}({}, {})", self.function, cx.text, parameter),
            None => format!("{}({})", self.function, cx.text),
        })
    }

    fn parameterize(&self) -> bool {
        self.parameterize
    }
}

/// SQL Server spells string length `LEN`.
fn length(cx: &FormatContext<'_>) -> ForgeResult<String> {
    Ok(match cx.dialect {
        Dialect::SqlServer => format!("LEN({})", cx.text),
        _ => format!("LENGTH({})", cx.text),
    })
}

#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<dyn FieldFormatter>>,
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.formatters.keys().collect();
        names.sort();
        f.debug_struct("FormatterRegistry").field("formatters", &names).finish()
    }
}

impl FormatterRegistry {
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for function in ["COUNT", "SUM", "AVG", "MAX", "MIN", "UPPER", "LOWER", "TRIM"] {
            registry.register(
                function,
                FunctionFormatter {
                    function,
                    parameterize: false,
                },
            );
        }
        registry.register(
            "COALESCE",
            FunctionFormatter {
                function: "COALESCE",
                parameterize: true,
            },
        );
        registry.register("LENGTH", length);
        registry
    }

    /// Register or replace a formatter. Names are case-insensitive.
    pub fn register(&mut self, name: &str, formatter: impl FieldFormatter + 'static) {
        self.formatters
            .insert(name.to_ascii_uppercase(), Arc::new(formatter));
    }

    pub fn get(&self, name: &str) -> ForgeResult<&dyn FieldFormatter> {
        self.formatters
            .get(&name.to_ascii_uppercase())
            .map(|f| f.as_ref())
            .ok_or_else(|| ForgeError::UnknownFormatter(name.to_string()))
    }
}
