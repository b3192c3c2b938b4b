//! Terminal Execution Context
//!
//! Holds the variables that survive from one evaluation to the next, and the
//! subset of them that are objects (for member completion).

use super::evaluator::{Bindings, Value};

/// Names used by the loop's own bookkeeping; never persisted
pub const HOUSEKEEPING_NAMES: &[&str] = &[
    "GLOBALS",
    "buffer",
    "code",
    "inMultiline",
    "lastChar",
    "line",
    "prompt",
    "result",
    "this",
];

/// True when `name` belongs to the housekeeping set
pub fn is_housekeeping(name: &str) -> bool {
    HOUSEKEEPING_NAMES.contains(&name)
}

/// Execution Context
///
/// Variable name (without sigil) to the value snapshot taken after the last
/// successful evaluation.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    variables: Bindings,
}

impl ExecutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings to hand to the evaluator
    pub fn bindings(&self) -> &Bindings {
        &self.variables
    }

    /// Replace the context with a fresh snapshot, dropping housekeeping names
    pub fn capture(
        &mut self,
        snapshot: Bindings,
    ) {
        self.variables = snapshot
            .into_iter()
            .filter(|(name, _)| !is_housekeeping(name))
            .collect();
    }

    /// Get a variable
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Variable names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Object Registry
///
/// Variables whose value is a structured object. Rebuilt from the context
/// after every evaluation rather than patched.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    objects: Bindings,
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the current context
    pub fn rebuild(
        &mut self,
        context: &ExecutionContext,
    ) {
        self.objects = context
            .bindings()
            .iter()
            .filter(|(_, value)| !value.is_primitive())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
    }

    /// Public members of the object bound to `name`
    pub fn members(
        &self,
        name: &str,
    ) -> Option<&[String]> {
        self.objects.get(name).map(Value::list_public_members)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
