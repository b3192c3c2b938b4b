//! Evaluator Trait
//!
//! Defines the abstract interface of the capability that turns a unit of
//! source text into a value. The terminal never evaluates code itself; it hands
//! units and bindings to an `Evaluator` and keeps what comes back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::EvalError;

/// Opaque reference to a value held by the evaluator host
pub type Handle = u64;

/// Variable name (without sigil) to value
pub type Bindings = BTreeMap<String, Value>;

/// Coarse classification of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
    Resource,
}

/// Snapshot of a value as reported by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    /// Host-side handle, absent for values that are only displayed
    #[serde(default)]
    pub handle: Option<Handle>,
    /// Value kind
    pub kind: ValueKind,
    /// Printable representation
    pub repr: String,
    /// Class name for objects
    #[serde(default)]
    pub class: Option<String>,
    /// Public operations and fields for objects
    #[serde(default)]
    pub members: Vec<String>,
}

impl Value {
    /// Create a primitive value with the given representation
    pub fn primitive(
        kind: ValueKind,
        repr: impl Into<String>,
    ) -> Self {
        Self {
            handle: None,
            kind,
            repr: repr.into(),
            class: None,
            members: Vec::new(),
        }
    }

    /// Create an integer value
    pub fn int(v: i64) -> Self {
        Self::primitive(ValueKind::Int, v.to_string())
    }

    /// Create a string value (repr is the quoted literal)
    pub fn string(s: &str) -> Self {
        Self::primitive(ValueKind::String, format!("'{}'", s))
    }

    /// Create an object value exposing the given public members
    pub fn object<I, S>(
        class: &str,
        members: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            handle: None,
            kind: ValueKind::Object,
            repr: class.to_string(),
            class: Some(class.to_string()),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a host handle
    pub fn with_handle(
        mut self,
        handle: Handle,
    ) -> Self {
        self.handle = Some(handle);
        self
    }

    /// True for the empty/absent value
    pub fn is_null(&self) -> bool {
        self.kind == ValueKind::Null
    }

    /// True for anything that is not a structured object
    pub fn is_primitive(&self) -> bool {
        self.kind != ValueKind::Object
    }

    /// Names of public operations and fields; empty for non-objects
    pub fn list_public_members(&self) -> &[String] {
        &self.members
    }
}

impl std::fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.repr)
    }
}

/// Outcome of a successful evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Value produced by the unit, `None` when absent
    pub result: Option<Value>,
    /// Every name visible in the execution scope afterwards
    pub bindings: Bindings,
    /// Text the unit printed while running
    pub output: String,
}

/// Names the evaluator can call or instantiate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    /// Callable names
    #[serde(default)]
    pub functions: Vec<String>,
    /// Class, interface and trait names
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Evaluator Trait
///
/// Implementations must accept re-entrant calls with different bindings and
/// report every binding visible after the call, unchanged ones included.
pub trait Evaluator {
    /// Evaluate a unit against the given bindings
    fn evaluate(
        &mut self,
        code: &str,
        bindings: &Bindings,
    ) -> Result<Evaluation, EvalError>;

    /// Callable and type names currently known to the evaluator
    fn symbols(&mut self) -> Result<SymbolTable, EvalError> {
        Ok(SymbolTable::default())
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(
        &mut self,
        code: &str,
        bindings: &Bindings,
    ) -> Result<Evaluation, EvalError> {
        (**self).evaluate(code, bindings)
    }

    fn symbols(&mut self) -> Result<SymbolTable, EvalError> {
        (**self).symbols()
    }
}
