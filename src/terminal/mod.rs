//! Terminal Module
//!
//! Interactive PHP terminal: reads lines, groups them into units, resolves
//! import aliases, hands units to an evaluator and keeps the resulting
//! variables alive between units.
//!
//! This module contains:
//! - [`session::Session`] - The read/execute loop and its state
//! - [`buffer::StatementBuffer`] - Line accumulator with a completeness check
//! - [`alias::AliasTable`] - `use` declarations and short-name rewriting
//! - [`bindings::BindingTracker`] - Variable names seen in submitted source
//! - [`context::ExecutionContext`] - Variables carried between units
//! - [`completion::CompletionEngine`] - Tab completion
//! - [`preload::Preloader`] - Replays a file before the first prompt
//! - [`evaluator::Evaluator`] - Abstract evaluation interface
//! - [`php::PhpEvaluator`] - Evaluator backed by a `php` child process
//! - [`line::RustylineSource`] - Interactive line editing
//! - [`launch`] - Environment files, bootstrap and preload discovery

pub mod alias;
pub mod bindings;
pub mod buffer;
pub mod completion;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod launch;
pub mod line;
pub mod php;
pub mod preload;
pub mod session;

pub use alias::AliasTable;
pub use bindings::BindingTracker;
pub use buffer::{Feed, StatementBuffer};
pub use completion::{CompletionContext, CompletionEngine};
pub use context::{ExecutionContext, ObjectRegistry};
pub use error::{EvalError, TerminalError, TerminalResult};
pub use evaluator::{Bindings, Evaluation, Evaluator, SymbolTable, Value, ValueKind};
pub use line::{BufReadSource, Input, LineConfig, LineSource, RustylineSource};
pub use php::{PhpEvaluator, PhpOptions};
pub use preload::{PreloadReport, Preloader};
pub use session::{Phase, Session, SessionConfig, SessionState, SharedState};
