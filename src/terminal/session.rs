//! Terminal Session
//!
//! Owns the per-invocation state and drives the read, buffer, resolve,
//! track, execute, display loop.
//!
//! ```text
//! PROMPT_SINGLE --incomplete--> PROMPT_CONTINUATION --complete--> EXECUTING
//!       ^                                                            |
//!       +------------------------------------------------------------+
//! any prompt --EOF / exit keyword--> TERMINATED
//! ```

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use owo_colors::OwoColorize;
use tracing::{debug, warn};

use super::alias::AliasTable;
use super::bindings::BindingTracker;
use super::buffer::{Feed, StatementBuffer};
use super::context::{ExecutionContext, ObjectRegistry};
use super::error::{EvalError, TerminalResult};
use super::evaluator::{Evaluation, Evaluator, SymbolTable};
use super::line::{Input, LineSource};

/// State shared between the loop and the completer
#[derive(Debug, Default)]
pub struct SessionState {
    /// Variables carried between evaluations
    pub context: ExecutionContext,
    /// Object-valued subset of the context
    pub registry: ObjectRegistry,
    /// Import aliases
    pub aliases: AliasTable,
    /// Variable names seen in submitted source
    pub tracker: BindingTracker,
    /// Callables and types known to the evaluator
    pub symbols: SymbolTable,
}

/// Session state handle; the terminal is single-threaded
pub type SharedState = Rc<RefCell<SessionState>>;

/// Loop phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PromptSingle,
    PromptContinuation,
    Executing,
    Terminated,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prompt for a fresh unit
    pub prompt: String,
    /// Prompt while a unit is still open
    pub continuation_prompt: String,
    /// Lines (trimmed) that end the session
    pub exit_keywords: Vec<String>,
    /// Colour error output
    pub colors: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: "php> ".to_string(),
            continuation_prompt: "php* ".to_string(),
            exit_keywords: vec!["exit".to_string(), "quit".to_string()],
            colors: false,
        }
    }
}

/// Wrap a bare expression so its value is returned.
///
/// A unit is a bare expression when it does not end in `;` or `}`.
pub fn wrap_expression(unit: &str) -> String {
    if unit.ends_with(';') || unit.ends_with('}') {
        unit.to_string()
    } else {
        format!("return ({});", unit)
    }
}

/// Terminal Session
pub struct Session<E: Evaluator> {
    evaluator: E,
    state: SharedState,
    buffer: StatementBuffer,
    config: SessionConfig,
    phase: Phase,
}

impl<E: Evaluator> Session<E> {
    /// Create a session around an evaluator
    pub fn new(
        evaluator: E,
        config: SessionConfig,
    ) -> Self {
        let mut session = Self {
            evaluator,
            state: Rc::new(RefCell::new(SessionState::default())),
            buffer: StatementBuffer::new(),
            config,
            phase: Phase::PromptSingle,
        };
        session.refresh_symbols();
        session
    }

    /// Handle on the shared state, for the completer
    pub fn state(&self) -> SharedState {
        Rc::clone(&self.state)
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Prompt for the current phase
    pub fn prompt(&self) -> &str {
        match self.phase {
            Phase::PromptContinuation => &self.config.continuation_prompt,
            _ => &self.config.prompt,
        }
    }

    /// Stop the loop; no further units run
    pub fn terminate(&mut self) {
        self.buffer.clear();
        self.phase = Phase::Terminated;
    }

    /// Get the evaluator reference
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Get the evaluator mut reference
    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Run until end of input or an exit keyword
    pub fn run<L, W>(
        &mut self,
        lines: &mut L,
        out: &mut W,
    ) -> TerminalResult<()>
    where
        L: LineSource + ?Sized,
        W: Write,
    {
        while self.phase != Phase::Terminated {
            let prompt = self.prompt().to_string();
            match lines.read(&prompt)? {
                Input::Eof => {
                    writeln!(out)?;
                    self.phase = Phase::Terminated;
                }
                Input::Interrupted => {
                    self.buffer.clear();
                    self.phase = Phase::PromptSingle;
                }
                Input::Line(line) => {
                    if !line.trim().is_empty() {
                        lines.add_history(&line);
                    }
                    self.submit(&line, out)?;
                }
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Feed one raw line through the loop; returns the phase afterwards
    pub fn submit<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> TerminalResult<Phase> {
        let trimmed = line.trim();
        if self.config.exit_keywords.iter().any(|k| k == trimmed) {
            self.buffer.clear();
            self.phase = Phase::Terminated;
            return Ok(self.phase);
        }

        match self.buffer.feed(line) {
            Feed::Incomplete => self.phase = Phase::PromptContinuation,
            Feed::Blank => {}
            Feed::Complete(unit) => self.dispatch(&unit, out)?,
        }
        Ok(self.phase)
    }

    /// Route a closed unit: absorb imports, or resolve, track and execute
    fn dispatch<W: Write>(
        &mut self,
        unit: &str,
        out: &mut W,
    ) -> TerminalResult<()> {
        if self.observe_aliases(unit) {
            debug!("unit absorbed by alias table");
            self.phase = Phase::PromptSingle;
            return Ok(());
        }
        let resolved = self.prepare(unit);

        self.phase = Phase::Executing;
        let code = wrap_expression(&resolved);
        debug!("executing unit ({} bytes)", code.len());

        match self.execute(&code) {
            Ok(evaluation) => self.display(&evaluation, out)?,
            Err(e) => {
                self.report(&e, out)?;
                if e.is_fatal() {
                    self.phase = Phase::Terminated;
                    return Ok(());
                }
            }
        }

        self.phase = Phase::PromptSingle;
        Ok(())
    }

    /// Evaluate `code` against the context and capture the new bindings.
    ///
    /// On failure the context is left exactly as it was.
    pub fn execute(
        &mut self,
        code: &str,
    ) -> Result<Evaluation, EvalError> {
        let evaluation = {
            let state = self.state.borrow();
            self.evaluator.evaluate(code, state.context.bindings())?
        };

        {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            state.context.capture(evaluation.bindings.clone());
            state.registry.rebuild(&state.context);
            debug!(
                "captured {} bindings, {} objects",
                state.context.len(),
                state.registry.len()
            );
        }

        self.refresh_symbols();
        Ok(evaluation)
    }

    /// Pull callable and type names from the evaluator
    pub fn refresh_symbols(&mut self) {
        match self.evaluator.symbols() {
            Ok(symbols) => self.state.borrow_mut().symbols = symbols,
            Err(e) => warn!("could not list symbols: {}", e),
        }
    }

    /// Record a unit's imports; true when the unit held nothing else
    pub fn observe_aliases(
        &mut self,
        unit: &str,
    ) -> bool {
        self.state.borrow_mut().aliases.observe(unit)
    }

    /// Resolve aliases in `unit` and feed it to the binding tracker
    pub fn prepare(
        &mut self,
        unit: &str,
    ) -> String {
        let mut state = self.state.borrow_mut();
        let resolved = state.aliases.resolve(unit);
        state.tracker.track(&resolved);
        resolved
    }

    fn display<W: Write>(
        &self,
        evaluation: &Evaluation,
        out: &mut W,
    ) -> TerminalResult<()> {
        if !evaluation.output.is_empty() {
            out.write_all(evaluation.output.as_bytes())?;
            if !evaluation.output.ends_with('\n') {
                writeln!(out)?;
            }
        }
        if let Some(value) = evaluation.result.as_ref().filter(|v| !v.is_null()) {
            writeln!(out, "{}", value)?;
        }
        Ok(())
    }

    /// Print a recovered evaluation failure
    pub fn report<W: Write>(
        &self,
        error: &EvalError,
        out: &mut W,
    ) -> TerminalResult<()> {
        if let EvalError::Disconnected { output } = error {
            if !output.is_empty() {
                out.write_all(output.as_bytes())?;
                if !output.ends_with('\n') {
                    writeln!(out)?;
                }
            }
        }
        let message = error.report();
        if self.config.colors {
            writeln!(out, "{}", message.red())?;
        } else {
            writeln!(out, "{}", message)?;
        }
        Ok(())
    }
}
