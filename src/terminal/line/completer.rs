//! Terminal Completer
//!
//! Bridges rustyline's completion hook to the `CompletionEngine`.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::terminal::completion::{is_word_char, CompletionEngine};
use crate::terminal::session::SharedState;

/// rustyline helper backed by the live session state
pub struct TerminalHelper {
    engine: CompletionEngine,
    state: SharedState,
}

impl TerminalHelper {
    /// Create a helper reading from `state`
    pub fn new(state: SharedState) -> Self {
        Self {
            engine: CompletionEngine::new(),
            state,
        }
    }
}

/// Start of the identifier run that ends at `pos`
pub fn word_start(
    line: &str,
    pos: usize,
) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(pos)
}

impl Completer for TerminalHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let start = word_start(line, pos);
        let partial = &line[start..pos];

        let state = self.state.borrow();
        let candidates = self
            .engine
            .complete(&state, line, pos, partial)
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();

        Ok((start, candidates))
    }
}

impl Hinter for TerminalHelper {
    type Hint = String;
}

impl Highlighter for TerminalHelper {}

impl Validator for TerminalHelper {}

impl Helper for TerminalHelper {}
