//! Line Sources
//!
//! Where the terminal reads its input from: an interactive rustyline editor
//! with completion, or any buffered reader (pipes, tests).

use std::collections::VecDeque;
use std::io::{self, BufRead};

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, EditMode, Editor};
use tracing::debug;

use crate::terminal::error::{TerminalError, TerminalResult};
use crate::terminal::session::SharedState;

mod completer;
pub use completer::{word_start, TerminalHelper};

/// One read from a line source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text, without its terminator
    Line(String),
    /// The user interrupted the current entry (Ctrl-C)
    Interrupted,
    /// No more input (Ctrl-D, closed pipe)
    Eof,
}

/// Line Source
pub trait LineSource {
    /// Show `prompt` and wait for one line
    fn read(
        &mut self,
        prompt: &str,
    ) -> TerminalResult<Input>;

    /// Remember a line for later recall
    fn add_history(
        &mut self,
        line: &str,
    );

    /// Lines remembered so far, oldest first
    fn history(&self) -> Vec<String>;
}

/// Line source options
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Enable VI mode
    pub vi_mode: bool,
    /// Maximum history size
    pub history_size: usize,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            vi_mode: false,
            history_size: 1000,
        }
    }
}

/// Interactive source backed by rustyline, completing from the session
pub struct RustylineSource {
    editor: Editor<TerminalHelper, DefaultHistory>,
}

impl RustylineSource {
    /// Create an editor wired to the given session state
    pub fn new(
        state: SharedState,
        config: &LineConfig,
    ) -> TerminalResult<Self> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(false)
            .completion_type(CompletionType::List)
            .edit_mode(if config.vi_mode {
                EditMode::Vi
            } else {
                EditMode::Emacs
            })
            .max_history_size(config.history_size)
            .map_err(|e| TerminalError::CompletionCapabilityMissing(e.to_string()))?
            .build();

        let mut editor = Editor::with_config(rl_config)
            .map_err(|e| TerminalError::CompletionCapabilityMissing(e.to_string()))?;
        editor.set_helper(Some(TerminalHelper::new(state)));

        Ok(Self { editor })
    }
}

impl LineSource for RustylineSource {
    fn read(
        &mut self,
        prompt: &str,
    ) -> TerminalResult<Input> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(ReadlineError::Io(e)) => Err(TerminalError::Io(e)),
            Err(e) => Err(TerminalError::Io(io::Error::other(e.to_string()))),
        }
    }

    fn add_history(
        &mut self,
        line: &str,
    ) {
        if let Err(e) = self.editor.add_history_entry(line) {
            debug!("history entry rejected: {}", e);
        }
    }

    fn history(&self) -> Vec<String> {
        self.editor.history().iter().cloned().collect()
    }
}

/// Non-interactive source reading from any `BufRead`
#[derive(Debug)]
pub struct BufReadSource<R> {
    reader: R,
    history: VecDeque<String>,
    history_size: usize,
}

impl<R: BufRead> BufReadSource<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            history: VecDeque::new(),
            history_size: LineConfig::default().history_size,
        }
    }
}

impl BufReadSource<io::Cursor<String>> {
    /// Source that yields the given text line by line
    pub fn from_text(text: &str) -> Self {
        Self::new(io::Cursor::new(text.to_string()))
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read(
        &mut self,
        _prompt: &str,
    ) -> TerminalResult<Input> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Input::Eof);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Input::Line(line))
    }

    fn add_history(
        &mut self,
        line: &str,
    ) {
        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(line.to_string());
    }

    fn history(&self) -> Vec<String> {
        self.history.iter().cloned().collect()
    }
}
