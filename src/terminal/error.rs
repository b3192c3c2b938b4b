//! Terminal error types
//!
//! `TerminalError` covers startup and plumbing failures; the fatal ones end the
//! process with exit code 1. `EvalError` is what a single evaluation can raise
//! and is always recovered by the session loop.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while starting or driving the terminal.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// No bootstrap (autoload) file could be located
    #[error("Could not find autoload file. Set SCRIPTIFY_BOOTLOADER or ensure vendor/autoload.php exists.")]
    BootstrapNotFound,

    /// Interactive line editing could not be initialised
    #[error("Line editing is not available, cannot start interactive terminal: {0}")]
    CompletionCapabilityMissing(String),

    /// The evaluator host process could not be started
    #[error("Evaluator '{binary}' is not available: {reason}")]
    EvaluatorUnavailable { binary: String, reason: String },

    /// Preload file does not exist
    #[error("Preload file not found: {0}")]
    PreloadFileMissing(PathBuf),

    /// Preload file exists but cannot be read
    #[error("Preload file could not be read: {path}: {source}")]
    PreloadFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The evaluator host answered with something unexpected during startup
    #[error("Evaluator protocol error: {0}")]
    Protocol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a single evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Source text did not parse
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<u32> },

    /// Evaluation threw
    #[error("{kind}: {message}")]
    Runtime {
        kind: String,
        message: String,
        file: Option<String>,
        line: Option<u32>,
    },

    /// The evaluator host went away; nothing further can run
    #[error("Evaluator process exited")]
    Disconnected { output: String },

    /// Malformed exchange with the evaluator host
    #[error("Evaluator protocol error: {0}")]
    Protocol(String),

    /// IO error while talking to the evaluator host
    #[error("IO error: {0}")]
    Io(String),
}

impl EvalError {
    /// Render the error the way the terminal shows it to the user.
    ///
    /// Runtime failures carry their source location on a second line when the
    /// evaluator reported one.
    pub fn report(&self) -> String {
        match self {
            EvalError::Runtime {
                file: Some(file),
                line: Some(line),
                ..
            } => format!("{}\n  in {} on line {}", self, file, line),
            _ => self.to_string(),
        }
    }

    /// Whether the evaluator can still be used after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvalError::Disconnected { .. })
    }
}

impl From<std::io::Error> for EvalError {
    fn from(e: std::io::Error) -> Self {
        EvalError::Io(e.to_string())
    }
}

/// Result type for terminal operations
pub type TerminalResult<T> = Result<T, TerminalError>;
