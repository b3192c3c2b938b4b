//! Evaluator host wire protocol
//!
//! One JSON document per line in each direction. Requests are tagged by `op`,
//! responses by `status`. Responses carry [`FRAME_MARKER`] so they can be
//! told apart from anything else the host writes to stdout.
//!
//! The host writes a newline before every marker. That newline is not
//! output; it only keeps a frame off a line the user's code left open. The
//! marker may still be found mid-line, in which case the text before it is
//! output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::terminal::error::EvalError;
use crate::terminal::evaluator::{Bindings, Handle, Value};

/// Prefix of every response line
pub const FRAME_MARKER: &str = "@@scriptify@@ ";

/// Request sent to the host
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request<'a> {
    /// Load the bootstrap file and export the environment
    Init {
        bootstrap: Option<&'a str>,
        env: &'a BTreeMap<String, String>,
    },
    /// Evaluate a unit with the given handles in scope
    Eval {
        code: &'a str,
        bindings: BTreeMap<&'a str, Handle>,
    },
    /// List callables and types
    Symbols,
}

impl<'a> Request<'a> {
    /// Build an eval request, passing only values the host holds a handle for
    pub fn eval(
        code: &'a str,
        bindings: &'a Bindings,
    ) -> Self {
        Request::Eval {
            code,
            bindings: bindings
                .iter()
                .filter_map(|(name, value)| value.handle.map(|h| (name.as_str(), h)))
                .collect(),
        }
    }

    /// Encode as a single line, terminator included
    pub fn encode(&self) -> Result<String, EvalError> {
        let mut line =
            serde_json::to_string(self).map_err(|e| EvalError::Protocol(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }
}

/// Failure description sent by the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorFrame {
    /// Throwable class name
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl From<ErrorFrame> for EvalError {
    fn from(frame: ErrorFrame) -> Self {
        if frame.kind == "ParseError" {
            EvalError::Parse {
                message: frame.message,
                line: frame.line,
            }
        } else {
            EvalError::Runtime {
                kind: frame.kind,
                message: frame.message,
                file: frame.file,
                line: frame.line,
            }
        }
    }
}

/// Response read from the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    /// Host initialised
    Ready { version: String, generation: u64 },
    /// Evaluation succeeded
    Ok {
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        bindings: Bindings,
        #[serde(default)]
        output: String,
        generation: u64,
    },
    /// Evaluation or initialisation threw
    Error {
        error: ErrorFrame,
        #[serde(default)]
        output: String,
    },
    /// Symbol listing
    Symbols {
        #[serde(default)]
        functions: Vec<String>,
        #[serde(default)]
        classes: Vec<String>,
    },
}

/// Decode one stdout line. `None` means the line holds no frame; otherwise
/// the text before the marker is returned alongside the decoded frame.
pub fn decode_line(line: &str) -> Option<(&str, Result<Response, EvalError>)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let at = line.find(FRAME_MARKER)?;
    let payload = &line[at + FRAME_MARKER.len()..];
    let frame = serde_json::from_str(payload).map_err(|e| EvalError::Protocol(e.to_string()));
    Some((&line[..at], frame))
}
