//! PHP Evaluator Host
//!
//! Runs a long-lived `php` child process executing the embedded driver script
//! and talks to it over the line protocol in [`protocol`].
//!
//! Values stay inside the child; the terminal only holds handles plus a
//! printable snapshot. A failed evaluation leaves the child's value store
//! untouched, so the handles in the session context remain valid.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::{debug, info};

use crate::terminal::error::{EvalError, TerminalError, TerminalResult};
use crate::terminal::evaluator::{Bindings, Evaluation, Evaluator, SymbolTable};

pub mod protocol;

use protocol::{decode_line, Request, Response};

/// Driver script run by the child
const DRIVER: &str = include_str!("driver.php");

/// Settings for the child process
#[derive(Debug, Clone)]
pub struct PhpOptions {
    /// Binary to execute
    pub binary: String,
    /// Extra `-d` settings
    pub ini: Vec<String>,
}

impl Default for PhpOptions {
    fn default() -> Self {
        Self {
            binary: "php".to_string(),
            ini: Vec::new(),
        }
    }
}

/// Driver source without its opening tag, as `php -r` expects it
fn driver_source() -> &'static str {
    let source = DRIVER.trim_start();
    source.strip_prefix("<?php").unwrap_or(source)
}

/// PHP Evaluator
pub struct PhpEvaluator {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    version: String,
    generation: u64,
    symbols: Option<SymbolTable>,
}

impl PhpEvaluator {
    /// Spawn the child, load `bootstrap` and export `env` into it
    pub fn spawn(
        options: &PhpOptions,
        bootstrap: Option<&Path>,
        env: &BTreeMap<String, String>,
    ) -> TerminalResult<Self> {
        let unavailable = |reason: String| TerminalError::EvaluatorUnavailable {
            binary: options.binary.clone(),
            reason,
        };

        let mut command = Command::new(&options.binary);
        command.arg("-d").arg("display_errors=stderr");
        for setting in &options.ini {
            command.arg("-d").arg(setting);
        }
        command
            .arg("-r")
            .arg(driver_source())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(|e| unavailable(e.to_string()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| unavailable("stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| unavailable("stdout not captured".to_string()))?;
        debug!("spawned {} (pid {})", options.binary, child.id());

        let mut evaluator = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            version: String::new(),
            generation: 0,
            symbols: None,
        };

        let bootstrap = bootstrap.map(|p| p.to_string_lossy().into_owned());
        let init = Request::Init {
            bootstrap: bootstrap.as_deref(),
            env,
        };
        match evaluator.exchange(&init) {
            Ok((Response::Ready { version, generation }, _)) => {
                info!("evaluator ready (PHP {})", version);
                evaluator.version = version;
                evaluator.generation = generation;
                Ok(evaluator)
            }
            Ok((Response::Error { error, .. }, _)) => {
                Err(unavailable(EvalError::from(error).report()))
            }
            Ok((other, _)) => Err(TerminalError::Protocol(format!(
                "unexpected reply to init: {:?}",
                other
            ))),
            Err(EvalError::Disconnected { .. }) => {
                Err(unavailable("process exited during startup".to_string()))
            }
            Err(e) => Err(TerminalError::Protocol(e.to_string())),
        }
    }

    /// Host language version reported at startup
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Send one request and wait for its frame.
    ///
    /// Everything read before the marker is returned as stray output, minus
    /// the separator newline the host writes ahead of each frame.
    fn exchange(
        &mut self,
        request: &Request<'_>,
    ) -> Result<(Response, String), EvalError> {
        let line = request.encode()?;
        if let Err(e) = self
            .stdin
            .write_all(line.as_bytes())
            .and_then(|_| self.stdin.flush())
        {
            debug!("write to evaluator failed: {}", e);
            return Err(EvalError::Disconnected {
                output: String::new(),
            });
        }

        let mut stray = String::new();
        loop {
            let mut buf = String::new();
            if self.stdout.read_line(&mut buf)? == 0 {
                debug!("evaluator closed its output");
                return Err(EvalError::Disconnected { output: stray });
            }
            match decode_line(&buf) {
                Some((before, frame)) => {
                    stray.push_str(before);
                    if stray.ends_with('\n') {
                        stray.pop();
                    }
                    if !stray.is_empty() {
                        debug!("{} bytes of output outside a frame", stray.len());
                    }
                    return frame.map(|response| (response, stray));
                }
                None => stray.push_str(&buf),
            }
        }
    }
}

impl Evaluator for PhpEvaluator {
    fn evaluate(
        &mut self,
        code: &str,
        bindings: &Bindings,
    ) -> Result<Evaluation, EvalError> {
        let request = Request::eval(code, bindings);
        match self.exchange(&request)? {
            (
                Response::Ok {
                    result,
                    bindings,
                    output,
                    generation,
                },
                stray,
            ) => {
                if generation != self.generation {
                    self.generation = generation;
                    self.symbols = None;
                }
                Ok(Evaluation {
                    result,
                    bindings,
                    output: stray + &output,
                })
            }
            (Response::Error { error, .. }, _) => Err(error.into()),
            (other, _) => Err(EvalError::Protocol(format!(
                "unexpected reply to eval: {:?}",
                other
            ))),
        }
    }

    fn symbols(&mut self) -> Result<SymbolTable, EvalError> {
        if let Some(symbols) = &self.symbols {
            return Ok(symbols.clone());
        }
        match self.exchange(&Request::Symbols)? {
            (Response::Symbols { functions, classes }, _) => {
                debug!(
                    "symbols refreshed: {} functions, {} classes",
                    functions.len(),
                    classes.len()
                );
                let symbols = SymbolTable { functions, classes };
                self.symbols = Some(symbols.clone());
                Ok(symbols)
            }
            (other, _) => Err(EvalError::Protocol(format!(
                "unexpected reply to symbols: {:?}",
                other
            ))),
        }
    }
}

impl Drop for PhpEvaluator {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
