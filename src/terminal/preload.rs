//! Preload Processor
//!
//! Replays a source file through the session before the first prompt. Units
//! are closed on bracket balance alone and are never wrapped as expressions.
//! A failing unit is reported and skipped; the rest of the file still runs
//! and sees every binding made before the failure.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use super::buffer::{Feed, StatementBuffer};
use super::error::{TerminalError, TerminalResult};
use super::evaluator::Evaluator;
use super::session::{Phase, Session};

/// Outcome of a preload run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Units that executed successfully
    pub executed: usize,
    /// Units that raised and were skipped
    pub failed: usize,
    /// Import-only units absorbed by the alias table
    pub imports: usize,
}

impl PreloadReport {
    /// True when every unit ran
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Strip an optional leading `<?php` (or `<?`) and trailing `?>`
pub fn strip_delimiters(source: &str) -> &str {
    let mut text = source.trim();
    if let Some(rest) = text.strip_prefix("<?php") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("<?") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("?>") {
        text = rest;
    }
    text
}

/// Preload Processor
pub struct Preloader<'a, E: Evaluator> {
    session: &'a mut Session<E>,
    buffer: StatementBuffer,
    report: PreloadReport,
}

impl<'a, E: Evaluator> Preloader<'a, E> {
    /// Create a preloader that executes into `session`
    pub fn new(session: &'a mut Session<E>) -> Self {
        Self {
            session,
            buffer: StatementBuffer::brackets_only(),
            report: PreloadReport::default(),
        }
    }

    /// Read and replay `path`. Only a missing or unreadable file is an error.
    pub fn run<W: Write>(
        self,
        path: &Path,
        out: &mut W,
    ) -> TerminalResult<PreloadReport> {
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TerminalError::PreloadFileMissing(path.to_path_buf()),
            _ => TerminalError::PreloadFileUnreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        info!("preloading {}", path.display());

        self.run_source(&source, out)
    }

    /// Replay already-loaded source text
    pub fn run_source<W: Write>(
        mut self,
        source: &str,
        out: &mut W,
    ) -> TerminalResult<PreloadReport> {
        for line in strip_delimiters(source).lines() {
            if let Feed::Complete(unit) = self.buffer.feed(line) {
                self.dispatch(&unit, out)?;
                if self.session.phase() == Phase::Terminated {
                    return Ok(self.report);
                }
            }
        }
        if let Some(rest) = self.buffer.take_remainder() {
            debug!("preload file ended with an open unit");
            self.dispatch(&rest, out)?;
        }

        debug!(
            "preload finished: {} executed, {} failed, {} imports",
            self.report.executed, self.report.failed, self.report.imports
        );
        Ok(self.report)
    }

    fn dispatch<W: Write>(
        &mut self,
        unit: &str,
        out: &mut W,
    ) -> TerminalResult<()> {
        if self.session.observe_aliases(unit) {
            self.report.imports += 1;
            return Ok(());
        }

        let code = self.session.prepare(unit);
        match self.session.execute(&code) {
            Ok(evaluation) => {
                self.report.executed += 1;
                if !evaluation.output.is_empty() {
                    out.write_all(evaluation.output.as_bytes())?;
                    if !evaluation.output.ends_with('\n') {
                        writeln!(out)?;
                    }
                }
            }
            Err(e) => {
                self.report.failed += 1;
                warn!("preload statement failed: {}", e);
                self.session.report(&e, out)?;
                if e.is_fatal() {
                    self.session.terminate();
                }
            }
        }
        Ok(())
    }
}
