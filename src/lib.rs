//! scriptify
//!
//! Interactive PHP terminal with the project's autoloader and a service's
//! environment preloaded.
//!
//! # Example
//!
//! ```no_run
//! use scriptify::{run_terminal, TerminalOptions};
//! use scriptify::util::config::UserConfig;
//!
//! fn main() -> scriptify::Result<()> {
//!     let options = TerminalOptions {
//!         service: Some("worker".to_string()),
//!         ..Default::default()
//!     };
//!     run_terminal(&options, &UserConfig::default())?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/scriptify")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod terminal;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

use std::collections::BTreeMap;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::terminal::launch::{
    discover_preload, load_service_env, merge_env, write_banner, BootstrapProbe,
};
use crate::terminal::{
    BufReadSource, PhpEvaluator, Preloader, RustylineSource, Session, TerminalResult,
};
use crate::util::config::UserConfig;

/// Tool version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "scriptify";

/// Options of the `terminal` command
#[derive(Debug, Clone, Default)]
pub struct TerminalOptions {
    /// Service whose environment file is loaded
    pub service: Option<String>,
    /// `--env` pairs, in command-line order
    pub env: Vec<(String, String)>,
    /// Explicit preload file
    pub preload: Option<PathBuf>,
}

/// Start the interactive terminal and run it until the user leaves.
///
/// Returns an error only for the fatal startup conditions; evaluation
/// failures are reported inside the session.
pub fn run_terminal(
    options: &TerminalOptions,
    config: &UserConfig,
) -> TerminalResult<()> {
    let file_env = match &options.service {
        Some(service) => load_service_env(&config.environment.env_dir, service)?,
        None => BTreeMap::new(),
    };
    let env = merge_env(file_env, &options.env);

    let bootstrap =
        BootstrapProbe::from_process(config.environment.bootstrap_paths.clone())?.discover()?;
    let evaluator = PhpEvaluator::spawn(&config.php.options(), Some(&bootstrap), &env)?;
    debug!("PHP {} ready", evaluator.version());

    let mut out = io::stdout();
    write_banner(&mut out, &bootstrap, env.len(), config.terminal.colors)?;

    let mut session = Session::new(evaluator, config.terminal.session_config());

    let cwd = std::env::current_dir()?;
    let preload = discover_preload(
        options.preload.as_deref(),
        config.terminal.preload.as_deref(),
        &cwd,
    );
    if let Some(path) = preload {
        let report = Preloader::new(&mut session).run(&path, &mut out)?;
        if !report.success() {
            warn!(
                "{} of {} preload statements failed",
                report.failed,
                report.failed + report.executed
            );
        }
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        let mut source = RustylineSource::new(session.state(), &config.terminal.line_config())?;
        session.run(&mut source, &mut out)
    } else {
        debug!("stdin is not a terminal, reading without line editing");
        let mut source = BufReadSource::new(stdin.lock());
        session.run(&mut source, &mut out)
    }
}
