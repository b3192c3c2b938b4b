//! Startup environment
//!
//! Everything the terminal resolves before the first prompt: service
//! environment files, `--env` overrides, the bootstrap file and the preload
//! file.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use tracing::{debug, info, warn};

use super::error::{TerminalError, TerminalResult};

/// Variable naming an explicit bootstrap file
pub const BOOTLOADER_VAR: &str = "SCRIPTIFY_BOOTLOADER";

/// Preload file picked up from the working directory
pub const DEFAULT_PRELOAD_FILE: &str = ".scriptify-preload.php";

/// Parse `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is dropped
/// and matching surrounding quotes are removed from the value. Lines without
/// `=` are ignored.
pub fn parse_env_file(text: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        vars.insert(key.trim().to_string(), unquote(value.trim()).to_string());
    }
    vars
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Path of a service's environment file
pub fn service_env_path(
    env_dir: &Path,
    service: &str,
) -> PathBuf {
    env_dir.join(format!("{}.env", service))
}

/// Load a service's environment file; a missing file yields nothing
pub fn load_service_env(
    env_dir: &Path,
    service: &str,
) -> TerminalResult<BTreeMap<String, String>> {
    let path = service_env_path(env_dir, service);
    match fs::read_to_string(&path) {
        Ok(text) => {
            info!("loading environment from {}", path.display());
            Ok(parse_env_file(&text))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("service environment file not found: {}", path.display());
            Ok(BTreeMap::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse one `--env` argument
pub fn parse_env_pair(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}

/// Apply overrides on top of `base`, later entries winning
pub fn merge_env(
    mut base: BTreeMap<String, String>,
    overrides: &[(String, String)],
) -> BTreeMap<String, String> {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Where to look for the bootstrap file
#[derive(Debug, Clone, Default)]
pub struct BootstrapProbe {
    /// Value of the bootloader variable, if set
    pub explicit: Option<PathBuf>,
    /// Working directory
    pub cwd: PathBuf,
    /// Directory holding the running executable
    pub exe_dir: Option<PathBuf>,
    /// Extra configured locations, probed last
    pub extra: Vec<PathBuf>,
}

impl BootstrapProbe {
    /// Probe built from the current process
    pub fn from_process(extra: Vec<PathBuf>) -> TerminalResult<Self> {
        let explicit = env::var_os(BOOTLOADER_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Ok(Self {
            explicit,
            cwd: env::current_dir()?,
            exe_dir,
            extra,
        })
    }

    /// Candidate paths in probe order
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(explicit) = &self.explicit {
            candidates.push(explicit.clone());
        }
        candidates.push(self.cwd.join("vendor").join("autoload.php"));
        if let Some(exe_dir) = &self.exe_dir {
            candidates.push(exe_dir.join("..").join("vendor").join("autoload.php"));
        }
        candidates.extend(self.extra.iter().cloned());
        candidates
    }

    /// First existing candidate, canonicalized
    pub fn discover(&self) -> TerminalResult<PathBuf> {
        for candidate in self.candidates() {
            if candidate.is_file() {
                debug!("bootstrap found at {}", candidate.display());
                return Ok(fs::canonicalize(&candidate)?);
            }
            debug!("no bootstrap at {}", candidate.display());
        }
        Err(TerminalError::BootstrapNotFound)
    }
}

/// Choose the preload file: the CLI path, then the configured path, then the
/// default file in `cwd` when it exists.
pub fn discover_preload(
    cli: Option<&Path>,
    configured: Option<&Path>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = cli.or(configured) {
        return Some(path.to_path_buf());
    }
    let default = cwd.join(DEFAULT_PRELOAD_FILE);
    default.is_file().then_some(default)
}

/// Print the startup banner
pub fn write_banner<W: Write>(
    out: &mut W,
    bootstrap: &Path,
    env_count: usize,
    colors: bool,
) -> TerminalResult<()> {
    let title = "Scriptify Interactive Terminal";
    let mut details = vec![format!("Autoloader: {}", bootstrap.display())];
    if env_count > 0 {
        details.push(format!("Environment variables loaded: {}", env_count));
    }
    details.push("Type 'exit' or press Ctrl+D to quit".to_string());

    if colors {
        writeln!(out, "{}", title.green().bold())?;
        for line in &details {
            writeln!(out, "{}", line.yellow())?;
        }
    } else {
        writeln!(out, "{}", title)?;
        for line in &details {
            writeln!(out, "{}", line)?;
        }
    }
    writeln!(out)?;
    Ok(())
}
