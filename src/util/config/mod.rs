//! scriptify configuration
//!
//! User-level configuration read from a TOML file. Every field has a default,
//! so a missing file, section or key is never an error.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. User-level (~/.config/scriptify/config.toml)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use scriptify::util::config::{load_user_config, UserConfig};
//!
//! let config = load_user_config().unwrap_or_default();
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::terminal::line::LineConfig;
use crate::terminal::php::PhpOptions;
use crate::terminal::session::SessionConfig;

/// User-level configuration for scriptify
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Terminal settings
    #[serde(default)]
    pub terminal: TerminalConfig,
    /// Evaluator host settings
    #[serde(default)]
    pub php: PhpConfig,
    /// Startup environment settings
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// Terminal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Prompt for a fresh unit
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Prompt while a unit is still open
    #[serde(default = "default_continuation_prompt")]
    pub continuation_prompt: String,
    /// Lines that end the session
    #[serde(default = "default_exit_keywords")]
    pub exit_keywords: Vec<String>,
    /// History size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Enable VI mode
    #[serde(default)]
    pub vi_mode: bool,
    /// Colour error output
    #[serde(default = "default_colors")]
    pub colors: bool,
    /// File replayed before the first prompt
    #[serde(default)]
    pub preload: Option<PathBuf>,
}

fn default_prompt() -> String {
    "php> ".to_string()
}

fn default_continuation_prompt() -> String {
    "php* ".to_string()
}

fn default_exit_keywords() -> Vec<String> {
    vec!["exit".to_string(), "quit".to_string()]
}

fn default_history_size() -> usize {
    1000
}

fn default_colors() -> bool {
    true
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            continuation_prompt: default_continuation_prompt(),
            exit_keywords: default_exit_keywords(),
            history_size: default_history_size(),
            vi_mode: false,
            colors: true,
            preload: None,
        }
    }
}

impl TerminalConfig {
    /// Settings for the session loop
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            prompt: self.prompt.clone(),
            continuation_prompt: self.continuation_prompt.clone(),
            exit_keywords: self.exit_keywords.clone(),
            colors: self.colors,
        }
    }

    /// Settings for the line editor
    pub fn line_config(&self) -> LineConfig {
        LineConfig {
            vi_mode: self.vi_mode,
            history_size: self.history_size,
        }
    }
}

/// Evaluator host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhpConfig {
    /// PHP binary
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Extra `-d` settings, e.g. `memory_limit=512M`
    #[serde(default)]
    pub ini: Vec<String>,
}

fn default_binary() -> String {
    "php".to_string()
}

impl Default for PhpConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            ini: Vec::new(),
        }
    }
}

impl PhpConfig {
    /// Options for spawning the host
    pub fn options(&self) -> PhpOptions {
        PhpOptions {
            binary: self.binary.clone(),
            ini: self.ini.clone(),
        }
    }
}

/// Startup environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Directory holding `<service>.env` files
    #[serde(default = "default_env_dir")]
    pub env_dir: PathBuf,
    /// Extra bootstrap locations, probed after the defaults
    #[serde(default)]
    pub bootstrap_paths: Vec<PathBuf>,
}

fn default_env_dir() -> PathBuf {
    PathBuf::from("/etc/scriptify")
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            env_dir: default_env_dir(),
            bootstrap_paths: Vec::new(),
        }
    }
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("scriptify"));
    }

    // Fallback to ~/.config/scriptify
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("scriptify"));
    }

    None
}

/// Get the user config file path (~/.config/scriptify/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load configuration from an explicit path
pub fn load_config_from(path: &Path) -> Result<UserConfig, ConfigError> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}
