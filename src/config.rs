//! JSON description of a command line: its options, positional slots and overflow mode.

use crate::registry::OptionKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("option name must not be empty")]
    EmptyName,

    #[error("invalid option name '{0}': must not contain whitespace")]
    InvalidName(String),

    #[error("invalid option name '{0}': must not start with '-' or '/'")]
    PrefixedName(String),

    #[error("duplicate option name: {0}")]
    DuplicateName(String),

    #[error("duplicate positional name: {0}")]
    DuplicatePositional(String),
}

/// Configuration for a single option and its aliases.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionConfig {
    /// Primary name, matched after the `-` or `/` prefix
    pub name: String,
    /// The kind of value the option produces
    pub kind: OptionKind,
    /// Further names writing the same value
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl OptionConfig {
    /// The primary name followed by the aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Program name used as `argv[0]` when none is supplied
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionConfig>,
    /// Positional slot names, in binding order
    #[serde(default)]
    pub positionals: Vec<String>,
    /// Capture positional tokens beyond the slots
    #[serde(default)]
    pub overflow: bool,
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for option in &self.options {
            for name in option.names() {
                validate_name(name)?;
                if !names.insert(name) {
                    return Err(ConfigError::DuplicateName(name.to_string()));
                }
            }
        }

        let mut positionals = HashSet::new();
        for name in &self.positionals {
            if !positionals.insert(name) {
                return Err(ConfigError::DuplicatePositional(name.clone()));
            }
        }

        Ok(())
    }

    /// Get the effective program name, using the default if none is set.
    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or("app")
    }
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::EmptyName);
    }
    if name.starts_with(|c| c == '-' || c == '/') {
        return Err(ConfigError::PrefixedName(name.to_string()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    Ok(())
}
