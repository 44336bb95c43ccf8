//! Configuration file support for depmatrix
//!
//! This module handles parsing `.depmatrix.toml` configuration files that
//! tune which files are scanned and how imports are classified.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .depmatrix.toml
//!
//! [analysis]
//! # File extensions to scan (without the dot)
//! extensions = ["py"]
//!
//! # Paths to exclude, relative to the project root
//! exclude = ["build/*", "docs/conf.py"]
//!
//! # Ignore imports of built-in modules when matching
//! skip_builtins = true
//!
//! [builtins]
//! # Extra names treated as built-in
//! extra = ["numpy"]
//!
//! # Standard-library names that should still be matched
//! exclude = ["typing"]
//!
//! # Classify with a real interpreter instead of the allowlist
//! python = "python3"
//! ```

use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::builtins::BuiltinModules;
use crate::matrix::MatrixOptions;
use crate::source::DiscoveryFilter;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    PatternError(String),
}

/// Analysis configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// File extensions to scan
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Paths to exclude from the scan
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Skip built-in imports when matching
    #[serde(default = "default_skip_builtins")]
    pub skip_builtins: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_skip_builtins() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
            skip_builtins: default_skip_builtins(),
        }
    }
}

/// Built-in classification section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuiltinsConfig {
    /// Names treated as built-in in addition to the standard library
    #[serde(default)]
    pub extra: Vec<String>,

    /// Standard-library names that should not be treated as built-in
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Interpreter to ask instead of using the allowlist
    #[serde(default)]
    pub python: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DepMatrixConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub builtins: BuiltinsConfig,
}

/// Configuration with glob patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub extensions: Vec<String>,
    exclude_patterns: Vec<Pattern>,
    pub skip_builtins: bool,
    pub extra_builtins: Vec<String>,
    pub excluded_builtins: Vec<String>,
    pub python: Option<String>,
    /// Where the configuration was loaded from, if anywhere
    pub source: Option<PathBuf>,
    /// Found by searching above the project directory rather than in it
    pub inherited: bool,
}

impl CompiledConfig {
    /// Create a compiled config from raw config
    pub fn from_config(config: DepMatrixConfig) -> Result<Self, ConfigError> {
        let exclude_patterns = config
            .analysis
            .exclude
            .iter()
            .map(|p| Pattern::new(p).map_err(|e| ConfigError::PatternError(format!("{}: {}", p, e))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            extensions: normalize_extensions(config.analysis.extensions),
            exclude_patterns,
            skip_builtins: config.analysis.skip_builtins,
            extra_builtins: config.builtins.extra,
            excluded_builtins: config.builtins.exclude,
            python: config.builtins.python,
            source: None,
            inherited: false,
        })
    }

    /// Create the default config (no file)
    pub fn empty() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_patterns: Vec::new(),
            skip_builtins: true,
            extra_builtins: Vec::new(),
            excluded_builtins: Vec::new(),
            python: None,
            source: None,
            inherited: false,
        }
    }

    pub fn discovery_filter(&self) -> DiscoveryFilter {
        DiscoveryFilter::new(self.extensions.clone(), self.exclude_patterns.clone())
    }

    pub fn matrix_options(&self) -> MatrixOptions {
        MatrixOptions {
            skip_builtins: self.skip_builtins,
        }
    }

    /// The allowlist classifier with this config's adjustments applied
    pub fn builtin_modules(&self) -> BuiltinModules {
        BuiltinModules::stdlib()
            .with_extra(self.extra_builtins.iter().cloned())
            .without(&self.excluded_builtins)
    }
}

/// Strip leading dots so both `py` and `.py` are accepted
fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Load configuration for a project directory
///
/// Searches for `.depmatrix.toml` in the given directory and parent directories.
pub fn load_config(project_path: &Path) -> Result<(DepMatrixConfig, Option<PathBuf>), ConfigError> {
    match find_config_file(project_path) {
        Some(path) => {
            let config = read_config_file(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((DepMatrixConfig::default(), None)),
    }
}

/// Parse one configuration file
pub fn read_config_file(path: &Path) -> Result<DepMatrixConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Find the config file by searching up the directory tree
fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".depmatrix.toml", "depmatrix.toml"];

    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

/// Load and compile configuration
///
/// An explicit config file path is read directly; otherwise the project path
/// and its ancestors are searched.
pub fn load_compiled_config(
    project_path: &Path,
    explicit: Option<&Path>,
) -> Result<CompiledConfig, ConfigError> {
    let (config, source) = match explicit {
        Some(path) => (read_config_file(path)?, Some(path.to_path_buf())),
        None => load_config(project_path)?,
    };
    let mut compiled = CompiledConfig::from_config(config)?;
    compiled.inherited = explicit.is_none()
        && source
            .as_deref()
            .and_then(Path::parent)
            .is_some_and(|dir| dir != project_path);
    compiled.source = source;
    Ok(compiled)
}
