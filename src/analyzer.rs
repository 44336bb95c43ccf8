//! Project scanning
//!
//! Walks a project through a [`FileSource`], parses every discovered file
//! and records the top-level modules it imports. The scan is sequential and
//! all-or-nothing: the first unreadable or unparsable file aborts it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::builtins::ModuleClassifier;
use crate::config::ConfigError;
use crate::imports::{ImportError, ImportExtractor};
use crate::matrix::{DependencyMatrix, MatrixOptions};
use crate::source::{DiscoveryFilter, FileSource};

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    #[error("Python parser unavailable: {0}")]
    Parser(#[from] ImportError),

    #[error("Interpreter classification failed: {0}")]
    Interpreter(String),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A discovered source file and the modules it imports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    pub path: PathBuf,
    pub imports: BTreeSet<String>,
}

impl ProjectFile {
    /// File name without its directory, as shown in reports
    pub fn base_name(&self) -> String {
        base_name(&self.path)
    }
}

/// Result of one scan pass over a project
#[derive(Debug, Clone)]
pub struct ProjectScan {
    pub root: PathBuf,
    /// Files in discovery order (sorted by full path)
    pub files: Vec<ProjectFile>,
}

impl ProjectScan {
    /// Every distinct import name across the project
    pub fn import_names(&self) -> BTreeSet<String> {
        self.files
            .iter()
            .flat_map(|f| f.imports.iter().cloned())
            .collect()
    }
}

/// Discover, read and parse every matching file under `root`
pub fn scan_project<S: FileSource + ?Sized>(
    source: &S,
    root: &Path,
    filter: &DiscoveryFilter,
) -> Result<ProjectScan, AnalyzerError> {
    let paths = source.discover(root, filter)?;
    let mut extractor = ImportExtractor::new()?;

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        debug!(path = %path.display(), "scanning");
        let content = source.read(&path)?;
        let imports = extractor
            .extract(&content)
            .map_err(|source| AnalyzerError::Parse {
                path: path.clone(),
                source,
            })?;
        files.push(ProjectFile { path, imports });
    }

    info!(
        root = %root.display(),
        files = files.len(),
        "scan complete"
    );

    Ok(ProjectScan {
        root: root.to_path_buf(),
        files,
    })
}

/// Scan a project and build its dependency matrix in one call
pub fn build_dependency_matrix<S, C>(
    source: &S,
    root: &Path,
    filter: &DiscoveryFilter,
    options: &MatrixOptions,
    classifier: &C,
) -> Result<DependencyMatrix, AnalyzerError>
where
    S: FileSource + ?Sized,
    C: ModuleClassifier + ?Sized,
{
    let scan = scan_project(source, root, filter)?;
    Ok(DependencyMatrix::build(&scan, options, classifier))
}

/// Final path component, or the whole path when there is none
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
