//! File sources
//!
//! The matrix builder never touches the filesystem directly: it asks a
//! [`FileSource`] to discover candidate files and to read them. [`FsSource`]
//! walks a real directory tree, [`MemorySource`] serves in-memory fixtures.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::analyzer::AnalyzerError;

/// Which files a scan should pick up
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    /// Extensions without the leading dot
    pub extensions: Vec<String>,
    /// Globs matched against the path relative to the scan root
    pub exclude: Vec<Pattern>,
}

impl DiscoveryFilter {
    pub fn new(extensions: Vec<String>, exclude: Vec<Pattern>) -> Self {
        Self {
            extensions,
            exclude,
        }
    }

    /// Check whether a path (relative to the scan root) passes the filter
    pub fn accepts(&self, relative: &Path) -> bool {
        let has_extension = relative
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));

        has_extension && !self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

impl Default for DiscoveryFilter {
    fn default() -> Self {
        Self::new(vec!["py".to_string()], Vec::new())
    }
}

/// Source of project files for a scan
pub trait FileSource {
    /// List every file under `root` accepted by `filter`, sorted by path
    fn discover(&self, root: &Path, filter: &DiscoveryFilter) -> Result<Vec<PathBuf>, AnalyzerError>;

    /// Read the full text of one discovered file
    fn read(&self, path: &Path) -> Result<String, AnalyzerError>;
}

/// Real filesystem access
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl FileSource for FsSource {
    fn discover(&self, root: &Path, filter: &DiscoveryFilter) -> Result<Vec<PathBuf>, AnalyzerError> {
        if !root.is_dir() {
            return Err(AnalyzerError::InvalidPath(root.display().to_string()));
        }

        // Directory symlinks are listed but not descended into, so a link
        // back to an ancestor cannot loop. Unreadable entries are skipped.
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !is_file_entry(&entry) {
                continue;
            }

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if filter.accepts(relative) {
                files.push(entry.into_path());
            }
        }

        sort_paths(&mut files);
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String, AnalyzerError> {
        fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Regular files, plus symlinks that do not resolve to a directory.
/// A dangling `x.py` link is kept so reading it reports the failure.
fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir())
}

/// In-memory file tree, keyed by full path
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (builder style)
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileSource for MemorySource {
    fn discover(&self, root: &Path, filter: &DiscoveryFilter) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut files: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|path| {
                let relative = path.strip_prefix(root).ok()?;
                filter.accepts(relative).then(|| path.clone())
            })
            .collect();

        if files.is_empty() && !self.files.keys().any(|p| p.starts_with(root)) {
            return Err(AnalyzerError::InvalidPath(root.display().to_string()));
        }

        sort_paths(&mut files);
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String, AnalyzerError> {
        self.files.get(path).cloned().ok_or_else(|| AnalyzerError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file in memory source"),
        })
    }
}

/// Bytewise order on the full path string, so output order is stable across runs
fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
}
