//! Dependency matrix data structure
//!
//! A square 0/1 grid over the files of one scan. Entry `(row, col)` is 1 when
//! some import collected from the row file is a substring of the column
//! file's full path. This is a textual heuristic, not import resolution:
//! an import of `os` marks `costs.py` as a dependency too.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::analyzer::ProjectScan;
use crate::builtins::ModuleClassifier;

/// Options controlling how imports are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixOptions {
    /// Ignore imports the classifier reports as built-in
    pub skip_builtins: bool,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            skip_builtins: true,
        }
    }
}

/// Square file-to-file dependency matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyMatrix {
    files: Vec<PathBuf>,
    index: HashMap<PathBuf, usize>,
    /// Row-major, `files.len()` squared entries
    cells: Vec<u8>,
}

impl DependencyMatrix {
    /// An all-zero matrix over `files`
    pub fn new(files: Vec<PathBuf>) -> Self {
        let index = files
            .iter()
            .enumerate()
            .map(|(i, path)| (path.clone(), i))
            .collect();
        let cells = vec![0; files.len() * files.len()];
        Self {
            files,
            index,
            cells,
        }
    }

    /// Fill the matrix from a scan
    pub fn build<C: ModuleClassifier + ?Sized>(
        scan: &ProjectScan,
        options: &MatrixOptions,
        classifier: &C,
    ) -> Self {
        let mut matrix = Self::new(scan.files.iter().map(|f| f.path.clone()).collect());
        let candidates: Vec<String> = matrix
            .files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        for (row, file) in scan.files.iter().enumerate() {
            for module in &file.imports {
                if options.skip_builtins && classifier.is_builtin(module) {
                    debug!(module = %module, "skipping built-in import");
                    continue;
                }

                for (col, candidate) in candidates.iter().enumerate() {
                    if candidate.contains(module.as_str()) {
                        matrix.set(row, col, true);
                    }
                }
            }
        }

        debug!(
            files = matrix.len(),
            dependencies = matrix.dependency_count(),
            "matrix built"
        );
        matrix
    }

    /// Files on both axes, in order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.index.get(path).copied()
    }

    /// Entry at `(row, col)`; panics when out of range
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.len() + col]
    }

    pub fn set(&mut self, row: usize, col: usize, linked: bool) {
        let n = self.len();
        self.cells[row * n + col] = u8::from(linked);
    }

    /// Entry for a pair of paths, if both are in the matrix
    pub fn value_by_path(&self, from: &Path, to: &Path) -> Option<u8> {
        Some(self.get(self.index_of(from)?, self.index_of(to)?))
    }

    pub fn row(&self, row: usize) -> &[u8] {
        let n = self.len();
        &self.cells[row * n..(row + 1) * n]
    }

    /// Files the given file depends on (excluding itself)
    pub fn dependencies_of(&self, path: &Path) -> Vec<&Path> {
        let Some(row) = self.index_of(path) else {
            return Vec::new();
        };
        (0..self.len())
            .filter(|&col| col != row && self.get(row, col) == 1)
            .map(|col| self.files[col].as_path())
            .collect()
    }

    /// Files that depend on the given file (excluding itself)
    pub fn dependents_of(&self, path: &Path) -> Vec<&Path> {
        let Some(col) = self.index_of(path) else {
            return Vec::new();
        };
        (0..self.len())
            .filter(|&row| row != col && self.get(row, col) == 1)
            .map(|row| self.files[row].as_path())
            .collect()
    }

    /// Number of off-diagonal 1-entries
    pub fn dependency_count(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|row| (0..n).map(move |col| (row, col)))
            .filter(|&(row, col)| row != col && self.get(row, col) == 1)
            .count()
    }

    /// Row-major rows as nested vectors
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.len()).map(|r| self.row(r).to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ProjectFile;
    use crate::builtins::BuiltinModules;

    fn scan(files: &[(&str, &[&str])]) -> ProjectScan {
        ProjectScan {
            root: PathBuf::from("proj"),
            files: files
                .iter()
                .map(|(path, imports)| ProjectFile {
                    path: PathBuf::from(path),
                    imports: imports.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    fn p(s: &str) -> &Path {
        Path::new(s)
    }

    #[test]
    fn test_builtin_skipped_and_local_import_matched() {
        let scan = scan(&[("proj/a.py", &["os", "util"]), ("proj/util.py", &[])]);
        let matrix =
            DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::stdlib());

        assert_eq!(matrix.value_by_path(p("proj/a.py"), p("proj/util.py")), Some(1));
        assert_eq!(matrix.value_by_path(p("proj/a.py"), p("proj/a.py")), Some(0));
        assert_eq!(matrix.row(1), &[0, 0]);
    }

    #[test]
    fn test_substring_collision_is_preserved() {
        let scan = scan(&[("proj/main.py", &["os"]), ("proj/costs.py", &[])]);

        // With built-ins skipped, `os` never matches
        let skipped =
            DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::stdlib());
        assert_eq!(skipped.value_by_path(p("proj/main.py"), p("proj/costs.py")), Some(0));

        let options = MatrixOptions {
            skip_builtins: false,
        };
        let matrix = DependencyMatrix::build(&scan, &options, &BuiltinModules::stdlib());
        assert_eq!(matrix.value_by_path(p("proj/main.py"), p("proj/costs.py")), Some(1));
    }

    #[test]
    fn test_collision_with_non_builtin_name() {
        let scan = scan(&[("proj/main.py", &["cost"]), ("proj/costs.py", &[]), ("proj/cost.py", &[])]);
        let matrix =
            DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::stdlib());

        assert_eq!(
            matrix.dependencies_of(p("proj/main.py")),
            vec![p("proj/costs.py"), p("proj/cost.py")]
        );
    }

    #[test]
    fn test_matrix_is_not_symmetric() {
        let scan = scan(&[("proj/a.py", &["b"]), ("proj/b.py", &[])]);
        let matrix = DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::empty());

        assert_eq!(matrix.value_by_path(p("proj/a.py"), p("proj/b.py")), Some(1));
        assert_eq!(matrix.value_by_path(p("proj/b.py"), p("proj/a.py")), Some(0));
        assert_eq!(matrix.dependents_of(p("proj/b.py")), vec![p("proj/a.py")]);
        assert!(matrix.dependents_of(p("proj/a.py")).is_empty());
    }

    #[test]
    fn test_self_entry_is_computed() {
        let scan = scan(&[("proj/util.py", &["util"])]);
        let matrix = DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::empty());

        assert_eq!(matrix.get(0, 0), 1);
        assert_eq!(matrix.dependency_count(), 0);
    }

    #[test]
    fn test_file_without_imports_has_zero_row() {
        let scan = scan(&[("proj/a.py", &[]), ("proj/b.py", &["a"])]);
        let matrix = DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::empty());
        assert!(matrix.row(0).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_root_prefix_participates_in_matching() {
        // Matching uses the full path string, project directory included
        let scan = scan(&[("proj/a.py", &["proj"]), ("proj/b.py", &[])]);
        let matrix = DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::empty());
        assert_eq!(matrix.to_rows(), vec![vec![1, 1], vec![0, 0]]);
    }

    #[test]
    fn test_square_and_idempotent() {
        let scan = scan(&[
            ("proj/a.py", &["b", "json"]),
            ("proj/b.py", &["c"]),
            ("proj/c.py", &[]),
        ]);
        let first = DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::stdlib());
        let second = DependencyMatrix::build(&scan, &MatrixOptions::default(), &BuiltinModules::stdlib());

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(first.to_rows().iter().all(|row| row.len() == 3));
        assert_eq!(first.dependency_count(), 2);
    }

    #[test]
    fn test_unknown_path_lookups() {
        let matrix = DependencyMatrix::new(vec![PathBuf::from("a.py")]);
        assert_eq!(matrix.value_by_path(p("a.py"), p("zzz.py")), None);
        assert!(matrix.dependencies_of(p("zzz.py")).is_empty());
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = DependencyMatrix::new(Vec::new());
        assert!(matrix.is_empty());
        assert_eq!(matrix.dependency_count(), 0);
        assert!(matrix.to_rows().is_empty());
    }
}
