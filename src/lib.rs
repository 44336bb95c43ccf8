//! # depmatrix - Python Import Dependency Matrix
//!
//! Scans a directory tree of Python files, extracts each file's imports and
//! builds a square matrix recording which files appear to depend on which.
//!
//! ## Overview
//!
//! The analysis runs in one sequential pass:
//!
//! 1. **Discover** every `.py` file under the project root
//! 2. **Extract** the top-level module name of each import (`a` in `import a.b`)
//! 3. **Classify** names as built-in (standard library) so they can be skipped
//! 4. **Match** each remaining name against every file path by substring
//!
//! ## Usage
//!
//! ```bash
//! # Print the matrix and write <parent>.csv to the current directory
//! depmatrix path/to/project/
//!
//! # Keep standard-library imports in the matching
//! depmatrix --include-builtins path/to/project/
//!
//! # JSON output, no CSV
//! depmatrix --format json --no-csv path/to/project/
//! ```
//!
//! ## Matching
//!
//! Entry `(A, B)` is 1 when an import collected from `A` occurs anywhere in
//! `B`'s path string. This is deliberately loose: `import os` marks
//! `costs.py` when built-ins are not skipped.

pub mod analyzer;
pub mod builtins;
pub mod config;
pub mod export;
pub mod imports;
pub mod matrix;
pub mod report;
pub mod source;

pub use analyzer::{
    AnalyzerError, ProjectFile, ProjectScan, base_name, build_dependency_matrix, scan_project,
};
pub use builtins::{BuiltinModules, InterpreterClassifier, ModuleClassifier, STDLIB_MODULES};
pub use config::{
    AnalysisConfig, BuiltinsConfig, CompiledConfig, ConfigError, DepMatrixConfig,
    load_compiled_config, load_config,
};
pub use export::{csv_file_name, export_csv, write_csv};
pub use imports::{ImportError, ImportExtractor, extract_imports};
pub use matrix::{DependencyMatrix, MatrixOptions};
pub use report::{ReportFormat, write_json, write_summary, write_table};
pub use source::{DiscoveryFilter, FileSource, FsSource, MemorySource};
