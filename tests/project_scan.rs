//! Filesystem scenarios for the full scan → matrix → report pipeline

use std::fs;
use std::path::{Path, PathBuf};

use depmatrix::{
    AnalyzerError, BuiltinModules, DependencyMatrix, DiscoveryFilter, FsSource, MatrixOptions,
    build_dependency_matrix, export_csv, scan_project, write_table,
};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    dir
}

fn build(root: &Path, options: MatrixOptions) -> DependencyMatrix {
    build_dependency_matrix(
        &FsSource,
        root,
        &DiscoveryFilter::default(),
        &options,
        &BuiltinModules::stdlib(),
    )
    .unwrap()
}

#[test]
fn test_local_import_marks_dependency() {
    let dir = project(&[("a.py", "import os\nimport util\n"), ("util.py", "")]);
    let matrix = build(dir.path(), MatrixOptions::default());

    let a = dir.path().join("a.py");
    let util = dir.path().join("util.py");
    assert_eq!(matrix.value_by_path(&a, &util), Some(1));
    assert_eq!(matrix.value_by_path(&a, &a), Some(0));
    assert_eq!(matrix.value_by_path(&util, &a), Some(0));
    assert_eq!(matrix.value_by_path(&util, &util), Some(0));
}

#[test]
fn test_nested_packages_and_non_python_files() {
    let dir = project(&[
        ("app/main.py", "from services.billing import charge\n"),
        ("services/billing.py", "import json\n"),
        ("services/__init__.py", ""),
        ("README.md", "import services\n"),
        ("setup.cfg", ""),
    ]);
    let matrix = build(dir.path(), MatrixOptions::default());

    assert_eq!(matrix.len(), 3);
    let main = dir.path().join("app/main.py");
    let deps = matrix.dependencies_of(&main);
    assert_eq!(deps.len(), 2);
    assert!(deps.contains(&dir.path().join("services/billing.py").as_path()));
    assert!(deps.contains(&dir.path().join("services/__init__.py").as_path()));
}

#[test]
fn test_substring_false_positive_without_builtin_skip() {
    let dir = project(&[("main.py", "import os\n"), ("costs.py", "")]);
    let options = MatrixOptions {
        skip_builtins: false,
    };
    let matrix = build(dir.path(), options);

    let main = dir.path().join("main.py");
    let costs = dir.path().join("costs.py");
    assert_eq!(matrix.value_by_path(&main, &costs), Some(1));
}

#[test]
fn test_rebuild_is_identical() {
    let dir = project(&[
        ("a.py", "import b\n"),
        ("b.py", "import c\n"),
        ("c.py", "from a import x\n"),
    ]);
    let first = build(dir.path(), MatrixOptions::default());
    let second = build(dir.path(), MatrixOptions::default());
    assert_eq!(first, second);
    assert_eq!(first.files(), second.files());
}

#[test]
fn test_syntax_error_aborts_run() {
    let dir = project(&[("good.py", "import os\n"), ("bad.py", "class :\n")]);
    let err = scan_project(&FsSource, dir.path(), &DiscoveryFilter::default()).unwrap_err();
    match err {
        AnalyzerError::Parse { path, .. } => assert_eq!(path, dir.path().join("bad.py")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_non_utf8_file_is_io_error() {
    let dir = project(&[("ok.py", "")]);
    fs::write(dir.path().join("latin.py"), [0x69, 0x6d, 0xff, 0xfe]).unwrap();

    let err = scan_project(&FsSource, dir.path(), &DiscoveryFilter::default()).unwrap_err();
    assert!(matches!(err, AnalyzerError::Io { .. }));
}

#[test]
fn test_missing_root_is_invalid_path() {
    let err = scan_project(
        &FsSource,
        Path::new("/no/such/project/dir"),
        &DiscoveryFilter::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzerError::InvalidPath(_)));
}

#[test]
fn test_excluded_directories_are_skipped() {
    let dir = project(&[("src/a.py", ""), ("build/gen.py", "")]);
    let filter = DiscoveryFilter::new(
        vec!["py".to_string()],
        vec![glob::Pattern::new("build/*").unwrap()],
    );
    let scan = scan_project(&FsSource, dir.path(), &filter).unwrap();

    let paths: Vec<PathBuf> = scan.files.into_iter().map(|f| f.path).collect();
    assert_eq!(paths, vec![dir.path().join("src/a.py")]);
}

#[test]
fn test_table_and_csv_agree() {
    let dir = project(&[("a.py", "import util\n"), ("util.py", "")]);
    let matrix = build(dir.path(), MatrixOptions::default());

    let mut table = Vec::new();
    write_table(&matrix, &mut table).unwrap();
    let table = String::from_utf8(table).unwrap();
    assert!(table.lines().next().unwrap().contains("util.py"));

    let out = tempfile::tempdir().unwrap();
    let csv_path = out.path().join("proj.csv");
    export_csv(&matrix, &csv_path).unwrap();

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["", "a.py", "util.py"]);

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(rows[0], vec!["a.py", "#", "X"]);
    assert_eq!(rows[1], vec!["util.py", "", "#"]);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_to_other_file_is_ignored() {
    let dir = project(&[("a.py", "import util\n"), ("util.py", "")]);
    std::os::unix::fs::symlink(dir.path().join("gone.md"), dir.path().join("README.md")).unwrap();

    let matrix = build(dir.path(), MatrixOptions::default());
    assert_eq!(matrix.len(), 2);
}

#[cfg(unix)]
#[test]
fn test_directory_symlink_loop_is_not_followed() {
    let dir = project(&[("pkg/a.py", "import b\n"), ("pkg/b.py", "")]);
    std::os::unix::fs::symlink(dir.path(), dir.path().join("pkg/loop")).unwrap();

    let scan = scan_project(&FsSource, dir.path(), &DiscoveryFilter::default()).unwrap();
    let paths: Vec<PathBuf> = scan.files.into_iter().map(|f| f.path).collect();
    assert_eq!(
        paths,
        vec![dir.path().join("pkg/a.py"), dir.path().join("pkg/b.py")]
    );
}

#[cfg(unix)]
#[test]
fn test_symlinked_python_file_is_scanned() {
    let dir = project(&[("shared/util.py", ""), ("app/a.py", "import util\n")]);
    std::os::unix::fs::symlink(
        dir.path().join("shared/util.py"),
        dir.path().join("app/util.py"),
    )
    .unwrap();

    let matrix = build(dir.path(), MatrixOptions::default());
    let a = dir.path().join("app/a.py");
    let linked = dir.path().join("app/util.py");
    assert_eq!(matrix.len(), 3);
    assert_eq!(matrix.value_by_path(&a, &linked), Some(1));
}
