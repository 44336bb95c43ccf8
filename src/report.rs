//! Report generation for dependency matrices
//!
//! Renders a [`DependencyMatrix`] as an aligned console table, as JSON for
//! automation, or as a short summary.

use std::io::{self, Write};

use serde::Serialize;

use crate::analyzer::{ProjectScan, base_name};
use crate::matrix::DependencyMatrix;

/// Output format selectable from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Aligned 0/1 table keyed by file name
    #[default]
    Table,
    /// Files, imports and the raw matrix as JSON
    Json,
    /// Counts and the most depended-upon files
    Summary,
}

/// Write the matrix as a fixed-width table keyed by file base name.
///
/// Column width is the longest base name plus two. Names are left-aligned,
/// values centered. Self-entries are printed as their numeric value.
pub fn write_table<W: Write>(matrix: &DependencyMatrix, writer: &mut W) -> io::Result<()> {
    if matrix.is_empty() {
        return Ok(());
    }

    let names: Vec<String> = matrix.files().iter().map(|p| base_name(p)).collect();
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0) + 2;

    let mut header = " ".repeat(width);
    for name in &names {
        header.push_str(&format!("{:<width$}", name));
    }
    writeln!(writer, "{}", header)?;

    for (row, name) in names.iter().enumerate() {
        let mut line = format!("{:<width$}", name);
        for &value in matrix.row(row) {
            line.push_str(&format!("{:^width$}", value));
        }
        writeln!(writer, "{}", line)?;
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    root: String,
    files: Vec<JsonFile<'a>>,
    dependencies: usize,
    matrix: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize)]
struct JsonFile<'a> {
    path: String,
    name: String,
    imports: Vec<&'a str>,
    depends_on: Vec<String>,
}

/// Machine-readable output: files, their imports and the raw matrix
pub fn write_json<W: Write>(
    matrix: &DependencyMatrix,
    scan: &ProjectScan,
    writer: &mut W,
) -> io::Result<()> {
    let files = scan
        .files
        .iter()
        .map(|file| JsonFile {
            path: file.path.display().to_string(),
            name: file.base_name(),
            imports: file.imports.iter().map(String::as_str).collect(),
            depends_on: matrix
                .dependencies_of(&file.path)
                .into_iter()
                .map(|p| p.display().to_string())
                .collect(),
        })
        .collect();

    let report = JsonReport {
        root: scan.root.display().to_string(),
        files,
        dependencies: matrix.dependency_count(),
        matrix: matrix.to_rows(),
    };

    let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
    writeln!(writer, "{}", json)?;

    Ok(())
}

/// Short overview: counts plus the most depended-upon files
pub fn write_summary<W: Write>(
    matrix: &DependencyMatrix,
    scan: &ProjectScan,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "Dependency Matrix: {}", scan.root.display())?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(
        writer,
        "Files: {} | Imports: {} | Dependencies: {}",
        matrix.len(),
        scan.import_names().len(),
        matrix.dependency_count()
    )?;

    let mut most_used: Vec<(usize, &std::path::Path)> = matrix
        .files()
        .iter()
        .map(|p| (matrix.dependents_of(p).len(), p.as_path()))
        .filter(|(count, _)| *count > 0)
        .collect();
    most_used.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

    if !most_used.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Most depended upon:")?;
        for (count, path) in most_used.iter().take(5) {
            writeln!(writer, "  {:>3}  {}", count, path.display())?;
        }
    }

    Ok(())
}
