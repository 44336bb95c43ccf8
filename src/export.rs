//! CSV export of the dependency matrix
//!
//! Header row is an empty cell followed by one column per file base name.
//! Each body row starts with the file's base name, then `#` on the diagonal,
//! `X` for a detected dependency and an empty cell otherwise.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::analyzer::{AnalyzerError, base_name};
use crate::matrix::DependencyMatrix;

/// Write the matrix as CSV to any writer.
///
/// Records end with `\r\n`, the line terminator of Python's `csv` module.
pub fn write_csv<W: Write>(matrix: &DependencyMatrix, writer: W) -> Result<(), AnalyzerError> {
    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    let names: Vec<String> = matrix.files().iter().map(|p| base_name(p)).collect();

    let mut header = Vec::with_capacity(names.len() + 1);
    header.push(String::new());
    header.extend(names.iter().cloned());
    out.write_record(&header)?;

    for (row, name) in names.iter().enumerate() {
        let mut record = Vec::with_capacity(names.len() + 1);
        record.push(name.as_str());
        for (col, &value) in matrix.row(row).iter().enumerate() {
            record.push(cell(row, col, value));
        }
        out.write_record(&record)?;
    }

    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn cell(row: usize, col: usize, value: u8) -> &'static str {
    if row == col {
        "#"
    } else if value == 1 {
        "X"
    } else {
        ""
    }
}

/// Create (or truncate) `path` and write the matrix into it
pub fn export_csv(matrix: &DependencyMatrix, path: &Path) -> Result<(), AnalyzerError> {
    let file = File::create(path).map_err(|source| AnalyzerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(matrix, file)
}

/// CSV file name derived from the project path as typed by the user.
///
/// Uses the second-to-last `/`-separated segment, so `work/myproj/` gives
/// `myproj.csv` and `work/myproj` gives `work.csv`. When that segment is
/// missing or empty the last non-empty segment is used instead.
pub fn csv_file_name(project_path: &str) -> Result<String, AnalyzerError> {
    let segments: Vec<&str> = project_path.split('/').collect();

    let second_to_last = segments
        .len()
        .checked_sub(2)
        .map(|i| segments[i])
        .filter(|s| !s.is_empty());

    let stem = second_to_last
        .or_else(|| segments.iter().rev().copied().find(|s| !s.is_empty()))
        .ok_or_else(|| AnalyzerError::InvalidPath(project_path.to_string()))?;

    Ok(format!("{}.csv", stem))
}
