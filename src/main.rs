//! depmatrix CLI - Python Import Dependency Matrix
//!
//! Scans a Python project, prints a file-to-file dependency matrix and
//! exports it as CSV.
//!
//! Usage:
//!   depmatrix [OPTIONS] <PATH>

use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use depmatrix::{
    CompiledConfig, DependencyMatrix, FsSource, InterpreterClassifier, ReportFormat, csv_file_name,
    export_csv, load_compiled_config, scan_project, write_json, write_summary, write_table,
};

/// depmatrix - Which Python files import which
#[derive(Parser, Debug)]
#[command(name = "depmatrix")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project root directory to scan
    path: PathBuf,

    /// Keep standard-library imports when matching files
    #[arg(long)]
    include_builtins: bool,

    /// Output format printed to stdout
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,

    /// CSV file to write (default: <second-to-last path segment>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Don't write a CSV file
    #[arg(long, conflicts_with = "output")]
    no_csv: bool,

    /// Config file path (default: search for .depmatrix.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Classify built-ins by probing this Python interpreter
    #[arg(long, value_name = "EXE")]
    python: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("depmatrix=debug")
    } else {
        EnvFilter::new("depmatrix=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let start = Instant::now();

    // An explicit --config must load; a discovered one falls back to defaults
    let mut config = match load_compiled_config(&args.path, args.config.as_deref()) {
        Ok(config) => {
            match &config.source {
                Some(source) if config.inherited => tracing::warn!(
                    path = %source.display(),
                    "using configuration from a parent directory of the project"
                ),
                Some(source) => tracing::info!(path = %source.display(), "loaded configuration"),
                None => {}
            }
            config
        }
        Err(e) if args.config.is_some() => return Err(e.into()),
        Err(e) => {
            tracing::warn!("no config file loaded: {}", e);
            CompiledConfig::empty()
        }
    };

    // CLI flags override the config file
    if args.include_builtins {
        config.skip_builtins = false;
    }
    if args.python.is_some() {
        config.python = args.python.clone();
    }

    eprintln!("Analyzing project at '{}'...", args.path.display());

    let scan = scan_project(&FsSource, &args.path, &config.discovery_filter())?;

    let classifier = match &config.python {
        Some(python) => InterpreterClassifier::new(python.as_str())
            .classify(&scan.import_names())?
            .with_extra(config.extra_builtins.iter().cloned())
            .without(&config.excluded_builtins),
        None => config.builtin_modules(),
    };

    let matrix = DependencyMatrix::build(&scan, &config.matrix_options(), &classifier);

    if args.verbose {
        eprintln!(
            "Analysis complete: {} files, {} dependencies (took {:.2?})\n",
            matrix.len(),
            matrix.dependency_count(),
            start.elapsed()
        );
    }

    let mut writer = BufWriter::new(stdout());
    match args.format {
        ReportFormat::Table => write_table(&matrix, &mut writer)?,
        ReportFormat::Json => write_json(&matrix, &scan, &mut writer)?,
        ReportFormat::Summary => write_summary(&matrix, &scan, &mut writer)?,
    }
    writer.flush()?;

    if !args.no_csv {
        let csv_path = match &args.output {
            Some(path) => path.clone(),
            None => PathBuf::from(csv_file_name(&args.path.to_string_lossy())?),
        };
        export_csv(&matrix, &csv_path)?;
        eprintln!("Matrix exported to {}.", csv_path.display());
    }

    Ok(())
}
