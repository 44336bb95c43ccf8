//! Matrix benchmarks
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::path::Path;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use depmatrix::{
    BuiltinModules, DependencyMatrix, DiscoveryFilter, MatrixOptions, MemorySource,
    ImportExtractor, scan_project,
};

const PYTHON_SAMPLE: &str = r#"
from __future__ import annotations

import os
import json
from typing import Optional, List
from dataclasses import dataclass

from .models import User
from services.billing import charge
import numpy as np


@dataclass
class Invoice:
    user: User
    amount: float
    notes: Optional[List[str]] = None

    def total(self) -> float:
        import math
        return math.fsum([self.amount])


def load(path: str) -> dict:
    with open(os.path.join(path, "invoice.json")) as f:
        return json.load(f)
"#;

fn synthetic_project(files: usize) -> MemorySource {
    let mut source = MemorySource::new();
    for i in 0..files {
        let body = format!(
            "import os\nimport module_{}\nfrom pkg_{}.sub import thing\n{}",
            (i + 1) % files,
            i % 7,
            PYTHON_SAMPLE
        );
        source.insert(format!("proj/pkg_{}/module_{}.py", i % 7, i), body);
    }
    source
}

fn bench_extract(c: &mut Criterion) {
    let mut extractor = ImportExtractor::new().unwrap();
    c.bench_function("extract_imports", |b| {
        b.iter(|| extractor.extract(black_box(PYTHON_SAMPLE)).unwrap())
    });
}

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependency_matrix");
    let builtins = BuiltinModules::stdlib();

    for size in [10, 50, 200] {
        let source = synthetic_project(size);
        let scan = scan_project(&source, Path::new("proj"), &DiscoveryFilter::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("build", size), &scan, |b, scan| {
            b.iter(|| DependencyMatrix::build(black_box(scan), &MatrixOptions::default(), &builtins))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract, bench_matrix);
criterion_main!(benches);
