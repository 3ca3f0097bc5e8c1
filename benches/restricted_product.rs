//! Benchmarks for restricted symmetric products and bulk assembly

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use vsmat::{
    amult_sym_b_parallel, InsertMode, LocalMatrices, MatrixConfig, PatternMatrix, RowKind,
    VariableSizeMatrix,
};

/// Symmetric banded matrix over ids `0..n` with the given half bandwidth
fn create_banded_matrix(n: usize, half_band: usize, kind: RowKind) -> VariableSizeMatrix {
    let mut m = VariableSizeMatrix::with_kind("S", n, kind);
    for i in 0..n {
        let lo = i.saturating_sub(half_band);
        let hi = (i + half_band + 1).min(n);
        for j in lo..hi {
            let val = 1.0 / (1.0 + i.abs_diff(j) as f64);
            m.insert_matrix_element(i, j, val, InsertMode::Add, true);
        }
    }
    m
}

fn bench_restricted_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("amult_sym_b");

    for &n in &[500, 2000, 8000] {
        let s = create_banded_matrix(n, 4, RowKind::Plain);
        let pattern = PatternMatrix::from_matrix(&s);

        group.bench_with_input(BenchmarkId::new("restricted", n), &n, |bench, _| {
            let mut out = VariableSizeMatrix::new("C", n);
            bench.iter(|| {
                s.amult_sym_b(&s, &mut out, &pattern, true);
                black_box(out.nnzmat())
            })
        });

        let indexed = VariableSizeMatrix::converted(&s, RowKind::Indexed);
        group.bench_with_input(BenchmarkId::new("restricted_indexed_b", n), &n, |bench, _| {
            let mut out = VariableSizeMatrix::new("C", n);
            bench.iter(|| {
                s.amult_sym_b(&indexed, &mut out, &pattern, true);
                black_box(out.nnzmat())
            })
        });

        let config = MatrixConfig::default();
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |bench, _| {
            let mut out = VariableSizeMatrix::new("C", n);
            bench.iter(|| {
                amult_sym_b_parallel(&s, &s, &mut out, &pattern, true, &config).unwrap();
                black_box(out.nnzmat())
            })
        });
    }

    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("initialize_matrix_elements");

    for &subdiv in &[16, 64] {
        // Overlapping windows of 32 functions, shifted by 16
        let colors = 32;
        let blocks = LocalMatrices::from_blocks(
            (0..subdiv)
                .map(|_| Array2::from_shape_fn((colors, colors), |(i, j)| 1.0 / (1.0 + i.abs_diff(j) as f64)))
                .collect(),
        );
        let global_indexes: Vec<Vec<Option<usize>>> = (0..subdiv)
            .map(|iloc| (0..colors).map(|icolor| Some(16 * iloc + icolor)).collect())
            .collect();
        let total_dim = 16 * subdiv + colors;
        let config = MatrixConfig::default();

        group.bench_with_input(BenchmarkId::from_parameter(subdiv), &subdiv, |bench, _| {
            bench.iter(|| {
                let mut s = VariableSizeMatrix::new("S", total_dim);
                let summary = s.initialize_matrix_elements(&blocks, &global_indexes, total_dim, &config);
                black_box(summary.inserted)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_restricted_product, bench_assembly);
criterion_main!(benches);
