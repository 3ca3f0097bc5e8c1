//! # Parallel row kernels
//!
//! Rayon versions of the row-wise kernels. Shared matrices are only read
//! from worker threads; each worker produces results for its own rows and
//! the output matrix is written afterwards on the calling thread, so no row
//! is ever mutated from two threads.

use hashbrown::HashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::error::MatrixResult;
use crate::matrix::{MatrixConfig, PatternMatrix, VariableSizeMatrix};

fn build_pool(config: &MatrixConfig) -> MatrixResult<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.system_params.n_threads)
        .build()?;
    Ok(pool)
}

/// Computes `C = A * B` like [`VariableSizeMatrix::amult_sym_b`], one row per task
///
/// Matrices with fewer rows than `config.system_params.parallel_row_threshold`
/// are handled by the serial kernel.
///
/// # Examples
///
/// ```
/// use vsmat::{amult_sym_b_parallel, MatrixConfig, PatternMatrix, VariableSizeMatrix};
///
/// let mut a = VariableSizeMatrix::new("A", 2);
/// a.insert_new_row(0, &[0], &[2.0]);
/// a.insert_new_row(1, &[1], &[3.0]);
///
/// let pattern = PatternMatrix::from_matrix(&a);
/// let mut c = VariableSizeMatrix::new("C", 2);
/// amult_sym_b_parallel(&a, &a, &mut c, &pattern, true, &MatrixConfig::default()).unwrap();
///
/// assert_eq!(c.get_value(1, 1), Some(9.0));
/// ```
pub fn amult_sym_b_parallel(
    a: &VariableSizeMatrix,
    b: &VariableSizeMatrix,
    c: &mut VariableSizeMatrix,
    pattern: &PatternMatrix,
    restrict: bool,
    config: &MatrixConfig,
) -> MatrixResult<()> {
    assert!(b.n() > 0, "B must have at least one row");

    if a.n() < config.system_params.parallel_row_threshold {
        a.amult_sym_b(b, c, pattern, restrict);
        return Ok(());
    }

    let restriction = restrict.then_some(pattern);
    let pool = build_pool(config)?;
    let row_results: Vec<Vec<(usize, f64)>> = pool.install(|| {
        (0..a.n())
            .into_par_iter()
            .map_init(HashMap::new, |scratch, slot| {
                a.product_row(slot, b, restriction, scratch)
            })
            .collect()
    });

    let mut written = 0;
    for (slot, entries) in row_results.iter().enumerate() {
        written += entries.len();
        c.write_row_entries(a.global_index(slot), entries);
    }
    debug!(
        a = %a.name(),
        b = %b.name(),
        threads = config.system_params.n_threads,
        written,
        "amult_sym_b_parallel"
    );
    Ok(())
}

/// Computes `y = alpha * M * x + beta * y` with rows split across threads
///
/// See [`VariableSizeMatrix::gemv`] for the indexing of `x` and `y`.
pub fn gemv_parallel(
    matrix: &VariableSizeMatrix,
    alpha: f64,
    x: &[f64],
    beta: f64,
    y: &mut [f64],
    config: &MatrixConfig,
) -> MatrixResult<()> {
    assert_eq!(y.len(), matrix.n(), "y must have one entry per row");

    if matrix.n() < config.system_params.parallel_row_threshold {
        matrix.gemv(alpha, x, beta, y);
        return Ok(());
    }

    let pool = build_pool(config)?;
    pool.install(|| {
        y.par_iter_mut().enumerate().for_each(|(slot, yk)| {
            *yk = beta * *yk + alpha * matrix.row(slot).dot_vec(x);
        });
    });
    Ok(())
}
