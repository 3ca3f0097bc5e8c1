//! # vsmat: variable-size sparse matrices over global ids
//!
//! Operator matrices (overlaps, projected Hamiltonians) whose rows and
//! columns are global function ids scattered across a process group. Each
//! process holds the rows centered on its own partition, plus partial rows it
//! computed for its neighbors.
//!
//! ## Overview
//!
//! - **Index table**: global id -> local slot, amortized O(1)
//! - **Sparse rows**: insertion-ordered entries with add/set insertion,
//!   optionally with a column index for O(1) structural lookups
//! - **Bulk assembly**: dense subdomain blocks summed into global entries,
//!   with tolerance pruning
//! - **Restricted products**: `A * B` for symmetric `B`, bounded by a
//!   [`PatternMatrix`] so work scales with the true number of nonzeros
//! - **Consolidation**: rows reduced to an id set, then merged with remote
//!   contributions through a [`DataDistribution`] implementation
//!
//! ## Usage
//!
//! ```
//! use vsmat::VariableSizeMatrix;
//!
//! let mut s = VariableSizeMatrix::new("S", 3);
//! s.insert_new_row(0, &[0, 1], &[2.0, 1.0]);
//! s.insert_new_row(1, &[1], &[3.0]);
//! s.insert_new_row(2, &[2], &[4.0]);
//!
//! assert_eq!(s.trace(), 9.0);
//! assert_eq!(s.max_abs_off_diagonal_row_entry(0), Some((1, 1.0)));
//! ```
//!
//! Consolidating with contributions another process computed:
//!
//! ```
//! use vsmat::{LoopbackDistributor, VariableSizeMatrix};
//!
//! let mut local = VariableSizeMatrix::new("S", 1);
//! local.insert_new_row(0, &[0], &[1.0]);
//!
//! let mut remote = VariableSizeMatrix::new("S_remote", 1);
//! remote.insert_new_row(0, &[0, 4], &[0.5, 2.0]);
//!
//! let mut distributor = LoopbackDistributor::from_peers([&remote]);
//! local.consolidate(&[0], &mut distributor).unwrap();
//!
//! assert_eq!(local.get_value(0, 0), Some(1.5));
//! assert_eq!(local.get_value(0, 4), Some(2.0));
//! ```

pub mod distribution;
pub mod error;
pub mod matrix;
pub mod parallel;
pub mod utils;

// Re-export primary components
pub use distribution::{DataDistribution, LoopbackDistributor, PackedRows};
pub use error::{MatrixError, MatrixResult};
pub use matrix::{reference_amult_sym_b, AssemblySummary};
pub use matrix::{IndexTable, InsertMode, RowKind, SparseRow};
pub use matrix::{LocalBlockSource, LocalMatrices};
pub use matrix::{MatrixConfig, PruneStage, SystemParameters};
pub use matrix::{MatrixState, PatternMatrix, VariableSizeMatrix};
pub use parallel::{amult_sym_b_parallel, gemv_parallel};
pub use utils::{from_sprs_csr, to_dense, to_sprs_csr};

/// Version information for the vsmat library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
