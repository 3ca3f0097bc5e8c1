//! Bulk assembly from dense subdomain blocks
//!
//! ## Assembly Logic
//!
//! For every pair of colors `(icolor, jcolor)`, each subdomain that maps both
//! colors to global ids `(st1, st2)` contributes its dense value to the global
//! entry `(st1, st2)`:
//!
//! 1. Contributions from all subdomains agreeing on the same pair are summed
//!    first, so each pair is inserted once per color pair.
//! 2. With `PruneStage::Assembly`, a summed value with magnitude at or below
//!    the tolerance is dropped instead of being stored.
//! 3. Surviving values are inserted with `InsertMode::Add`, creating rows and
//!    entries as needed.
//!
//! Pruning at step 2 only sees this process's partial sums, so the stored
//! sparsity can change with the number of processes. `PruneStage::Deferred`
//! postpones it until after consolidation.

use tracing::debug;

use crate::matrix::config::MatrixConfig;
use crate::matrix::local::LocalBlockSource;
use crate::matrix::row::InsertMode;
use crate::matrix::variable_size::{MatrixState, VariableSizeMatrix};

/// Counts reported by a bulk assembly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    /// Summed values inserted into the matrix
    pub inserted: usize,
    /// Summed values dropped by tolerance pruning
    pub dropped: usize,
}

impl VariableSizeMatrix {
    /// Accumulates the dense blocks of every subdomain into global entries
    ///
    /// `global_indexes[iloc][color]` is the global id of `color` on subdomain
    /// `iloc`, or `None` when that color is not active there. Global ids must
    /// be below `total_dim`.
    ///
    /// # Panics
    ///
    /// Panics if the index map does not have one entry per subdomain, if its
    /// color counts disagree with `blocks`, or if a global id is out of range.
    pub fn initialize_matrix_elements<B>(
        &mut self,
        blocks: &B,
        global_indexes: &[Vec<Option<usize>>],
        total_dim: usize,
        config: &MatrixConfig,
    ) -> AssemblySummary
    where
        B: LocalBlockSource + ?Sized,
    {
        assert_eq!(
            global_indexes.len(),
            blocks.subdivisions(),
            "global_indexes must have one entry per subdomain"
        );
        let colors = blocks.colors();
        for map in global_indexes {
            assert_eq!(map.len(), colors, "each subdomain must map every color");
        }

        let tolerance = config.assembly_tolerance();
        let mut summary = AssemblySummary::default();
        let mut pending: Vec<((usize, usize), f64)> = Vec::with_capacity(global_indexes.len());

        for icolor in 0..colors {
            for jcolor in 0..colors {
                pending.clear();

                for (iloc, map) in global_indexes.iter().enumerate() {
                    let (Some(st1), Some(st2)) = (map[icolor], map[jcolor]) else {
                        continue;
                    };
                    assert!(
                        st1 < total_dim && st2 < total_dim,
                        "global id pair ({}, {}) out of range (total_dim = {})",
                        st1,
                        st2,
                        total_dim
                    );

                    let val = blocks.value(iloc, icolor, jcolor);
                    match pending.iter_mut().find(|(pair, _)| *pair == (st1, st2)) {
                        Some((_, sum)) => *sum += val,
                        None => pending.push(((st1, st2), val)),
                    }
                }

                for &((st1, st2), val) in &pending {
                    let keep = match tolerance {
                        Some(tol) => val.abs() > tol,
                        None => val != 0.0,
                    };
                    if keep {
                        self.insert_matrix_element(st1, st2, val, InsertMode::Add, true);
                        summary.inserted += 1;
                    } else {
                        summary.dropped += 1;
                    }
                }
            }
        }

        self.transition(MatrixState::Assembled);
        debug!(
            matrix = %self.name,
            subdomains = global_indexes.len(),
            colors,
            inserted = summary.inserted,
            dropped = summary.dropped,
            "assembled local blocks"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::config::PruneStage;
    use crate::matrix::local::LocalMatrices;
    use ndarray::array;

    #[test]
    fn test_single_subdomain() {
        let blocks = LocalMatrices::from_blocks(vec![array![[2.0, 1.0], [1.0, 3.0]]]);
        let map = vec![vec![Some(4), Some(7)]];

        let mut m = VariableSizeMatrix::new("S", 2);
        let summary = m.initialize_matrix_elements(&blocks, &map, 10, &MatrixConfig::default());

        assert_eq!(summary.inserted, 4);
        assert_eq!(m.n(), 2);
        assert_eq!(m.get_value(4, 7), Some(1.0));
        assert_eq!(m.get_value(7, 7), Some(3.0));
        assert_eq!(m.state(), MatrixState::Assembled);
    }

    #[test]
    fn test_subdomains_sum_before_pruning() {
        // Both subdomains map color 0 to id 1; their halves cancel exactly,
        // and their small parts only clear the tolerance once summed.
        let blocks = LocalMatrices::from_blocks(vec![
            array![[0.6e-12, 1.0], [1.0, 0.0]],
            array![[0.6e-12, -1.0], [-1.0, 0.0]],
        ]);
        let map = vec![vec![Some(1), Some(2)], vec![Some(1), Some(2)]];

        let mut m = VariableSizeMatrix::new("S", 2);
        let summary = m.initialize_matrix_elements(&blocks, &map, 3, &MatrixConfig::default());

        assert_eq!(m.get_value(1, 1), Some(1.2e-12));
        assert_eq!(m.get_value(1, 2), None);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.dropped, 3);
    }

    #[test]
    fn test_missing_colors_are_skipped() {
        let blocks = LocalMatrices::from_blocks(vec![
            array![[1.0, 5.0], [5.0, 1.0]],
            array![[2.0, 0.0], [0.0, 9.0]],
        ]);
        let map = vec![vec![Some(0), None], vec![Some(0), Some(3)]];

        let mut m = VariableSizeMatrix::new("S", 2);
        m.initialize_matrix_elements(&blocks, &map, 4, &MatrixConfig::default());

        assert_eq!(m.get_value(0, 0), Some(3.0));
        assert_eq!(m.get_value(3, 3), Some(9.0));
        assert_eq!(m.get_value(0, 3), None);
    }

    #[test]
    fn test_deferred_pruning_keeps_small_values() {
        let blocks = LocalMatrices::from_blocks(vec![array![[1.0e-14]]]);
        let map = vec![vec![Some(0)]];
        let config = MatrixConfig::default().with_prune_stage(PruneStage::Deferred);

        let mut m = VariableSizeMatrix::new("S", 1);
        m.initialize_matrix_elements(&blocks, &map, 1, &config);
        assert_eq!(m.get_value(0, 0), Some(1.0e-14));

        m.prune(config.tolerance);
        assert_eq!(m.get_value(0, 0), None);
    }

    #[test]
    fn test_repeated_assembly_accumulates() {
        let blocks = LocalMatrices::from_blocks(vec![array![[1.5]]]);
        let map = vec![vec![Some(2)]];
        let config = MatrixConfig::default();

        let mut m = VariableSizeMatrix::new("S", 1);
        m.initialize_matrix_elements(&blocks, &map, 3, &config);
        m.initialize_matrix_elements(&blocks, &map, 3, &config);

        assert_eq!(m.get_value(2, 2), Some(3.0));
        assert_eq!(m.nnzmat(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_id_out_of_range() {
        let blocks = LocalMatrices::from_blocks(vec![array![[1.0]]]);
        let map = vec![vec![Some(5)]];
        let mut m = VariableSizeMatrix::new("S", 1);
        m.initialize_matrix_elements(&blocks, &map, 5, &MatrixConfig::default());
    }
}
