//! Cross-process consolidation of partial rows
//!
//! Several processes may compute partial values for the same rows. The
//! transport that moves rows between them is outside this crate; it plugs in
//! through [`DataDistribution`]. Rows travel as [`PackedRows`] buffers.

pub mod loopback;
pub mod packed;

pub use loopback::LoopbackDistributor;
pub use packed::PackedRows;

use tracing::debug;

use crate::error::MatrixResult;
use crate::matrix::{MatrixState, VariableSizeMatrix};

/// Gathers and merges contributions for local rows from other processes
///
/// Implementations block until every participating process has taken part.
/// They may add or merge entries into rows the matrix already holds, but
/// must not remove rows.
pub trait DataDistribution {
    /// Merges remote contributions into the rows of `matrix`
    ///
    /// With `consolidate` set, remote values are summed into the local ones;
    /// otherwise they overwrite them.
    fn update_local_rows(
        &mut self,
        matrix: &mut VariableSizeMatrix,
        consolidate: bool,
    ) -> MatrixResult<()>;
}

impl VariableSizeMatrix {
    /// Restricts the matrix to the rows in `gids` and merges in remote contributions
    ///
    /// Rows outside `gids` are emptied (they keep their slot). Ids without a
    /// local row get an empty one so remote contributions have a place to land.
    pub fn consolidate<D>(&mut self, gids: &[usize], distributor: &mut D) -> MatrixResult<()>
    where
        D: DataDistribution + ?Sized,
    {
        for &gid in gids {
            if self.row_slot(gid).is_none() {
                self.insert_new_row(gid, &[], &[]);
            }
        }

        let mut keep = vec![false; self.n()];
        for &gid in gids {
            if let Some(slot) = self.row_slot(gid) {
                keep[slot] = true;
            }
        }
        self.sparsify(&keep);
        let local_nnz = self.nnzmat();

        distributor.update_local_rows(self, true)?;
        self.recount();
        self.transition(MatrixState::Consolidated);

        debug!(
            matrix = %self.name,
            rows = gids.len(),
            local_nnz,
            nnz = self.nnzmat(),
            "consolidated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatrixError;

    struct FailingDistributor;

    impl DataDistribution for FailingDistributor {
        fn update_local_rows(
            &mut self,
            _matrix: &mut VariableSizeMatrix,
            _consolidate: bool,
        ) -> MatrixResult<()> {
            Err(MatrixError::Distribution("peer 3 unreachable".to_string()))
        }
    }

    #[test]
    fn test_consolidate_sparsifies_before_merge() {
        let mut m = VariableSizeMatrix::new("S", 3);
        m.insert_new_row(0, &[0, 1], &[1.0, 2.0]);
        m.insert_new_row(1, &[1], &[3.0]);
        m.insert_new_row(2, &[2], &[4.0]);

        let mut distributor = LoopbackDistributor::new();
        m.consolidate(&[0, 2], &mut distributor).unwrap();

        assert_eq!(m.n(), 3);
        assert_eq!(m.nnzmat(), 3);
        assert_eq!(m.nnz_row(1), 0);
        assert_eq!(m.state(), MatrixState::Consolidated);
    }

    #[test]
    fn test_consolidate_adds_missing_rows() {
        let mut m = VariableSizeMatrix::new("S", 1);
        m.insert_new_row(0, &[0], &[1.0]);

        let mut remote = VariableSizeMatrix::new("remote", 1);
        remote.insert_new_row(5, &[5], &[2.0]);
        let mut distributor = LoopbackDistributor::new();
        distributor.push(remote.pack());

        m.consolidate(&[0, 5], &mut distributor).unwrap();
        assert_eq!(m.get_value(5, 5), Some(2.0));
        assert_eq!(m.get_value(0, 0), Some(1.0));
    }

    #[test]
    fn test_consolidate_propagates_distribution_errors() {
        let mut m = VariableSizeMatrix::new("S", 1);
        m.insert_new_row(0, &[0], &[1.0]);

        let err = m.consolidate(&[0], &mut FailingDistributor).unwrap_err();
        assert!(matches!(err, MatrixError::Distribution(_)));
        assert_ne!(m.state(), MatrixState::Consolidated);
    }
}
