//! Utilities for converting between variable-size matrices and external libraries
//!
//! Global ids become plain row/column indices, so every id must be below the
//! `dim` given to the conversion.

use ndarray::Array2;
use sprs::{CsMat, TriMat};

use crate::matrix::VariableSizeMatrix;

/// Expands the local rows of `matrix` into a dense `dim x dim` array
///
/// Rows the matrix does not hold stay zero.
///
/// # Panics
///
/// Panics if a row or column id is not below `dim`.
pub fn to_dense(matrix: &VariableSizeMatrix, dim: usize) -> Array2<f64> {
    let mut dense = Array2::zeros((dim, dim));
    for (gid, row) in matrix.iter_rows() {
        for (col, val) in row.iter() {
            dense[[gid, col]] = val;
        }
    }
    dense
}

/// Converts the local rows of `matrix` to a `dim x dim` sprs CSR matrix
pub fn to_sprs_csr(matrix: &VariableSizeMatrix, dim: usize) -> CsMat<f64> {
    let mut triplets = TriMat::with_capacity((dim, dim), matrix.nnzmat());
    for (gid, row) in matrix.iter_rows() {
        for (col, val) in row.iter() {
            triplets.add_triplet(gid, col, val);
        }
    }
    triplets.to_csr::<usize>()
}

/// Converts an sprs matrix to a variable-size matrix with one row per non-empty row
///
/// Row and column indices become global ids; columns keep sprs order.
pub fn from_sprs_csr(matrix: &CsMat<f64>, name: &str) -> VariableSizeMatrix {
    let owned;
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        owned = matrix.to_csr();
        &owned
    };

    let mut result = VariableSizeMatrix::new(name, matrix.rows());
    for (gid, row) in matrix.outer_iterator().enumerate() {
        if row.nnz() == 0 {
            continue;
        }
        let (cols, vals): (Vec<usize>, Vec<f64>) = row.iter().map(|(col, &val)| (col, val)).unzip();
        result.insert_new_row(gid, &cols, &vals);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VariableSizeMatrix {
        //    [1 2 0]
        //    [0 0 0]
        //    [4 0 5]
        let mut m = VariableSizeMatrix::new("S", 2);
        m.insert_new_row(2, &[2, 0], &[5.0, 4.0]);
        m.insert_new_row(0, &[0, 1], &[1.0, 2.0]);
        m
    }

    #[test]
    fn test_to_dense() {
        let dense = to_dense(&sample(), 3);
        assert_eq!(dense[[0, 1]], 2.0);
        assert_eq!(dense[[2, 0]], 4.0);
        assert_eq!(dense[[1, 1]], 0.0);
    }

    #[test]
    fn test_sprs_roundtrip() {
        let original = sample();

        let sprs_mat = to_sprs_csr(&original, 3);
        assert_eq!(sprs_mat.nnz(), 4);
        assert_eq!(sprs_mat.indptr().as_slice().unwrap(), &[0, 2, 2, 4]);

        let roundtrip = from_sprs_csr(&sprs_mat, "roundtrip");
        assert_eq!(roundtrip.n(), 2);
        for (gid, row) in original.iter_rows() {
            let mut expected: Vec<_> = row.iter().collect();
            let mut actual: Vec<_> = roundtrip.row_by_gid(gid).unwrap().iter().collect();
            expected.sort_by_key(|&(col, _)| col);
            actual.sort_by_key(|&(col, _)| col);
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_from_csc_input() {
        let csc = to_sprs_csr(&sample(), 3).to_csc();
        let m = from_sprs_csr(&csc, "from_csc");
        assert_eq!(m.get_value(2, 0), Some(4.0));
        assert_eq!(m.get_value(0, 1), Some(2.0));
    }
}
