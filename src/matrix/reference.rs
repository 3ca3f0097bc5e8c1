//! Dense reference for the symmetric products
//!
//! This provides a baseline for correctness testing: both operands are
//! expanded to dense `ndarray` matrices, multiplied, and the result is read
//! back into a variable-size matrix holding the rows of `A`.

use ndarray::Array2;

use crate::matrix::variable_size::VariableSizeMatrix;
use crate::utils::to_dense;

/// Computes `A * B` densely over ids `0..dim`, keeping only the rows of `A`
///
/// Exact zeros of the dense product are not stored.
pub fn reference_amult_sym_b(
    a: &VariableSizeMatrix,
    b: &VariableSizeMatrix,
    dim: usize,
) -> VariableSizeMatrix {
    let dense_a = to_dense(a, dim);
    let dense_b = to_dense(b, dim);
    let product: Array2<f64> = dense_a.dot(&dense_b);

    let mut c = VariableSizeMatrix::new(format!("{}*{}", a.name(), b.name()), a.n());
    for &gid in a.lvars() {
        let (cols, vals): (Vec<usize>, Vec<f64>) = product
            .row(gid)
            .iter()
            .enumerate()
            .filter(|&(_, &val)| val != 0.0)
            .map(|(col, &val)| (col, val))
            .unzip();
        c.insert_new_row(gid, &cols, &vals);
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_multiplication() {
        // A = [1 2; 0 3]
        // B = [4 5; 5 7]
        // Expected result: C = A*B = [14 19; 15 21]
        let mut a = VariableSizeMatrix::new("A", 2);
        a.insert_new_row(0, &[0, 1], &[1.0, 2.0]);
        a.insert_new_row(1, &[1], &[3.0]);

        let mut b = VariableSizeMatrix::new("B", 2);
        b.insert_new_row(0, &[0, 1], &[4.0, 5.0]);
        b.insert_new_row(1, &[0, 1], &[5.0, 7.0]);

        let c = reference_amult_sym_b(&a, &b, 2);

        assert_eq!(c.n(), 2);
        assert_eq!(c.get_value(0, 0), Some(14.0));
        assert_eq!(c.get_value(0, 1), Some(19.0));
        assert_eq!(c.get_value(1, 0), Some(15.0));
        assert_eq!(c.get_value(1, 1), Some(21.0));
    }

    #[test]
    fn test_reference_keeps_only_rows_of_a() {
        let mut a = VariableSizeMatrix::new("A", 1);
        a.insert_new_row(2, &[0], &[1.0]);

        let mut b = VariableSizeMatrix::new("B", 3);
        b.setup_sparse_rows(&[0, 1, 2]);
        b.set_to_identity();

        let c = reference_amult_sym_b(&a, &b, 3);
        assert_eq!(c.lvars(), &[2]);
        assert_eq!(c.get_value(2, 0), Some(1.0));
        assert_eq!(c.nnzmat(), 1);
    }
}
