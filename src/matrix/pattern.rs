//! Sparsity templates for restricted products

use std::ops::Deref;

use crate::matrix::row::RowKind;
use crate::matrix::variable_size::VariableSizeMatrix;

/// A matrix whose rows carry a column -> position index
///
/// Used as the template bounding which `(row, col)` pairs a restricted
/// product may write. It only hands out shared access to the underlying
/// matrix, so arithmetic never modifies it once built.
#[derive(Debug, Clone)]
pub struct PatternMatrix {
    inner: VariableSizeMatrix,
}

impl PatternMatrix {
    /// Creates an empty pattern with room for `capacity` rows
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            inner: VariableSizeMatrix::with_kind(name, capacity, RowKind::Indexed),
        }
    }

    /// Builds a pattern holding the structure and values of `matrix`
    pub fn from_matrix(matrix: &VariableSizeMatrix) -> Self {
        let mut inner = VariableSizeMatrix::with_kind(matrix.name(), matrix.n(), RowKind::Indexed);
        inner.copy_rows_from(matrix, matrix.n());
        Self { inner }
    }

    /// Adds a row allowing the columns `cols`
    pub fn insert_row(&mut self, gid: usize, cols: &[usize]) -> usize {
        let ones = vec![1.0; cols.len()];
        self.inner.insert_new_row(gid, cols, &ones)
    }

    /// Adds a row with explicit values, for patterns also used as operands
    pub fn insert_row_with_values(&mut self, gid: usize, cols: &[usize], vals: &[f64]) -> usize {
        self.inner.insert_new_row(gid, cols, vals)
    }

    /// Whether the pattern allows `(row, col)`
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.inner
            .row_slot(row)
            .map_or(false, |slot| self.inner.column_position(slot, col).is_some())
    }

    /// Columns allowed on row `gid`, or `None` if the pattern has no such row
    pub fn allowed_columns(&self, gid: usize) -> Option<&[usize]> {
        self.inner.row_by_gid(gid).map(|row| row.column_indexes())
    }

    /// The underlying matrix
    pub fn as_matrix(&self) -> &VariableSizeMatrix {
        &self.inner
    }
}

impl Deref for PatternMatrix {
    type Target = VariableSizeMatrix;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<&VariableSizeMatrix> for PatternMatrix {
    fn from(matrix: &VariableSizeMatrix) -> Self {
        Self::from_matrix(matrix)
    }
}
