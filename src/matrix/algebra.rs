//! Reductions and pattern-restricted products
//!
//! Products assume the right operand `B` is symmetric, so row `j` of `B`
//! doubles as its column `j`. Every kernel works on local rows only; rows a
//! process does not hold contribute nothing.

use hashbrown::HashMap;
use tracing::debug;

use crate::matrix::pattern::PatternMatrix;
use crate::matrix::row::{InsertMode, SparseRow};
use crate::matrix::variable_size::VariableSizeMatrix;

/// Sum of `a[k] * b[k]` over the columns both rows store
///
/// Iterates the shorter row and looks columns up in the longer one.
pub(crate) fn sparse_dot(a: &SparseRow, b: &SparseRow) -> f64 {
    let (short, long) = if b.nnz() < a.nnz() { (b, a) } else { (a, b) };
    short
        .iter()
        .map(|(col, val)| val * long.column_entry(col))
        .sum()
}

impl VariableSizeMatrix {
    /// Sum of the diagonal entries of all local rows
    pub fn trace(&self) -> f64 {
        self.iter_rows().map(|(gid, row)| row.column_entry(gid)).sum()
    }

    /// Sum of the diagonal entries of the rows at the given slots
    pub fn trace_rows(&self, slots: &[usize]) -> f64 {
        slots
            .iter()
            .map(|&slot| self.rows[slot].column_entry(self.lvars[slot]))
            .sum()
    }

    /// Computes `sum_i diag[i] * M[i][i]` over local slots
    ///
    /// # Panics
    ///
    /// Panics if `diag` does not have one entry per row.
    pub fn trace_diag_product(&self, diag: &[f64]) -> f64 {
        assert_eq!(diag.len(), self.n(), "diag must have one entry per row");
        self.iter_rows()
            .zip(diag)
            .map(|((gid, row), &d)| d * row.column_entry(gid))
            .sum()
    }

    /// Column id and magnitude of the largest off-diagonal entry of row `gid`
    ///
    /// Returns `None` if the row stores no nonzero off-diagonal entry.
    ///
    /// # Panics
    ///
    /// Panics if the matrix has no row `gid`.
    pub fn max_abs_off_diagonal_row_entry(&self, gid: usize) -> Option<(usize, f64)> {
        let row = self
            .row_by_gid(gid)
            .unwrap_or_else(|| panic!("row {} is not present in {}", gid, self.name));

        let mut best: Option<(usize, f64)> = None;
        for (col, val) in row.iter() {
            if col == gid {
                continue;
            }
            let magnitude = val.abs();
            if magnitude > best.map_or(0.0, |(_, m)| m) {
                best = Some((col, magnitude));
            }
        }
        best
    }

    /// Diagonal entry `row` of `A * B`, with `A = self` and `B` symmetric
    ///
    /// Returns 0 if either matrix lacks row `row`.
    pub fn amult_sym_b_diag(&self, b: &VariableSizeMatrix, row: usize) -> f64 {
        self.amult_sym_b_ij(b, row, row)
    }

    /// Entry `(row, col)` of `A * B`, with `A = self` and `B` symmetric
    ///
    /// Returns 0 if `A` lacks row `row` or `B` lacks row `col`.
    pub fn amult_sym_b_ij(&self, b: &VariableSizeMatrix, row: usize, col: usize) -> f64 {
        match (self.row_slot(row), b.row_slot(col)) {
            (Some(ra), Some(rb)) => sparse_dot(&self.rows[ra], &b.rows[rb]),
            _ => 0.0,
        }
    }

    /// Entries of row `slot` of `A * B`
    ///
    /// With a pattern only the columns it allows on this row are computed,
    /// so the work is bounded by the pattern rather than by `B`. Columns that
    /// receive no product term are left out.
    pub(crate) fn product_row(
        &self,
        slot: usize,
        b: &VariableSizeMatrix,
        pattern: Option<&PatternMatrix>,
        scratch: &mut HashMap<usize, f64>,
    ) -> Vec<(usize, f64)> {
        let a_row = &self.rows[slot];
        if a_row.is_empty() {
            return Vec::new();
        }

        scratch.clear();
        scratch.extend(a_row.iter());

        let row_product = |b_row: &SparseRow| -> Option<f64> {
            let mut hit = false;
            let mut val = 0.0;
            for (k, b_val) in b_row.iter() {
                if let Some(&a_val) = scratch.get(&k) {
                    val += a_val * b_val;
                    hit = true;
                }
            }
            hit.then_some(val)
        };

        match pattern {
            Some(pattern) => {
                let Some(allowed) = pattern.allowed_columns(self.lvars[slot]) else {
                    return Vec::new();
                };
                allowed
                    .iter()
                    .filter_map(|&col| {
                        let b_slot = b.row_slot(col)?;
                        row_product(&b.rows[b_slot]).map(|val| (col, val))
                    })
                    .collect()
            }
            None => b
                .iter_rows()
                .filter_map(|(col, b_row)| row_product(b_row).map(|val| (col, val)))
                .collect(),
        }
    }

    /// Computes `C = A * B` for every local row of `A = self`
    ///
    /// `B` must be symmetric. When `restrict` is set, product terms outside
    /// `pattern` are discarded before they reach `C`. Entries are written
    /// into `C` with [`InsertMode::Set`]; rows missing from `C` are appended.
    ///
    /// # Panics
    ///
    /// Panics if `B` has no rows.
    pub fn amult_sym_b(
        &self,
        b: &VariableSizeMatrix,
        c: &mut VariableSizeMatrix,
        pattern: &PatternMatrix,
        restrict: bool,
    ) {
        assert!(b.n() > 0, "B must have at least one row");
        let pattern = restrict.then_some(pattern);

        let mut scratch = HashMap::new();
        let mut written = 0;
        for slot in 0..self.n() {
            let entries = self.product_row(slot, b, pattern, &mut scratch);
            written += entries.len();
            c.write_row_entries(self.lvars[slot], &entries);
        }
        debug!(a = %self.name, b = %b.name, restrict, written, "amult_sym_b");
    }

    /// Like [`amult_sym_b`](Self::amult_sym_b), visiting only the rows in `gids`
    ///
    /// # Panics
    ///
    /// Panics if `B` has no rows or if a row in `gids` is not held by `A`.
    pub fn amult_sym_b_local(
        &self,
        b: &VariableSizeMatrix,
        c: &mut VariableSizeMatrix,
        gids: &[usize],
        pattern: &PatternMatrix,
        restrict: bool,
    ) {
        assert!(b.n() > 0, "B must have at least one row");
        let pattern = restrict.then_some(pattern);

        let mut scratch = HashMap::new();
        for &gid in gids {
            let slot = self
                .row_slot(gid)
                .unwrap_or_else(|| panic!("row {} is not present in {}", gid, self.name));
            let entries = self.product_row(slot, b, pattern, &mut scratch);
            c.write_row_entries(gid, &entries);
        }
    }

    /// Writes `entries` into row `gid`, appending the row if it is missing
    pub(crate) fn write_row_entries(&mut self, gid: usize, entries: &[(usize, f64)]) {
        if self.row_slot(gid).is_none() {
            self.insert_new_row(gid, &[], &[]);
        }
        for &(col, val) in entries {
            self.insert_matrix_element(gid, col, val, InsertMode::Set, false);
        }
    }

    /// Empties the rows whose flag in `keep` is false
    ///
    /// # Panics
    ///
    /// Panics if `keep` does not have one flag per row.
    pub fn sparsify(&mut self, keep: &[bool]) {
        assert_eq!(keep.len(), self.n(), "keep must have one flag per row");
        for (row, &kept) in self.rows.iter_mut().zip(keep) {
            if !kept {
                row.reset();
            }
        }
        self.recount();
    }

    /// Adds `alpha * B` to this matrix, matching rows by global id
    ///
    /// Rows of `B` that this matrix lacks are appended.
    pub fn axpy(&mut self, alpha: f64, b: &VariableSizeMatrix) {
        for (gid, b_row) in b.iter_rows() {
            let slot = match self.row_slot(gid) {
                Some(slot) => slot,
                None => self.insert_new_row(gid, &[], &[]),
            };
            self.rows[slot].axpy(b_row, alpha);
        }
        self.recount();
    }

    /// Computes `y = alpha * M * x + beta * y`
    ///
    /// `x` is indexed by column id and `y` by local slot.
    ///
    /// # Panics
    ///
    /// Panics if `y` does not have one entry per row or if a column id is out
    /// of range for `x`.
    pub fn gemv(&self, alpha: f64, x: &[f64], beta: f64, y: &mut [f64]) {
        assert_eq!(y.len(), self.n(), "y must have one entry per row");
        for (row, yk) in self.rows.iter().zip(y.iter_mut()) {
            *yk = beta * *yk + alpha * row.dot_vec(x);
        }
    }

    /// Multiplies every entry by `alpha`
    pub fn scale(&mut self, alpha: f64) {
        for row in &mut self.rows {
            row.scale(alpha);
        }
    }
}
