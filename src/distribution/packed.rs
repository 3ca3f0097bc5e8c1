//! Flat row buffers exchanged between processes
//!
//! The layout mirrors CSR, with global ids in place of row numbers:
//! - gids: global id of each packed row
//! - row_ptr: `gids.len() + 1` offsets into `cols` and `vals`
//! - cols/vals: the entries of all rows, back to back

use tracing::trace;

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::{InsertMode, VariableSizeMatrix};

/// Rows of a matrix packed into flat arrays
#[derive(Debug, Clone, PartialEq)]
pub struct PackedRows {
    /// Global id of each row
    pub gids: Vec<usize>,
    /// Offsets of each row into `cols` and `vals`
    pub row_ptr: Vec<usize>,
    /// Column ids of all entries
    pub cols: Vec<usize>,
    /// Values of all entries
    pub vals: Vec<f64>,
}

impl Default for PackedRows {
    fn default() -> Self {
        Self {
            gids: Vec::new(),
            row_ptr: vec![0],
            cols: Vec::new(),
            vals: Vec::new(),
        }
    }
}

impl PackedRows {
    /// Number of packed rows
    pub fn n_rows(&self) -> usize {
        self.gids.len()
    }

    /// Number of packed entries
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Appends a row
    pub fn push_row(&mut self, gid: usize, cols: &[usize], vals: &[f64]) {
        assert_eq!(cols.len(), vals.len(), "cols.len() must equal vals.len()");
        self.gids.push(gid);
        self.cols.extend_from_slice(cols);
        self.vals.extend_from_slice(vals);
        self.row_ptr.push(self.cols.len());
    }

    /// Global id, column ids and values of packed row `i`
    pub fn row(&self, i: usize) -> (usize, &[usize], &[f64]) {
        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];
        (self.gids[i], &self.cols[start..end], &self.vals[start..end])
    }

    /// Checks that the arrays describe a consistent set of rows
    ///
    /// Buffers arrive from other processes, so inconsistencies are reported
    /// rather than asserted.
    pub fn validate(&self) -> MatrixResult<()> {
        if self.row_ptr.len() != self.gids.len() + 1 {
            return Err(MatrixError::MalformedPacket(format!(
                "row_ptr has {} entries for {} rows",
                self.row_ptr.len(),
                self.gids.len()
            )));
        }
        if self.cols.len() != self.vals.len() {
            return Err(MatrixError::MalformedPacket(format!(
                "{} column ids for {} values",
                self.cols.len(),
                self.vals.len()
            )));
        }
        if self.row_ptr[0] != 0 || self.row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(MatrixError::MalformedPacket(
                "row_ptr must start at 0 and never decrease".to_string(),
            ));
        }
        if self.row_ptr[self.gids.len()] != self.cols.len() {
            return Err(MatrixError::MalformedPacket(format!(
                "row_ptr ends at {} but {} entries are packed",
                self.row_ptr[self.gids.len()],
                self.cols.len()
            )));
        }
        Ok(())
    }
}

impl VariableSizeMatrix {
    /// Packs every row, in slot order
    pub fn pack(&self) -> PackedRows {
        let mut packed = PackedRows {
            gids: Vec::with_capacity(self.n()),
            row_ptr: Vec::with_capacity(self.n() + 1),
            cols: Vec::with_capacity(self.nnzmat()),
            vals: Vec::with_capacity(self.nnzmat()),
        };
        packed.row_ptr.push(0);
        for (gid, row) in self.iter_rows() {
            packed.push_row(gid, row.column_indexes(), row.values());
        }
        packed
    }

    /// Packs the rows in `gids` that this matrix holds
    pub fn pack_rows(&self, gids: &[usize]) -> PackedRows {
        let mut packed = PackedRows::default();
        for &gid in gids {
            if let Some(row) = self.row_by_gid(gid) {
                packed.push_row(gid, row.column_indexes(), row.values());
            }
        }
        packed
    }

    /// Merges packed rows into the rows this matrix already holds
    ///
    /// Packed rows without a local counterpart are ignored. Returns the
    /// number of rows merged.
    pub fn merge_packed(&mut self, packet: &PackedRows, mode: InsertMode) -> MatrixResult<usize> {
        packet.validate()?;

        let mut merged = 0;
        for i in 0..packet.n_rows() {
            let (gid, cols, vals) = packet.row(i);
            let Some(slot) = self.row_slot(gid) else {
                trace!(matrix = %self.name, gid, "skipping packed row without local counterpart");
                continue;
            };

            let row = self.row_mut(slot);
            for (&col, &val) in cols.iter().zip(vals) {
                row.insert_entry(col, val, mode, true);
            }
            merged += 1;
        }
        self.recount();
        Ok(merged)
    }
}
