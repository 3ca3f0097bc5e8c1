//! Variable-size sparse matrix indexed by global row ids
//!
//! Rows live in an arena addressed by local slot. The slot of a row is fixed
//! from the moment it is appended until the next [`VariableSizeMatrix::reset`];
//! `lvars[slot]` holds the row's global id and the [`IndexTable`] maps back.

use std::fmt;
use std::io::Write;

use tracing::{debug, trace};

use crate::error::MatrixResult;
use crate::matrix::config::{MatrixConfig, MIN_MAT_SIZE};
use crate::matrix::row::{InsertMode, RowKind, SparseRow};
use crate::matrix::table::IndexTable;

/// Lifecycle of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixState {
    /// No rows
    Empty,
    /// Rows are being appended or filled
    Building,
    /// Local contributions are complete
    Assembled,
    /// Remote contributions have been merged in
    Consolidated,
}

/// A growable sparse matrix whose rows and columns are global ids
#[derive(Clone)]
pub struct VariableSizeMatrix {
    pub(crate) name: String,
    pub(crate) kind: RowKind,
    pub(crate) rows: Vec<SparseRow>,
    pub(crate) lvars: Vec<usize>,
    pub(crate) table: IndexTable,
    pub(crate) totnnz: usize,
    pub(crate) nzmax: usize,
    pub(crate) state: MatrixState,
}

impl VariableSizeMatrix {
    /// Creates an empty matrix with plain rows, reserving room for `capacity` rows
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self::with_kind(name, capacity, RowKind::Plain)
    }

    /// Creates an empty matrix whose rows are built as `kind`
    pub fn with_kind(name: impl Into<String>, capacity: usize, kind: RowKind) -> Self {
        let reserve = capacity.max(MIN_MAT_SIZE);
        Self {
            name: name.into(),
            kind,
            rows: Vec::with_capacity(reserve),
            lvars: Vec::with_capacity(reserve),
            table: IndexTable::with_capacity(capacity),
            totnnz: 0,
            nzmax: 0,
            state: MatrixState::Empty,
        }
    }

    /// Creates an empty matrix sized from `config`
    pub fn from_config(name: impl Into<String>, config: &MatrixConfig) -> Self {
        Self::new(name, config.initial_capacity)
    }

    /// Copies `src` into a matrix whose rows are built as `kind`
    pub fn converted(src: &VariableSizeMatrix, kind: RowKind) -> Self {
        let mut dst = Self::with_kind(format!("{}_copy", src.name), src.n(), kind);
        dst.copy_rows_from(src, src.n());
        dst
    }

    /// Name given at construction
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the rows this matrix builds
    pub fn row_kind(&self) -> RowKind {
        self.kind
    }

    /// Number of rows
    #[inline]
    pub fn n(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of stored entries
    #[inline]
    pub fn nnzmat(&self) -> usize {
        self.totnnz
    }

    /// Largest number of entries in a single row, as of the last recount
    pub fn nzmax(&self) -> usize {
        self.nzmax
    }

    /// Number of entries in the row at `slot`
    #[inline]
    pub fn nnz_row(&self, slot: usize) -> usize {
        self.rows[slot].nnz()
    }

    /// Current lifecycle state
    pub fn state(&self) -> MatrixState {
        self.state
    }

    /// Declares that local assembly is complete
    pub fn mark_assembled(&mut self) {
        self.transition(MatrixState::Assembled);
    }

    pub(crate) fn transition(&mut self, next: MatrixState) {
        if self.state != next {
            trace!(matrix = %self.name, from = ?self.state, to = ?next, "state change");
            self.state = next;
        }
    }

    fn begin_building(&mut self) {
        if self.state == MatrixState::Empty {
            self.transition(MatrixState::Building);
        }
    }

    /// Global ids of the rows, by slot
    pub fn lvars(&self) -> &[usize] {
        &self.lvars
    }

    /// Global id of the row at `slot`
    #[inline]
    pub fn global_index(&self, slot: usize) -> usize {
        self.lvars[slot]
    }

    /// Slot of the row with global id `gid`
    #[inline]
    pub fn row_slot(&self, gid: usize) -> Option<usize> {
        self.table.lookup(gid)
    }

    /// Row at `slot`
    #[inline]
    pub fn row(&self, slot: usize) -> &SparseRow {
        &self.rows[slot]
    }

    /// Row with global id `gid`
    pub fn row_by_gid(&self, gid: usize) -> Option<&SparseRow> {
        self.row_slot(gid).map(|slot| &self.rows[slot])
    }

    /// Iterates over `(global id, row)` in slot order
    pub fn iter_rows(&self) -> impl Iterator<Item = (usize, &SparseRow)> + '_ {
        self.lvars.iter().copied().zip(self.rows.iter())
    }

    /// Position of column `col` in the row at `slot`
    #[inline]
    pub fn column_position(&self, slot: usize, col: usize) -> Option<usize> {
        self.rows[slot].column_position(col)
    }

    /// Value at `(row, col)` given as global ids
    pub fn get_value(&self, row: usize, col: usize) -> Option<f64> {
        let slot = self.row_slot(row)?;
        let row = &self.rows[slot];
        row.column_position(col).map(|pos| row.entry_at(pos))
    }

    /// Values of the row at `slot` for each of `cols` (0 where absent)
    pub fn row_values(&self, slot: usize, cols: &[usize]) -> Vec<f64> {
        let row = &self.rows[slot];
        cols.iter().map(|&col| row.column_entry(col)).collect()
    }

    fn push_row(&mut self, gid: usize, row: SparseRow) -> usize {
        let slot = self.table.insert(gid);
        assert_eq!(slot, self.rows.len(), "row {} is already present", gid);

        self.totnnz += row.nnz();
        self.nzmax = self.nzmax.max(row.nnz());
        self.rows.push(row);
        self.lvars.push(gid);
        slot
    }

    /// Appends a new row with global id `gid`; empty rows are allowed
    ///
    /// Returns the slot of the new row.
    ///
    /// # Panics
    ///
    /// Panics if a row with id `gid` already exists or if `cols` and `vals`
    /// differ in length.
    pub fn insert_new_row(&mut self, gid: usize, cols: &[usize], vals: &[f64]) -> usize {
        let row = SparseRow::from_entries(self.kind, cols, vals);
        self.begin_building();
        self.push_row(gid, row)
    }

    /// Inserts `val` at `(row, col)`
    ///
    /// A missing row is appended when `create_row` is set; otherwise the call
    /// does nothing for unknown rows. Missing entries in an existing row are
    /// always created.
    pub fn insert_matrix_element(
        &mut self,
        row: usize,
        col: usize,
        val: f64,
        mode: InsertMode,
        create_row: bool,
    ) {
        let slot = match self.row_slot(row) {
            Some(slot) => slot,
            None if create_row => {
                self.begin_building();
                self.push_row(row, SparseRow::new(self.kind))
            }
            None => return,
        };

        let target = &mut self.rows[slot];
        if target.insert_entry(col, val, mode, true) {
            self.totnnz += 1;
            self.nzmax = self.nzmax.max(target.nnz());
        }
    }

    /// Resets the matrix and declares one empty row per id in `gids`
    pub fn setup_sparse_rows(&mut self, gids: &[usize]) {
        if !self.is_empty() {
            self.reset();
        }
        for &gid in gids {
            self.push_row(gid, SparseRow::new(self.kind));
        }
        self.begin_building();
    }

    /// Replaces every row by the matching row of the identity
    ///
    /// # Panics
    ///
    /// Panics if the matrix has no rows.
    pub fn set_to_identity(&mut self) {
        assert!(self.n() > 0, "set_to_identity needs at least one row");
        assert_eq!(self.n(), self.table.len());

        for (row, &gid) in self.rows.iter_mut().zip(&self.lvars) {
            row.reset();
            row.insert_entry(gid, 1.0, InsertMode::Add, true);
        }
        self.totnnz = self.n();
        self.nzmax = 1;
    }

    /// Replaces the contents with the first `m` rows of `src`
    pub fn copy_rows_from(&mut self, src: &VariableSizeMatrix, m: usize) {
        assert!(m <= src.n(), "cannot copy {} rows from a matrix with {}", m, src.n());
        if !self.is_empty() {
            self.reset();
        }

        for slot in 0..m {
            let row = if src.kind == self.kind {
                src.rows[slot].clone()
            } else {
                src.rows[slot].to_kind(self.kind)
            };
            self.push_row(src.lvars[slot], row);
        }
        self.state = if m == 0 { MatrixState::Empty } else { src.state };
    }

    /// Drops all rows and the index table, keeping allocations for reuse
    pub fn reset(&mut self) {
        debug!(matrix = %self.name, rows = self.n(), nnz = self.totnnz, "reset");
        self.lvars.clear();
        self.rows.clear();
        self.table.reset();
        self.totnnz = 0;
        self.nzmax = 0;
        self.transition(MatrixState::Empty);
    }

    /// Empties every row but keeps the rows themselves
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.reset();
        }
        self.totnnz = 0;
        self.nzmax = 0;
    }

    /// Removes entries with magnitude at or below `tol` from every row
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, tol: f64) -> usize {
        let removed: usize = self.rows.iter_mut().map(|row| row.prune(tol)).sum();
        self.recount();
        debug!(matrix = %self.name, tol, removed, "pruned");
        removed
    }

    /// Sorts the entries of every row by column id
    pub fn sort_columns(&mut self) {
        for row in &mut self.rows {
            row.sort_by_column();
        }
    }

    /// Recomputes `nnzmat` and `nzmax` from the rows
    pub(crate) fn recount(&mut self) {
        self.totnnz = self.rows.iter().map(SparseRow::nnz).sum();
        self.nzmax = self.rows.iter().map(SparseRow::nnz).max().unwrap_or(0);
    }

    /// Mutable access to the row at `slot`
    ///
    /// Callers that change the entry count must follow up with a recount,
    /// which the matrix-level mutators do on their own.
    pub(crate) fn row_mut(&mut self, slot: usize) -> &mut SparseRow {
        &mut self.rows[slot]
    }

    /// Writes one `<row> <col> <value>` line per stored entry, in local order
    pub fn write_csr<W: Write>(&self, out: &mut W) -> MatrixResult<()> {
        for (gid, row) in self.iter_rows() {
            for (col, val) in row.iter() {
                writeln!(out, "{} {} {:.8e}", gid, col, val)?;
            }
        }
        Ok(())
    }

    /// Like [`write_csr`](Self::write_csr) restricted to the rows in `gids`
    ///
    /// Ids without a local row are skipped.
    pub fn write_rows<W: Write>(&self, out: &mut W, gids: &[usize]) -> MatrixResult<()> {
        for &gid in gids {
            let Some(row) = self.row_by_gid(gid) else {
                continue;
            };
            for (col, val) in row.iter() {
                writeln!(out, "{} {} {:.20e}", gid, col, val)?;
            }
        }
        Ok(())
    }

    /// Writes the entries of the 2x2 block spanned by `gid0` and `gid1`
    pub fn write_block2<W: Write>(&self, gid0: usize, gid1: usize, out: &mut W) -> MatrixResult<()> {
        for (gid, row) in self.iter_rows() {
            if gid != gid0 && gid != gid1 {
                continue;
            }
            for (col, val) in row.iter() {
                if col == gid0 || col == gid1 {
                    writeln!(out, "S({},{})={}", gid, col, val)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for VariableSizeMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "VariableSizeMatrix {} {{", self.name)?;
        writeln!(f, "  rows: {}", self.n())?;
        writeln!(f, "  nnz: {} (max per row: {})", self.totnnz, self.nzmax)?;
        writeln!(f, "  state: {:?}", self.state)?;

        let max_rows_to_print = 5.min(self.n());
        for slot in 0..max_rows_to_print {
            write!(f, "    row {}: ", self.lvars[slot])?;
            let row = &self.rows[slot];
            if row.is_empty() {
                writeln!(f, "(empty)")?;
                continue;
            }

            let max_elements = 5.min(row.nnz());
            for (col, val) in row.iter().take(max_elements) {
                write!(f, "({}, {:?}) ", col, val)?;
            }
            if row.nnz() > max_elements {
                write!(f, "... ({} more)", row.nnz() - max_elements)?;
            }
            writeln!(f)?;
        }
        if self.n() > max_rows_to_print {
            writeln!(f, "    ... ({} more rows)", self.n() - max_rows_to_print)?;
        }

        write!(f, "}}")
    }
}
