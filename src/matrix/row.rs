//! Storage for a single sparse row
//!
//! A row keeps its entries as two parallel arrays in insertion order:
//! - cols: global column ids
//! - vals: the matching values
//!
//! Rows built as [`RowKind::Indexed`] also keep a column id -> position map,
//! which turns column-keyed lookups from a scan into a hash probe.

use hashbrown::HashMap;

/// How an entry is combined with an existing value at the same column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Sum into the existing value
    Add,
    /// Replace the existing value
    Set,
}

/// Whether a row carries a structural column index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKind {
    /// Column lookups scan the row
    #[default]
    Plain,
    /// Column lookups go through a column -> position map
    Indexed,
}

/// A sparse row of (column id, value) pairs
#[derive(Debug, Clone, Default)]
pub struct SparseRow {
    cols: Vec<usize>,
    vals: Vec<f64>,
    positions: Option<HashMap<usize, usize>>,
}

impl SparseRow {
    /// Creates an empty row of the given kind
    pub fn new(kind: RowKind) -> Self {
        Self {
            cols: Vec::new(),
            vals: Vec::new(),
            positions: match kind {
                RowKind::Plain => None,
                RowKind::Indexed => Some(HashMap::new()),
            },
        }
    }

    /// Creates a row holding the given entries
    ///
    /// # Panics
    ///
    /// Panics if `cols` and `vals` differ in length.
    pub fn from_entries(kind: RowKind, cols: &[usize], vals: &[f64]) -> Self {
        let mut row = Self::new(kind);
        row.assign(cols, vals);
        row
    }

    /// The kind this row was built as
    pub fn kind(&self) -> RowKind {
        if self.positions.is_some() {
            RowKind::Indexed
        } else {
            RowKind::Plain
        }
    }

    /// Copies the entries of this row into a row of another kind
    pub fn to_kind(&self, kind: RowKind) -> Self {
        Self::from_entries(kind, &self.cols, &self.vals)
    }

    /// Replaces the contents of the row
    ///
    /// No de-duplication is done; the caller guarantees unique column ids.
    pub fn assign(&mut self, cols: &[usize], vals: &[f64]) {
        assert_eq!(cols.len(), vals.len(), "cols.len() must equal vals.len()");

        self.cols.clear();
        self.cols.extend_from_slice(cols);
        self.vals.clear();
        self.vals.extend_from_slice(vals);

        if let Some(positions) = self.positions.as_mut() {
            positions.clear();
            positions.extend(cols.iter().enumerate().map(|(pos, &col)| (col, pos)));
        }
    }

    /// Inserts `val` at column `col`
    ///
    /// An existing entry is combined according to `mode`. A missing entry is
    /// appended only when `create_if_absent` is set, otherwise nothing happens.
    /// Returns `true` if a new entry was created.
    pub fn insert_entry(
        &mut self,
        col: usize,
        val: f64,
        mode: InsertMode,
        create_if_absent: bool,
    ) -> bool {
        match self.column_position(col) {
            Some(pos) => {
                match mode {
                    InsertMode::Add => self.vals[pos] += val,
                    InsertMode::Set => self.vals[pos] = val,
                }
                false
            }
            None if create_if_absent => {
                self.push(col, val);
                true
            }
            None => false,
        }
    }

    fn push(&mut self, col: usize, val: f64) {
        if let Some(positions) = self.positions.as_mut() {
            positions.insert(col, self.cols.len());
        }
        self.cols.push(col);
        self.vals.push(val);
    }

    /// Number of stored entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.cols.len()
    }

    /// Whether the row stores no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    /// Column id of the entry at position `pos`
    #[inline]
    pub fn column_index(&self, pos: usize) -> usize {
        self.cols[pos]
    }

    /// Value of the entry at position `pos`
    #[inline]
    pub fn entry_at(&self, pos: usize) -> f64 {
        self.vals[pos]
    }

    /// Column ids in storage order
    pub fn column_indexes(&self) -> &[usize] {
        &self.cols
    }

    /// Values in storage order
    pub fn values(&self) -> &[f64] {
        &self.vals
    }

    /// Iterates over `(column id, value)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.cols.iter().copied().zip(self.vals.iter().copied())
    }

    /// Position of column `col`, if present
    #[inline]
    pub fn column_position(&self, col: usize) -> Option<usize> {
        match &self.positions {
            Some(positions) => positions.get(&col).copied(),
            None => self.cols.iter().position(|&c| c == col),
        }
    }

    /// Value stored at column `col`, or 0 if absent
    #[inline]
    pub fn column_entry(&self, col: usize) -> f64 {
        self.column_position(col).map_or(0.0, |pos| self.vals[pos])
    }

    /// Dot product with a dense vector indexed by column id
    ///
    /// # Panics
    ///
    /// Panics if a stored column id is out of range for `x`.
    pub fn dot_vec(&self, x: &[f64]) -> f64 {
        self.iter().map(|(col, val)| val * x[col]).sum()
    }

    /// Adds `alpha * other` to this row, creating entries as needed
    ///
    /// Columns missing on either side count as zero.
    pub fn axpy(&mut self, other: &SparseRow, alpha: f64) {
        for (col, val) in other.iter() {
            self.insert_entry(col, alpha * val, InsertMode::Add, true);
        }
    }

    /// Multiplies every value by `alpha`
    pub fn scale(&mut self, alpha: f64) {
        for val in &mut self.vals {
            *val *= alpha;
        }
    }

    /// Removes entries with magnitude at or below `tol`; returns how many went
    pub fn prune(&mut self, tol: f64) -> usize {
        let before = self.cols.len();
        let mut keep = 0;
        for pos in 0..before {
            if self.vals[pos].abs() > tol {
                self.cols[keep] = self.cols[pos];
                self.vals[keep] = self.vals[pos];
                keep += 1;
            }
        }
        self.cols.truncate(keep);
        self.vals.truncate(keep);
        self.rebuild_positions();
        before - keep
    }

    /// Reorders entries by increasing column id
    pub fn sort_by_column(&mut self) {
        let mut entries: Vec<(usize, f64)> = self.iter().collect();
        entries.sort_by_key(|&(col, _)| col);
        for (pos, (col, val)) in entries.into_iter().enumerate() {
            self.cols[pos] = col;
            self.vals[pos] = val;
        }
        self.rebuild_positions();
    }

    fn rebuild_positions(&mut self) {
        if let Some(positions) = self.positions.as_mut() {
            positions.clear();
            positions.extend(self.cols.iter().enumerate().map(|(pos, &col)| (col, pos)));
        }
    }

    /// Empties the row, keeping its allocations and kind
    pub fn reset(&mut self) {
        self.cols.clear();
        self.vals.clear();
        if let Some(positions) = self.positions.as_mut() {
            positions.clear();
        }
    }
}
