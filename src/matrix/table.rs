//! Global id to local slot lookup table

use hashbrown::HashMap;

/// Maps global ids to local slots `0..len()`
///
/// Slots are handed out in insertion order and stay stable until [`IndexTable::reset`].
/// Backed by an open-addressed hash map, so inserts and lookups are amortized O(1).
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    slots: HashMap<usize, usize>,
}

impl IndexTable {
    /// Creates an empty table with room for `capacity` ids
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the slot of `gid`, assigning the next free slot if it is new
    pub fn insert(&mut self, gid: usize) -> usize {
        let next = self.slots.len();
        *self.slots.entry(gid).or_insert(next)
    }

    /// Returns the slot of `gid`, or `None` if it has never been inserted
    #[inline]
    pub fn lookup(&self, gid: usize) -> Option<usize> {
        self.slots.get(&gid).copied()
    }

    /// Whether `gid` has a slot
    #[inline]
    pub fn contains(&self, gid: usize) -> bool {
        self.slots.contains_key(&gid)
    }

    /// Number of ids in the table
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of ids the table can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Forgets every id while keeping the allocated buckets
    pub fn reset(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_slots() {
        let mut table = IndexTable::with_capacity(4);
        assert_eq!(table.insert(42), 0);
        assert_eq!(table.insert(7), 1);
        assert_eq!(table.insert(1000), 2);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_insert_existing_returns_same_slot() {
        let mut table = IndexTable::default();
        table.insert(5);
        table.insert(9);
        assert_eq!(table.insert(5), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_lookup_miss() {
        let mut table = IndexTable::default();
        table.insert(3);
        assert_eq!(table.lookup(3), Some(0));
        assert_eq!(table.lookup(4), None);
        assert!(!table.contains(4));
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut table = IndexTable::with_capacity(64);
        for gid in 0..50 {
            table.insert(gid * 3);
        }
        let capacity = table.capacity();

        table.reset();

        assert!(table.is_empty());
        assert_eq!(table.lookup(0), None);
        assert_eq!(table.capacity(), capacity);
        // Slots restart from zero
        assert_eq!(table.insert(99), 0);
    }
}
