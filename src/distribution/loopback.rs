//! In-process distributor fed with packets from peers
//!
//! Useful for single-process runs and tests: whatever the peers would have
//! sent is queued up front, then merged on the next exchange.

use tracing::debug;

use crate::distribution::{DataDistribution, PackedRows};
use crate::error::MatrixResult;
use crate::matrix::{InsertMode, VariableSizeMatrix};

/// A [`DataDistribution`] that delivers queued packets
#[derive(Debug, Clone, Default)]
pub struct LoopbackDistributor {
    inbox: Vec<PackedRows>,
}

impl LoopbackDistributor {
    /// Creates a distributor with nothing to deliver
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a distributor delivering the rows of each peer matrix
    pub fn from_peers<'a, I>(peers: I) -> Self
    where
        I: IntoIterator<Item = &'a VariableSizeMatrix>,
    {
        Self {
            inbox: peers.into_iter().map(VariableSizeMatrix::pack).collect(),
        }
    }

    /// Queues a packet for the next exchange
    pub fn push(&mut self, packet: PackedRows) {
        self.inbox.push(packet);
    }

    /// Number of packets waiting
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl DataDistribution for LoopbackDistributor {
    fn update_local_rows(
        &mut self,
        matrix: &mut VariableSizeMatrix,
        consolidate: bool,
    ) -> MatrixResult<()> {
        let mode = if consolidate {
            InsertMode::Add
        } else {
            InsertMode::Set
        };

        for packet in self.inbox.drain(..) {
            let merged = matrix.merge_packed(&packet, mode)?;
            debug!(matrix = %matrix.name(), rows = packet.n_rows(), merged, "delivered packet");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivers_once() {
        let mut peer = VariableSizeMatrix::new("peer", 1);
        peer.insert_new_row(0, &[0], &[1.0]);

        let mut distributor = LoopbackDistributor::from_peers([&peer, &peer]);
        assert_eq!(distributor.pending(), 2);

        let mut m = VariableSizeMatrix::new("S", 1);
        m.insert_new_row(0, &[0], &[1.0]);
        distributor.update_local_rows(&mut m, true).unwrap();

        assert_eq!(m.get_value(0, 0), Some(3.0));
        assert_eq!(distributor.pending(), 0);

        distributor.update_local_rows(&mut m, true).unwrap();
        assert_eq!(m.get_value(0, 0), Some(3.0));
    }

    #[test]
    fn test_overwrite_without_consolidate() {
        let mut peer = VariableSizeMatrix::new("peer", 1);
        peer.insert_new_row(0, &[0], &[7.0]);

        let mut distributor = LoopbackDistributor::from_peers([&peer]);
        let mut m = VariableSizeMatrix::new("S", 1);
        m.insert_new_row(0, &[0], &[1.0]);
        distributor.update_local_rows(&mut m, false).unwrap();

        assert_eq!(m.get_value(0, 0), Some(7.0));
    }
}
