//! Dense per-subdomain blocks feeding bulk assembly
//!
//! Each subdomain ("subdivision") enumerates its locally active functions by
//! color. A block holds the dense values for every (icolor, jcolor) pair of
//! that subdomain.

use ndarray::{Array2, Zip};
use num_traits::Float;

/// Source of dense local blocks consumed by bulk assembly
pub trait LocalBlockSource {
    /// Number of subdomains
    fn subdivisions(&self) -> usize;

    /// Number of colors enumerated by each subdomain
    fn colors(&self) -> usize;

    /// Value for the pair `(icolor, jcolor)` on subdomain `iloc`
    fn value(&self, iloc: usize, icolor: usize, jcolor: usize) -> f64;
}

/// One dense square block per subdomain
#[derive(Debug, Clone)]
pub struct LocalMatrices<T> {
    blocks: Vec<Array2<T>>,
    m: usize,
    n: usize,
}

impl<T> LocalMatrices<T>
where
    T: Float,
{
    /// Creates `subdiv` zero blocks of shape `m x n`
    ///
    /// # Panics
    ///
    /// Panics if `subdiv` is zero.
    pub fn new(subdiv: usize, m: usize, n: usize) -> Self {
        assert!(subdiv >= 1, "at least one subdomain is required");
        Self {
            blocks: (0..subdiv).map(|_| Array2::zeros((m, n))).collect(),
            m,
            n,
        }
    }

    /// Wraps existing blocks
    ///
    /// # Panics
    ///
    /// Panics if `blocks` is empty or the blocks differ in shape.
    pub fn from_blocks(blocks: Vec<Array2<T>>) -> Self {
        assert!(!blocks.is_empty(), "at least one subdomain is required");
        let (m, n) = blocks[0].dim();
        for block in &blocks {
            assert_eq!(block.dim(), (m, n), "all blocks must have the same shape");
        }
        Self { blocks, m, n }
    }

    /// Number of subdomains
    pub fn subdiv(&self) -> usize {
        self.blocks.len()
    }

    /// Block rows
    pub fn m(&self) -> usize {
        self.m
    }

    /// Block columns
    pub fn n(&self) -> usize {
        self.n
    }

    /// Block of subdomain `iloc`
    pub fn block(&self, iloc: usize) -> &Array2<T> {
        &self.blocks[iloc]
    }

    /// Mutable block of subdomain `iloc`
    pub fn block_mut(&mut self, iloc: usize) -> &mut Array2<T> {
        &mut self.blocks[iloc]
    }

    /// Sets entry `(i, j)` of block `iloc`
    pub fn set(&mut self, iloc: usize, i: usize, j: usize, val: T) {
        self.blocks[iloc][[i, j]] = val;
    }

    /// Multiplies every block elementwise by the matching block of `mask`
    pub fn apply_mask(&mut self, mask: &LocalMatrices<T>) {
        assert_eq!(self.subdiv(), mask.subdiv(), "mask must have the same subdomains");
        for (block, mask_block) in self.blocks.iter_mut().zip(&mask.blocks) {
            assert_eq!(block.dim(), mask_block.dim(), "mask blocks must match in shape");
            Zip::from(block).and(mask_block).for_each(|v, &m| *v = *v * m);
        }
    }

    /// Turns the blocks into a 0/1 mask: 1 inside `[min, max]`, 0 outside
    pub fn set_mask_threshold(&mut self, min_threshold: T, max_threshold: T) {
        for block in &mut self.blocks {
            block.mapv_inplace(|v| {
                if v > max_threshold || v < min_threshold {
                    T::zero()
                } else {
                    T::one()
                }
            });
        }
    }
}

impl<T> LocalBlockSource for LocalMatrices<T>
where
    T: Float,
{
    fn subdivisions(&self) -> usize {
        self.blocks.len()
    }

    fn colors(&self) -> usize {
        assert_eq!(self.m, self.n, "assembly needs square blocks");
        self.m
    }

    fn value(&self, iloc: usize, icolor: usize, jcolor: usize) -> f64 {
        self.blocks[iloc][[icolor, jcolor]].to_f64().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_blocks_are_zero() {
        let blocks = LocalMatrices::<f64>::new(2, 3, 3);
        assert_eq!(blocks.subdiv(), 2);
        assert_eq!(blocks.colors(), 3);
        assert_eq!(blocks.value(1, 2, 2), 0.0);
    }

    #[test]
    fn test_value_reads_row_major_pair() {
        let blocks = LocalMatrices::from_blocks(vec![array![[1.0f32, 2.0], [3.0, 4.0]]]);
        assert_eq!(blocks.value(0, 0, 1), 2.0);
        assert_eq!(blocks.value(0, 1, 0), 3.0);
    }

    #[test]
    fn test_mask_threshold_and_apply() {
        let mut values = LocalMatrices::from_blocks(vec![array![[0.5, -3.0], [2.0, 0.01]]]);
        let mut mask = values.clone();
        mask.set_mask_threshold(0.1, 2.5);
        assert_eq!(mask.block(0), &array![[1.0, 0.0], [1.0, 0.0]]);

        values.apply_mask(&mask);
        assert_eq!(values.block(0), &array![[0.5, 0.0], [2.0, 0.0]]);
    }

    #[test]
    #[should_panic(expected = "same shape")]
    fn test_from_blocks_shape_mismatch() {
        LocalMatrices::from_blocks(vec![Array2::<f64>::zeros((2, 2)), Array2::zeros((3, 3))]);
    }
}
