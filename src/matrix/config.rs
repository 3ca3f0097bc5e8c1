//! Configuration for matrix assembly and the parallel kernels
//!
//! Everything an assembly or product entry point needs is carried in a
//! [`MatrixConfig`] passed by reference; nothing is read from process-wide state.

/// Smallest number of rows reserved by a new matrix
pub const MIN_MAT_SIZE: usize = 10;

/// Default magnitude at or below which assembled values are dropped
pub const DEFAULT_ASSEMBLY_TOLERANCE: f64 = 1.0e-12;

/// When tolerance pruning is applied to assembled contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneStage {
    /// Drop small values while assembling local blocks.
    ///
    /// Pruning decisions are taken on per-process partial sums, so the stored
    /// sparsity can depend on how the work was partitioned.
    Assembly,
    /// Keep every contribution during assembly; the caller prunes once the
    /// rows have been consolidated (see `VariableSizeMatrix::prune`).
    Deferred,
}

/// System parameters for the parallel kernels
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Number of threads to use
    pub n_threads: usize,
    /// Below this many rows the parallel kernels run serially
    pub parallel_row_threshold: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            n_threads: num_cpus::get(), // Use all available cores
            parallel_row_threshold: 256,
        }
    }
}

/// Configuration for building and operating on variable-size matrices
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// System parameters for the parallel kernels
    pub system_params: SystemParameters,

    /// Number of rows to reserve up front
    pub initial_capacity: usize,

    /// Assembled values with magnitude at or below this are dropped
    pub tolerance: f64,

    /// When to apply `tolerance`
    pub prune_stage: PruneStage,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            system_params: SystemParameters::default(),
            initial_capacity: MIN_MAT_SIZE,
            tolerance: DEFAULT_ASSEMBLY_TOLERANCE,
            prune_stage: PruneStage::Assembly,
        }
    }
}

impl MatrixConfig {
    /// Sets the number of rows reserved by new matrices
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the assembly tolerance
    ///
    /// # Panics
    ///
    /// Panics if `tolerance` is negative or NaN.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        assert!(tolerance >= 0.0, "tolerance must be non-negative, got {}", tolerance);
        self.tolerance = tolerance;
        self
    }

    /// Selects when assembly pruning happens
    pub fn with_prune_stage(mut self, stage: PruneStage) -> Self {
        self.prune_stage = stage;
        self
    }

    /// Sets the thread count used by the parallel kernels
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        assert!(n_threads > 0, "n_threads must be at least 1");
        self.system_params.n_threads = n_threads;
        self
    }

    /// Tolerance applied during assembly, or `None` when pruning is deferred
    pub fn assembly_tolerance(&self) -> Option<f64> {
        match self.prune_stage {
            PruneStage::Assembly => Some(self.tolerance),
            PruneStage::Deferred => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatrixConfig::default();
        assert_eq!(config.initial_capacity, MIN_MAT_SIZE);
        assert_eq!(config.prune_stage, PruneStage::Assembly);
        assert!(config.system_params.n_threads >= 1);
        assert_eq!(config.assembly_tolerance(), Some(DEFAULT_ASSEMBLY_TOLERANCE));
    }

    #[test]
    fn test_deferred_pruning_has_no_assembly_tolerance() {
        let config = MatrixConfig::default()
            .with_tolerance(1.0e-6)
            .with_prune_stage(PruneStage::Deferred);
        assert_eq!(config.tolerance, 1.0e-6);
        assert_eq!(config.assembly_tolerance(), None);
    }

    #[test]
    #[should_panic(expected = "tolerance must be non-negative")]
    fn test_negative_tolerance() {
        let _ = MatrixConfig::default().with_tolerance(-1.0);
    }
}
