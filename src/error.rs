//! Error types for recoverable failures
//!
//! Structural misuse (mismatched dimensions, rows that must exist but don't)
//! panics, the same way the matrix constructors assert their inputs. Only
//! failures coming from the environment are reported through [`MatrixError`].

use thiserror::Error;

/// Recoverable failures of matrix operations
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Writing a diagnostic dump failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The distribution collaborator could not complete a gather/merge
    #[error("distribution failed: {0}")]
    Distribution(String),

    /// A packed row buffer is internally inconsistent
    #[error("malformed row packet: {0}")]
    MalformedPacket(String),

    /// The worker pool for the parallel kernels could not be built
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience alias for `Result<T, MatrixError>`
pub type MatrixResult<T> = Result<T, MatrixError>;
