//! Errors reported by the linear least-squares core.

use super::DecompositionMode;

/// Failure modes of [`LinearSystem`](super::LinearSystem) operations.
///
/// Every operation reports failures through `Result`; no output is produced
/// (or partially written) when an error is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinearError {
    /// Storage for the matrices/vectors could not be reserved.
    #[error("failed to allocate storage for a {rows}x{cols} linear system")]
    Allocation { rows: usize, cols: usize },

    /// A column has zero (or non-finite) Euclidean norm.
    #[error("column {column} cannot be normalized (zero or non-finite norm)")]
    Normalization { column: usize },

    /// Numerical failure while factoring the system.
    #[error("decomposition failed: {0}")]
    Decomposition(String),

    /// The operation is not available for the selected backend.
    #[error("{operation} is not supported by the {mode} decomposition")]
    Unsupported {
        operation: &'static str,
        mode: DecompositionMode,
    },

    /// Operation called in the wrong lifecycle stage.
    #[error("precondition violated: {0}")]
    Precondition(&'static str),

    /// Fewer equations than unknowns.
    #[error("system has {rows} equations for {cols} unknowns (need rows >= cols)")]
    Underdetermined { rows: usize, cols: usize },

    #[error("linear system must have at least one row and one column")]
    EmptySystem,

    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("column {column} is out of range for a system with {cols} unknowns")]
    ColumnOutOfRange { column: usize, cols: usize },

    /// A per-sample uncertainty that cannot be used as a divisor.
    #[error("invalid uncertainty {value} for sample {row}")]
    InvalidWeight { row: usize, value: f64 },
}
