//! Capability interface shared by the decomposition strategies.
//!
//! A backend owns the (weighted, un-normalized) coefficient data of one linear
//! system and, once factored, the factorization of its column-normalized copy.
//! Everything it returns is expressed in the normalized basis, except the
//! pseudo-inverse; undoing the normalization is the job of
//! [`LinearSystem`](super::LinearSystem).

use std::fmt;

use nalgebra::{DMatrix, DVector};

use super::{DecompositionMode, LinearError};

pub(crate) trait Decomposition: fmt::Debug + Send + Sync {
    fn mode(&self) -> DecompositionMode;

    /// Copy a full `rows x cols` matrix (rows are samples).
    fn load(&mut self, a: &DMatrix<f64>);

    /// Overwrite the coefficients of unknown `column`.
    fn set_column(&mut self, column: usize, values: &[f64]);

    /// Divide sample row `i` by `sigma[i]`.
    fn scale_rows(&mut self, sigma: &[f64]);

    /// Euclidean norm of every unknown's column.
    fn column_norms(&self) -> Vec<f64>;

    /// Compute `A * x` with the stored (un-normalized) matrix.
    fn apply(&self, x: &DVector<f64>) -> DVector<f64>;

    /// Factor the matrix whose columns were divided by `norms`.
    fn factor(&mut self, norms: &[f64]) -> Result<(), LinearError>;

    /// Drop any factorization, returning to the populated state.
    fn discard(&mut self);

    fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, LinearError>;

    /// `(AᵀA)⁻¹` of the normalized matrix.
    fn covariance(&self) -> Result<DMatrix<f64>, LinearError>;

    fn variance(&self) -> Result<DVector<f64>, LinearError> {
        Ok(self.covariance()?.diagonal())
    }

    /// Number of directions that take part in a solve.
    fn effective_rank(&self) -> Result<usize, LinearError>;

    /// Moore–Penrose pseudo-inverse of the stored (weighted, un-normalized)
    /// matrix.
    fn pseudo_inverse(&self) -> Result<DMatrix<f64>, LinearError> {
        Err(LinearError::Unsupported {
            operation: "pseudo-inverse",
            mode: self.mode(),
        })
    }

    fn singular_values(&self) -> Option<&DVector<f64>> {
        None
    }
}

pub(crate) const NOT_FACTORED: LinearError =
    LinearError::Precondition("linear system has not been decomposed");

/// Rank threshold shared by every use of the factorization:
/// `max(rows, cols) * largest * machine epsilon`.
pub(crate) fn rank_tolerance(rows: usize, cols: usize, largest: f64) -> f64 {
    rows.max(cols) as f64 * largest * f64::EPSILON
}
