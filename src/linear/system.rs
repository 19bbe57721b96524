//! The linear system handle and its lifecycle.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use super::backend::Decomposition;
use super::qr::QrBackend;
use super::svd::SvdBackend;
use super::{DecompositionMode, LinearError};

/// Which uncertainty estimates `decompose` should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UncertaintyRequest {
    pub variance: bool,
    pub covariance: bool,
}

impl UncertaintyRequest {
    pub const NONE: Self = Self {
        variance: false,
        covariance: false,
    };
    pub const VARIANCE: Self = Self {
        variance: true,
        covariance: false,
    };
    pub const COVARIANCE: Self = Self {
        variance: false,
        covariance: true,
    };
    pub const ALL: Self = Self {
        variance: true,
        covariance: true,
    };
}

/// Uncertainty estimates in the caller's (un-normalized) units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uncertainty {
    /// Diagonal of the covariance matrix.
    pub variance: Option<DVector<f64>>,
    /// `(AᵀA)⁻¹` of the weighted system.
    pub covariance: Option<DMatrix<f64>>,
}

/// An over-determined linear system of `rows` equations in `cols` unknowns.
///
/// Columns are normalized to unit Euclidean norm before factoring; every
/// result (solution, covariance, variance, pseudo-inverse) is rescaled back to
/// the caller's units. Population is only allowed before a successful
/// [`decompose`](Self::decompose); afterwards the system is read-only.
#[derive(Debug)]
pub struct LinearSystem {
    rows: usize,
    cols: usize,
    /// Set by a successful decomposition.
    norms: Option<Vec<f64>>,
    backend: Box<dyn Decomposition>,
}

impl LinearSystem {
    /// Reserve a zero-filled system.
    pub fn allocate(
        rows: usize,
        cols: usize,
        mode: DecompositionMode,
    ) -> Result<Self, LinearError> {
        if rows == 0 || cols == 0 {
            return Err(LinearError::EmptySystem);
        }
        if rows < cols {
            return Err(LinearError::Underdetermined { rows, cols });
        }

        let backend: Box<dyn Decomposition> = match mode {
            DecompositionMode::Svd => Box::new(SvdBackend::allocate(rows, cols)?),
            DecompositionMode::Qr => Box::new(QrBackend::allocate(rows, cols)?),
        };

        Ok(Self {
            rows,
            cols,
            norms: None,
            backend,
        })
    }

    /// Allocate a system and copy `a` into it (rows are samples, columns unknowns).
    pub fn from_matrix(a: &DMatrix<f64>, mode: DecompositionMode) -> Result<Self, LinearError> {
        let mut system = Self::allocate(a.nrows(), a.ncols(), mode)?;
        system.backend.load(a);
        Ok(system)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mode(&self) -> DecompositionMode {
        self.backend.mode()
    }

    pub fn is_decomposed(&self) -> bool {
        self.norms.is_some()
    }

    /// Overwrite the coefficients of unknown `column` (0-based).
    pub fn set_column(&mut self, column: usize, values: &[f64]) -> Result<(), LinearError> {
        self.ensure_populating()?;
        if column >= self.cols {
            return Err(LinearError::ColumnOutOfRange {
                column,
                cols: self.cols,
            });
        }
        check_len("column", self.rows, values.len())?;
        self.backend.set_column(column, values);
        Ok(())
    }

    /// Divide each sample row `i` by `sigma[i]`. `None` leaves the system unweighted.
    pub fn set_weight(&mut self, sigma: Option<&[f64]>) -> Result<(), LinearError> {
        let Some(sigma) = sigma else {
            return Ok(());
        };
        self.ensure_populating()?;
        check_len("sigma", self.rows, sigma.len())?;
        if let Some((row, &value)) = sigma
            .iter()
            .enumerate()
            .find(|&(_, s)| !s.is_finite() || *s == 0.0)
        {
            return Err(LinearError::InvalidWeight { row, value });
        }
        self.backend.scale_rows(sigma);
        Ok(())
    }

    /// Normalize the columns, factor the system and optionally return its
    /// variance and/or covariance.
    ///
    /// On failure the system stays in its populated state and nothing is returned.
    pub fn decompose(&mut self, request: UncertaintyRequest) -> Result<Uncertainty, LinearError> {
        self.ensure_populating()?;

        let norms = self.backend.column_norms();
        if let Some(column) = norms.iter().position(|n| !n.is_finite() || *n == 0.0) {
            return Err(LinearError::Normalization { column });
        }

        self.backend.factor(&norms)?;
        match uncertainty(self.backend.as_ref(), &norms, request) {
            Ok(estimates) => {
                self.norms = Some(norms);
                Ok(estimates)
            }
            Err(e) => {
                self.backend.discard();
                Err(e)
            }
        }
    }

    /// Least-squares solution of `A x ≈ b` for the decomposed system.
    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, LinearError> {
        let norms = self.norms()?;
        check_len("right-hand side", self.rows, b.len())?;
        let mut x = self.backend.solve(b)?;
        for (xi, norm) in x.iter_mut().zip(norms) {
            *xi /= norm;
        }
        Ok(x)
    }

    /// Solve several right-hand sides against the same decomposition.
    pub fn solve_many(&self, rhs: &[DVector<f64>]) -> Result<Vec<DVector<f64>>, LinearError> {
        rhs.par_iter().map(|b| self.solve(b)).collect()
    }

    /// Coefficient covariance `(AᵀA)⁻¹` in the caller's units.
    pub fn covariance(&self) -> Result<DMatrix<f64>, LinearError> {
        let norms = self.norms()?;
        Ok(rescale_covariance(self.backend.covariance()?, norms))
    }

    /// Per-coefficient variance, the diagonal of [`covariance`](Self::covariance).
    pub fn variance(&self) -> Result<DVector<f64>, LinearError> {
        let norms = self.norms()?;
        Ok(rescale_variance(self.backend.variance()?, norms))
    }

    /// Moore–Penrose pseudo-inverse (`cols x rows`) of the weighted matrix.
    ///
    /// Only available for [`DecompositionMode::Svd`]. The rank is the one used
    /// by [`solve`](Self::solve). For full column rank `pseudo_inverse() * b`
    /// equals `solve(b)`; for a rank-deficient system it is the least-norm
    /// solution, whereas `solve` is least-norm in the column-normalized basis.
    pub fn pseudo_inverse(&self) -> Result<DMatrix<f64>, LinearError> {
        self.backend.pseudo_inverse()
    }

    /// Normalization factor of `column`, available after decomposition.
    pub fn norm(&self, column: usize) -> Result<f64, LinearError> {
        self.norms()?
            .get(column)
            .copied()
            .ok_or(LinearError::ColumnOutOfRange {
                column,
                cols: self.cols,
            })
    }

    /// Number of directions used by [`solve`](Self::solve).
    pub fn effective_rank(&self) -> Result<usize, LinearError> {
        self.norms()?;
        self.backend.effective_rank()
    }

    /// Singular values of the normalized matrix (SVD backend only).
    pub fn singular_values(&self) -> Option<&DVector<f64>> {
        self.backend.singular_values()
    }

    /// `b - A x` with the weighted, un-normalized matrix.
    pub fn residuals(&self, b: &DVector<f64>, x: &DVector<f64>) -> Result<DVector<f64>, LinearError> {
        check_len("right-hand side", self.rows, b.len())?;
        check_len("solution", self.cols, x.len())?;
        Ok(b - self.backend.apply(x))
    }

    fn ensure_populating(&self) -> Result<(), LinearError> {
        if self.norms.is_some() {
            return Err(LinearError::Precondition(
                "linear system is already decomposed",
            ));
        }
        Ok(())
    }

    fn norms(&self) -> Result<&[f64], LinearError> {
        self.norms
            .as_deref()
            .ok_or(LinearError::Precondition("linear system has not been decomposed"))
    }
}

fn uncertainty(
    backend: &dyn Decomposition,
    norms: &[f64],
    request: UncertaintyRequest,
) -> Result<Uncertainty, LinearError> {
    let covariance = if request.covariance {
        Some(rescale_covariance(backend.covariance()?, norms))
    } else {
        None
    };
    let variance = match (&covariance, request.variance) {
        (_, false) => None,
        (Some(c), true) => Some(c.diagonal()),
        (None, true) => Some(rescale_variance(backend.variance()?, norms)),
    };
    Ok(Uncertainty {
        variance,
        covariance,
    })
}

fn rescale_covariance(mut covariance: DMatrix<f64>, norms: &[f64]) -> DMatrix<f64> {
    for j in 0..covariance.ncols() {
        for i in 0..covariance.nrows() {
            covariance[(i, j)] /= norms[i] * norms[j];
        }
    }
    covariance
}

fn rescale_variance(mut variance: DVector<f64>, norms: &[f64]) -> DVector<f64> {
    for (v, norm) in variance.iter_mut().zip(norms) {
        *v /= norm * norm;
    }
    variance
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), LinearError> {
    if expected != found {
        return Err(LinearError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}
