//! Singular value decomposition backend.
//!
//! The coefficient data is kept unknown-major: one storage row per unknown,
//! one storage column per sample. The logical matrix is transposed back when
//! it is factored, so `A_norm = U * diag(W) * Vᵀ` with `U` of shape
//! `rows x cols`.
//!
//! Singular values at or below [`rank_tolerance`] are treated as exact zeros:
//! they are skipped by back-substitution, covariance and pseudo-inverse, which
//! caps the effective rank instead of amplifying noise along near-null
//! directions.
//!
//! The pseudo-inverse is the one exception to the normalized basis: column
//! scaling does not commute with rank truncation, so a rank-deficient system
//! factors its un-normalized matrix again to return the Moore–Penrose inverse
//! in the caller's units.

use nalgebra::{DMatrix, DVector, SVD};

use super::backend::{Decomposition, NOT_FACTORED, rank_tolerance};
use super::{DecompositionMode, LinearError};
use crate::math::{try_zeros, try_zeros_vector};

/// Upper bound on implicit QR sweeps before the SVD reports non-convergence.
const SVD_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug)]
pub(crate) struct SvdBackend {
    /// `cols x rows`, row `j` holds the samples of unknown `j`.
    coefficients: DMatrix<f64>,
    factors: Option<SvdFactors>,
}

#[derive(Debug)]
struct SvdFactors {
    u: DMatrix<f64>,
    v: DMatrix<f64>,
    w: DVector<f64>,
    tolerance: f64,
    norms: Vec<f64>,
}

impl SvdFactors {
    /// `V * diag(1/W)` with truncated directions zeroed.
    fn v_over_w(&self) -> DMatrix<f64> {
        let mut scaled = self.v.clone();
        for (k, &wk) in self.w.iter().enumerate() {
            let inv = if wk > self.tolerance { 1.0 / wk } else { 0.0 };
            scaled.column_mut(k).scale_mut(inv);
        }
        scaled
    }

    fn rank(&self) -> usize {
        self.w.iter().filter(|&&wk| wk > self.tolerance).count()
    }
}

impl SvdBackend {
    pub(crate) fn allocate(rows: usize, cols: usize) -> Result<Self, LinearError> {
        Ok(Self {
            coefficients: try_zeros(cols, rows)?,
            factors: None,
        })
    }

    fn factors(&self) -> Result<&SvdFactors, LinearError> {
        self.factors.as_ref().ok_or(NOT_FACTORED)
    }
}

/// Thin SVD `m = U * diag(W) * Vᵀ`, returned as `(U, V, W)`.
fn thin_svd(m: DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>, DVector<f64>), LinearError> {
    let svd = SVD::try_new(m, true, true, f64::EPSILON, SVD_MAX_ITERATIONS).ok_or_else(|| {
        LinearError::Decomposition(format!(
            "SVD did not converge within {SVD_MAX_ITERATIONS} iterations"
        ))
    })?;

    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(LinearError::Decomposition(
            "SVD did not produce singular vectors".to_string(),
        ));
    };
    let w = svd.singular_values;
    if w.iter().any(|wk| !wk.is_finite()) {
        return Err(LinearError::Decomposition(
            "SVD produced non-finite singular values".to_string(),
        ));
    }
    Ok((u, v_t.transpose(), w))
}

/// `V * diag(1/W) * Uᵀ` keeping only the `rank` largest singular values.
fn truncated_inverse(
    u: &DMatrix<f64>,
    v: &DMatrix<f64>,
    w: &DVector<f64>,
    rank: usize,
) -> Result<DMatrix<f64>, LinearError> {
    let mut order: Vec<usize> = (0..w.len()).collect();
    order.sort_by(|&a, &b| w[b].total_cmp(&w[a]));

    let mut pinv = try_zeros(v.nrows(), u.nrows())?;
    for &k in order.iter().take(rank) {
        pinv += (v.column(k) / w[k]) * u.column(k).transpose();
    }
    Ok(pinv)
}

impl Decomposition for SvdBackend {
    fn mode(&self) -> DecompositionMode {
        DecompositionMode::Svd
    }

    fn load(&mut self, a: &DMatrix<f64>) {
        a.transpose_to(&mut self.coefficients);
    }

    fn set_column(&mut self, column: usize, values: &[f64]) {
        for (dst, &v) in self.coefficients.row_mut(column).iter_mut().zip(values) {
            *dst = v;
        }
    }

    fn scale_rows(&mut self, sigma: &[f64]) {
        for (i, &s) in sigma.iter().enumerate() {
            let mut sample = self.coefficients.column_mut(i);
            sample /= s;
        }
    }

    fn column_norms(&self) -> Vec<f64> {
        self.coefficients.row_iter().map(|unknown| unknown.norm()).collect()
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        self.coefficients.tr_mul(x)
    }

    fn factor(&mut self, norms: &[f64]) -> Result<(), LinearError> {
        let (cols, rows) = self.coefficients.shape();

        let mut normalized = self.coefficients.clone();
        for (j, &norm) in norms.iter().enumerate() {
            let mut unknown = normalized.row_mut(j);
            unknown /= norm;
        }

        let (u, v, w) = thin_svd(normalized.transpose())?;

        let w_max = w.iter().copied().fold(0.0_f64, f64::max);
        let factors = SvdFactors {
            u,
            v,
            w,
            tolerance: rank_tolerance(rows, cols, w_max),
            norms: norms.to_vec(),
        };

        let rank = factors.rank();
        log::debug!(
            "svd: {rows}x{cols} system, w_max={w_max:.6e}, tolerance={:.3e}, rank={rank}",
            factors.tolerance
        );
        if rank < cols {
            log::warn!(
                "svd: {} of {cols} singular values below tolerance, solution is rank-truncated",
                cols - rank
            );
        }

        self.factors = Some(factors);
        Ok(())
    }

    fn discard(&mut self) {
        self.factors = None;
    }

    fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, LinearError> {
        let f = self.factors()?;
        let mut x = try_zeros_vector(f.v.ncols())?;
        for (k, &wk) in f.w.iter().enumerate() {
            if wk > f.tolerance {
                let coeff = f.u.column(k).dot(b) / wk;
                x.axpy(coeff, &f.v.column(k), 1.0);
            }
        }
        Ok(x)
    }

    fn covariance(&self) -> Result<DMatrix<f64>, LinearError> {
        let scaled = self.factors()?.v_over_w();
        Ok(&scaled * scaled.transpose())
    }

    fn variance(&self) -> Result<DVector<f64>, LinearError> {
        let scaled = self.factors()?.v_over_w();
        Ok(DVector::from_iterator(
            scaled.nrows(),
            scaled.row_iter().map(|row| row.norm_squared()),
        ))
    }

    fn effective_rank(&self) -> Result<usize, LinearError> {
        Ok(self.factors()?.rank())
    }

    fn pseudo_inverse(&self) -> Result<DMatrix<f64>, LinearError> {
        let f = self.factors()?;
        let rank = f.rank();
        if rank == f.norms.len() {
            // Full column rank: D⁻¹ · pinv(A D⁻¹) is exactly pinv(A).
            let mut pinv = f.v_over_w() * f.u.transpose();
            for (i, norm) in f.norms.iter().enumerate() {
                let mut row = pinv.row_mut(i);
                row /= *norm;
            }
            return Ok(pinv);
        }

        log::debug!("svd: refactoring un-normalized matrix for rank-{rank} pseudo-inverse");
        let (u, v, w) = thin_svd(self.coefficients.transpose())?;
        truncated_inverse(&u, &v, &w, rank)
    }

    fn singular_values(&self) -> Option<&DVector<f64>> {
        self.factors.as_ref().map(|f| &f.w)
    }
}
