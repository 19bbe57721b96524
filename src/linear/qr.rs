//! Orthogonal/triangular (column-pivoted Householder QR) backend.
//!
//! Samples are stored row by row, unknowns column by column. Factoring keeps a
//! dense copy of the normalized matrix together with the thin `Q` (`rows x
//! cols`), the upper-triangular `R` (`cols x cols`) and the column permutation
//! `P` with `A P = Q R`, so repeated solves reduce to `R y = Qᵀ b`, `x = P y`.
//!
//! The covariance `(AᵀA)⁻¹` is obtained from a Cholesky factorization of the
//! normal equations solved against the identity. Only full column rank input
//! is accepted.

use nalgebra::{Cholesky, DMatrix, DVector, Dyn, PermutationSequence};

use super::backend::{Decomposition, NOT_FACTORED, rank_tolerance};
use super::{DecompositionMode, LinearError};
use crate::math::try_zeros;

#[derive(Debug)]
pub(crate) struct QrBackend {
    /// `rows x cols`, the weighted coefficient matrix.
    matrix: DMatrix<f64>,
    factors: Option<QrFactors>,
}

#[derive(Debug)]
struct QrFactors {
    /// Column-normalized copy the factors were computed from.
    normalized: DMatrix<f64>,
    q: DMatrix<f64>,
    r: DMatrix<f64>,
    p: PermutationSequence<Dyn>,
    covariance: DMatrix<f64>,
}

impl QrBackend {
    pub(crate) fn allocate(rows: usize, cols: usize) -> Result<Self, LinearError> {
        Ok(Self {
            matrix: try_zeros(rows, cols)?,
            factors: None,
        })
    }

    fn factors(&self) -> Result<&QrFactors, LinearError> {
        self.factors.as_ref().ok_or(NOT_FACTORED)
    }
}

impl Decomposition for QrBackend {
    fn mode(&self) -> DecompositionMode {
        DecompositionMode::Qr
    }

    fn load(&mut self, a: &DMatrix<f64>) {
        self.matrix.copy_from(a);
    }

    fn set_column(&mut self, column: usize, values: &[f64]) {
        for (dst, &v) in self.matrix.column_mut(column).iter_mut().zip(values) {
            *dst = v;
        }
    }

    fn scale_rows(&mut self, sigma: &[f64]) {
        for (i, &s) in sigma.iter().enumerate() {
            let mut sample = self.matrix.row_mut(i);
            sample /= s;
        }
    }

    fn column_norms(&self) -> Vec<f64> {
        self.matrix.column_iter().map(|unknown| unknown.norm()).collect()
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.matrix * x
    }

    fn factor(&mut self, norms: &[f64]) -> Result<(), LinearError> {
        let (rows, cols) = self.matrix.shape();

        let mut normalized = self.matrix.clone();
        for (j, &norm) in norms.iter().enumerate() {
            let mut unknown = normalized.column_mut(j);
            unknown /= norm;
        }

        let qr = normalized.clone().col_piv_qr();
        let q = qr.q();
        let r = qr.r();
        let p = qr.p().clone();

        let diag_max = r.diagonal().iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
        let tolerance = rank_tolerance(rows, cols, diag_max);
        if let Some(j) = r.diagonal().iter().position(|d| !(d.abs() > tolerance)) {
            return Err(LinearError::Decomposition(format!(
                "matrix is rank deficient (pivoted R[{j},{j}] below {tolerance:.3e})"
            )));
        }

        let normal = normalized.tr_mul(&normalized);
        let covariance = Cholesky::new(normal)
            .ok_or_else(|| {
                LinearError::Decomposition(
                    "normal equations matrix is not positive definite".to_string(),
                )
            })?
            .inverse();

        log::debug!("qr: {rows}x{cols} system, |R| diagonal max={diag_max:.6e}");

        self.factors = Some(QrFactors {
            normalized,
            q,
            r,
            p,
            covariance,
        });
        Ok(())
    }

    fn discard(&mut self) {
        self.factors = None;
    }

    fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, LinearError> {
        let f = self.factors()?;
        let qtb = f.q.tr_mul(b);
        let mut x = f.r.solve_upper_triangular(&qtb).ok_or_else(|| {
            LinearError::Decomposition("triangular factor is singular".to_string())
        })?;
        f.p.inv_permute_rows(&mut x);
        Ok(x)
    }

    fn covariance(&self) -> Result<DMatrix<f64>, LinearError> {
        Ok(self.factors()?.covariance.clone())
    }

    fn effective_rank(&self) -> Result<usize, LinearError> {
        Ok(self.factors()?.normalized.ncols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factored(a: &DMatrix<f64>) -> Result<QrBackend, LinearError> {
        let mut backend = QrBackend::allocate(a.nrows(), a.ncols())?;
        backend.load(a);
        let norms = backend.column_norms();
        backend.factor(&norms)?;
        Ok(backend)
    }

    #[test]
    fn factors_reconstruct_normalized_matrix() {
        let a = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let backend = factored(&a).unwrap();
        let f = backend.factors().unwrap();
        let rebuilt = &f.q * &f.r;
        let mut permuted = f.normalized.clone();
        f.p.permute_columns(&mut permuted);
        assert!((rebuilt - permuted).abs().max() < 1e-12);
    }

    #[test]
    fn covariance_matches_r_inverse() {
        let a = DMatrix::from_row_slice(3, 2, &[2.0, 1.0, 0.0, 1.0, 1.0, 3.0]);
        let backend = factored(&a).unwrap();
        let f = backend.factors().unwrap();
        let r_inv = f.r.clone().try_inverse().unwrap();
        // (AᵀA)⁻¹ = P (RᵀR)⁻¹ Pᵀ
        let mut expected = &r_inv * r_inv.transpose();
        f.p.inv_permute_rows(&mut expected);
        f.p.inv_permute_columns(&mut expected);
        assert!((backend.covariance().unwrap() - expected).abs().max() < 1e-10);
    }

    #[test]
    fn pivoted_solve_returns_unknowns_in_caller_order() {
        // The large third column is pivoted to the front.
        let a = DMatrix::from_row_slice(
            4,
            3,
            &[1.0, 0.0, 50.0, 1.0, 1.0, -20.0, 1.0, 2.0, 5.0, 1.0, 3.0, 80.0],
        );
        let x_true = DVector::from_row_slice(&[2.0, -1.0, 0.5]);
        let backend = factored(&a).unwrap();
        let norms = backend.column_norms();
        let mut normalized_true = x_true.clone();
        for (xi, norm) in normalized_true.iter_mut().zip(&norms) {
            *xi *= norm;
        }
        let x = backend.solve(&(&a * &x_true)).unwrap();
        assert!((x - normalized_true).amax() < 1e-10);
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        assert!(matches!(
            factored(&a).unwrap_err(),
            LinearError::Decomposition(_)
        ));
    }

    #[test]
    fn pseudo_inverse_is_unsupported() {
        let backend = QrBackend::allocate(3, 2).unwrap();
        assert!(matches!(
            backend.pseudo_inverse().unwrap_err(),
            LinearError::Unsupported { .. }
        ));
    }
}
