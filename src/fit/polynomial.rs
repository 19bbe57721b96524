//! Weighted polynomial least-squares fits.
//!
//! This is the entry point used for baseline/closure polynomials in spectral
//! fitting: given sample positions `t_i`, targets `b_i` and optional
//! uncertainties `σ_i`, find `c_0..c_order` minimizing
//!
//! ```text
//! Σ ((b_i - Σ_k c_k t_i^k) / σ_i)^2
//! ```
//!
//! The design matrix is a Vandermonde matrix factored with the QR backend.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::linear::{DecompositionMode, LinearError, LinearSystem, UncertaintyRequest};
use crate::math::polynomial::{evaluate, vandermonde};

/// Polynomial coefficients (lowest power first) and their variances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialFit {
    pub coefficients: Vec<f64>,
    pub variance: Vec<f64>,
}

impl PolynomialFit {
    pub fn order(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        evaluate(&self.coefficients, t)
    }
}

/// Fit a polynomial of degree `order` to `(samples, b)`.
///
/// Returns the `order + 1` coefficients, lowest power first.
pub fn fit_polynomial(
    samples: &[f64],
    order: usize,
    sigma: Option<&[f64]>,
    b: &[f64],
) -> Result<Vec<f64>, LinearError> {
    fit(samples, order, sigma, b, UncertaintyRequest::NONE).map(|(x, _)| x.as_slice().to_vec())
}

/// Like [`fit_polynomial`], also returning the coefficient variances.
pub fn fit_polynomial_with_variance(
    samples: &[f64],
    order: usize,
    sigma: Option<&[f64]>,
    b: &[f64],
) -> Result<PolynomialFit, LinearError> {
    let (x, variance) = fit(samples, order, sigma, b, UncertaintyRequest::VARIANCE)?;
    Ok(PolynomialFit {
        coefficients: x.as_slice().to_vec(),
        variance: variance
            .map(|v| v.as_slice().to_vec())
            .unwrap_or_default(),
    })
}

fn fit(
    samples: &[f64],
    order: usize,
    sigma: Option<&[f64]>,
    b: &[f64],
    request: UncertaintyRequest,
) -> Result<(DVector<f64>, Option<DVector<f64>>), LinearError> {
    if b.len() != samples.len() {
        return Err(LinearError::DimensionMismatch {
            what: "targets",
            expected: samples.len(),
            found: b.len(),
        });
    }

    let a = vandermonde(samples, order)?;
    let mut system = LinearSystem::from_matrix(&a, DecompositionMode::Qr)?;
    system.set_weight(sigma)?;

    // `set_weight` has validated sigma, so the divisions below are safe.
    let rhs = match sigma {
        Some(sigma) => DVector::from_iterator(
            b.len(),
            b.iter().zip(sigma).map(|(bi, si)| bi / si),
        ),
        None => DVector::from_column_slice(b),
    };

    let estimates = system.decompose(request)?;
    let x = system.solve(&rhs)?;
    log::debug!(
        "polynomial fit: order={order}, samples={}, weighted={}",
        samples.len(),
        sigma.is_some()
    );
    Ok((x, estimates.variance))
}
