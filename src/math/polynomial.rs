//! Polynomial helpers: Vandermonde design matrices and evaluation.

use nalgebra::DMatrix;

use crate::linear::LinearError;
use crate::math::try_zeros;

/// Build the `samples.len() x (order + 1)` matrix whose column `k` is `t^k`.
///
/// Powers are accumulated column by column (`t^k = t * t^(k-1)`) so no `powi`
/// rounding differences appear between columns.
pub fn vandermonde(samples: &[f64], order: usize) -> Result<DMatrix<f64>, LinearError> {
    let cols = order
        .checked_add(1)
        .ok_or(LinearError::Allocation {
            rows: samples.len(),
            cols: usize::MAX,
        })?;
    let mut a = try_zeros(samples.len(), cols)?;
    a.column_mut(0).fill(1.0);
    for k in 1..cols {
        for (i, &t) in samples.iter().enumerate() {
            a[(i, k)] = t * a[(i, k - 1)];
        }
    }
    Ok(a)
}

/// Evaluate `Σ c_k t^k` with Horner's scheme.
pub fn evaluate(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vandermonde_columns_are_powers() {
        let a = vandermonde(&[2.0, -1.0, 0.5], 3).unwrap();
        assert_eq!(a.shape(), (3, 4));
        assert_eq!(a.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 4.0, 8.0]);
        assert_eq!(a[(1, 3)], -1.0);
        assert_eq!(a[(2, 2)], 0.25);
    }

    #[test]
    fn horner_matches_expanded_form() {
        // 3 + 2t - t^2
        let c = [3.0, 2.0, -1.0];
        for &t in &[-2.0, 0.0, 0.5, 4.0] {
            let expected = 3.0 + 2.0 * t - t * t;
            assert!((evaluate(&c, t) - expected).abs() < 1e-12);
        }
    }
}
