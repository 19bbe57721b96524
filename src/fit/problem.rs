//! Solve a dense weighted least-squares problem end to end.
//!
//! This is the workflow shared by `doasfit solve` and `doasfit demo`:
//! build the system, weight it, decompose, solve and collect the report.

use nalgebra::{DMatrix, DVector};

use crate::domain::FitReport;
use crate::error::AppError;
use crate::linear::{DecompositionMode, LinearSystem, UncertaintyRequest};
use crate::report::{ReportExtras, build_fit_report};

/// Solution of a weighted problem together with its report.
#[derive(Debug, Clone)]
pub struct ProblemFit {
    pub report: FitReport,
    /// Solution vector (same values as the report coefficients).
    pub x: DVector<f64>,
}

/// Solve `a x ≈ b`, weighting rows by `sigma` when given.
pub fn solve_problem(
    a: &DMatrix<f64>,
    b: &[f64],
    sigma: Option<&[f64]>,
    labels: &[String],
    mode: DecompositionMode,
    extras: ReportExtras,
) -> Result<ProblemFit, AppError> {
    let mut system = LinearSystem::from_matrix(a, mode)?;
    system.set_weight(sigma)?;

    let rhs = weighted_rhs(b, sigma)?;
    system.decompose(UncertaintyRequest::VARIANCE)?;
    let x = system.solve(&rhs)?;

    log::info!(
        "solved {}x{} system with {} (rank {})",
        system.rows(),
        system.cols(),
        mode,
        system.effective_rank()?
    );

    let report = build_fit_report(&system, &rhs, &x, labels, extras)?;
    Ok(ProblemFit { report, x })
}

fn weighted_rhs(b: &[f64], sigma: Option<&[f64]>) -> Result<DVector<f64>, AppError> {
    match sigma {
        None => Ok(DVector::from_column_slice(b)),
        Some(sigma) if sigma.len() != b.len() => Err(AppError::new(
            2,
            format!("Got {} uncertainties for {} samples.", sigma.len(), b.len()),
        )),
        Some(sigma) => Ok(DVector::from_iterator(
            b.len(),
            b.iter().zip(sigma).map(|(bi, si)| bi / si),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_problem_matches_prescaled_problem() {
        let a = DMatrix::from_row_slice(
            5,
            2,
            &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0],
        );
        let b = [1.1, 2.9, 5.2, 6.8, 9.1];
        let sigma = [0.1, 0.2, 0.1, 0.4, 0.3];

        let weighted = solve_problem(
            &a,
            &b,
            Some(&sigma),
            &[],
            DecompositionMode::Qr,
            ReportExtras::default(),
        )
        .unwrap();

        let a_scaled = DMatrix::from_fn(5, 2, |i, j| a[(i, j)] / sigma[i]);
        let b_scaled: Vec<f64> = b.iter().zip(&sigma).map(|(bi, si)| bi / si).collect();
        let prescaled = solve_problem(
            &a_scaled,
            &b_scaled,
            None,
            &[],
            DecompositionMode::Qr,
            ReportExtras::default(),
        )
        .unwrap();

        assert!((weighted.x - prescaled.x).abs().max() < 1e-12);
    }

    #[test]
    fn sigma_length_is_checked() {
        let a = DMatrix::from_row_slice(3, 1, &[1.0, 1.0, 1.0]);
        let err = solve_problem(
            &a,
            &[1.0, 2.0, 3.0],
            Some(&[1.0]),
            &[],
            DecompositionMode::Svd,
            ReportExtras::default(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
