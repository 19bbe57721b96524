//! Reporting utilities: fit diagnostics and formatted terminal output.

pub mod format;

pub use format::*;

use chrono::Utc;
use nalgebra::DVector;

use crate::domain::{Coefficient, FitQuality, FitReport, matrix_rows};
use crate::error::AppError;
use crate::linear::LinearSystem;

/// Which optional matrices to attach to a report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportExtras {
    pub covariance: bool,
    pub pseudo_inverse: bool,
}

/// Collect coefficients, uncertainties and residual statistics of a solved system.
///
/// `b` must be the (weighted) right-hand side `x` was solved for.
pub fn build_fit_report(
    system: &LinearSystem,
    b: &DVector<f64>,
    x: &DVector<f64>,
    labels: &[String],
    extras: ReportExtras,
) -> Result<FitReport, AppError> {
    let variance = system.variance()?;
    let coefficients = (0..system.cols())
        .map(|j| -> Result<Coefficient, AppError> {
            Ok(Coefficient {
                label: labels.get(j).cloned().unwrap_or_else(|| format!("x{j}")),
                value: x[j],
                std_dev: variance[j].max(0.0).sqrt(),
                norm: system.norm(j)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let residuals = system.residuals(b, x)?;
    let chi_square = residuals.norm_squared();
    let rank = system.effective_rank()?;
    let quality = FitQuality {
        n_samples: system.rows(),
        n_unknowns: system.cols(),
        rank,
        dof: system.rows().saturating_sub(rank),
        chi_square,
        rms: (chi_square / system.rows() as f64).sqrt(),
    };

    let covariance = if extras.covariance {
        Some(matrix_rows(&system.covariance()?))
    } else {
        None
    };
    let pseudo_inverse = if extras.pseudo_inverse {
        Some(matrix_rows(&system.pseudo_inverse()?))
    } else {
        None
    };

    Ok(FitReport {
        tool: "doasfit".to_string(),
        generated_at: Utc::now(),
        mode: system.mode(),
        coefficients,
        quality,
        singular_values: system.singular_values().map(|w| w.iter().copied().collect()),
        covariance,
        pseudo_inverse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::{DecompositionMode, UncertaintyRequest};
    use nalgebra::DMatrix;

    #[test]
    fn report_for_exact_line_fit() {
        let a = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[2.0, 5.0, 8.0, 11.0]);
        let mut system = LinearSystem::from_matrix(&a, DecompositionMode::Svd).unwrap();
        system.decompose(UncertaintyRequest::NONE).unwrap();
        let x = system.solve(&b).unwrap();

        let labels = vec!["offset".to_string()];
        let extras = ReportExtras {
            covariance: true,
            pseudo_inverse: true,
        };
        let report = build_fit_report(&system, &b, &x, &labels, extras).unwrap();

        assert_eq!(report.coefficients[0].label, "offset");
        assert_eq!(report.coefficients[1].label, "x1");
        assert!((report.coefficients[1].value - 3.0).abs() < 1e-10);
        assert!(report.coefficients.iter().all(|c| c.std_dev > 0.0));
        assert!(report.quality.chi_square < 1e-20);
        assert_eq!(report.quality.rank, 2);
        assert_eq!(report.quality.dof, 2);
        assert_eq!(report.singular_values.as_ref().map(Vec::len), Some(2));
        assert_eq!(report.pseudo_inverse.as_ref().map(|p| (p.len(), p[0].len())), Some((2, 4)));
    }

    #[test]
    fn pseudo_inverse_extra_fails_for_qr() {
        let a = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let mut system = LinearSystem::from_matrix(&a, DecompositionMode::Qr).unwrap();
        system.decompose(UncertaintyRequest::NONE).unwrap();
        let x = system.solve(&b).unwrap();
        let extras = ReportExtras {
            covariance: false,
            pseudo_inverse: true,
        };
        let err = build_fit_report(&system, &b, &x, &[], extras).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
