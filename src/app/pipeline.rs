//! Shared fit pipelines used by the CLI handlers.
//!
//! Each pipeline returns its computed outputs so that the CLI layer only deals
//! with presentation (printing vs exporting).

use crate::data::{SyntheticSpectrum, generate_spectrum};
use crate::domain::{DemoConfig, PolyConfig, SolveConfig};
use crate::error::AppError;
use crate::fit::{PolynomialFit, ProblemFit, fit_polynomial_with_variance, solve_problem};
use crate::io::SpectrumRow;
use crate::linear::DecompositionMode;
use crate::report::ReportExtras;

/// All computed outputs of a `doasfit demo` run.
#[derive(Debug, Clone)]
pub struct DemoOutput {
    pub spectrum: SyntheticSpectrum,
    pub fit: ProblemFit,
    pub rows: Vec<SpectrumRow>,
}

pub fn run_solve(config: &SolveConfig) -> Result<ProblemFit, AppError> {
    if config.pseudo_inverse && config.mode != DecompositionMode::Svd {
        return Err(AppError::new(
            2,
            format!("--pinv requires the svd mode (got {}).", config.mode),
        ));
    }

    let problem = crate::io::read_linear_problem(&config.input)?;
    let a = problem.design()?;
    let labels: Vec<String> = (0..a.ncols()).map(|j| problem.label(j)).collect();

    let extras = ReportExtras {
        covariance: config.covariance,
        pseudo_inverse: config.pseudo_inverse,
    };
    solve_problem(
        &a,
        &problem.rhs,
        problem.sigma.as_deref(),
        &labels,
        config.mode,
        extras,
    )
}

pub fn run_poly(config: &PolyConfig) -> Result<PolynomialFit, AppError> {
    let problem = crate::io::read_poly_problem(&config.input)?;
    if problem.x.is_empty() {
        return Err(AppError::new(3, "Polynomial problem has no samples."));
    }
    log::info!(
        "fitting order-{} polynomial to {} samples",
        config.order,
        problem.x.len()
    );
    Ok(fit_polynomial_with_variance(
        &problem.x,
        config.order,
        problem.sigma.as_deref(),
        &problem.y,
    )?)
}

pub fn run_demo(config: &DemoConfig) -> Result<DemoOutput, AppError> {
    let spectrum = generate_spectrum(config)?;
    let n = spectrum.wavelengths.len();
    let a = nalgebra::DMatrix::from_fn(n, spectrum.columns.len(), |i, j| spectrum.columns[j].1[i]);

    let fit = solve_problem(
        &a,
        &spectrum.observed,
        Some(&spectrum.sigma),
        &spectrum.labels(),
        config.mode,
        ReportExtras::default(),
    )?;

    // Fitted optical depth in observation units (unweighted).
    let fitted = &a * &fit.x;
    let rows = spectrum
        .wavelengths
        .iter()
        .zip(&spectrum.observed)
        .zip(fitted.iter())
        .map(|((&wavelength, &observed), &fitted)| SpectrumRow {
            wavelength,
            observed,
            fitted,
        })
        .collect();

    Ok(DemoOutput { spectrum, fit, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_config(mode: DecompositionMode) -> DemoConfig {
        DemoConfig {
            samples: 300,
            seed: 11,
            noise: 1e-4,
            mode,
            baseline_order: 3,
            wavelength_min: 330.0,
            wavelength_max: 370.0,
            export: None,
        }
    }

    #[test]
    fn demo_recovers_slant_columns_within_uncertainty() {
        for mode in [DecompositionMode::Svd, DecompositionMode::Qr] {
            let out = run_demo(&demo_config(mode)).unwrap();
            let coeffs = &out.fit.report.coefficients;
            for (c, truth) in coeffs.iter().zip(&out.spectrum.truth).take(2) {
                let z = (c.value - truth) / c.std_dev;
                assert!(z.abs() < 6.0, "{mode}: {} z={z}", c.label);
            }
            assert_eq!(out.rows.len(), 300);
            // Chi-square per degree of freedom is ~1 for correctly weighted noise.
            let q = &out.fit.report.quality;
            let reduced = q.chi_square / q.dof as f64;
            assert!(reduced > 0.5 && reduced < 1.5, "{mode}: reduced chi2={reduced}");
        }
    }

    #[test]
    fn backends_agree_on_demo() {
        let svd = run_demo(&demo_config(DecompositionMode::Svd)).unwrap();
        let qr = run_demo(&demo_config(DecompositionMode::Qr)).unwrap();
        for (a, b) in svd.fit.x.iter().zip(qr.fit.x.iter()) {
            assert!((a - b).abs() <= 1e-8 * a.abs().max(b.abs()).max(1e-12));
        }
    }

    #[test]
    fn pinv_with_qr_is_rejected_before_reading_input() {
        let config = SolveConfig {
            input: std::env::temp_dir().join("doasfit_missing_problem.json"),
            mode: DecompositionMode::Qr,
            covariance: false,
            pseudo_inverse: true,
            export: None,
        };
        let err = run_solve(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("--pinv"), "{err}");
    }
}
