//! Synthetic DOAS spectra.
//!
//! The demo spectrum follows the linearized Beer–Lambert law in optical depth:
//!
//! ```text
//! τ(λ) = Σ_k σ_k(λ) · SCD_k + P(u),   u = (λ - λ_c) / (λ_w / 2)
//! ```
//!
//! with two band-structured absorption cross-sections (order 1e-19 cm²),
//! slant column densities (order 1e16 molec/cm²) and a low-order baseline
//! polynomial `P`. The mixed magnitudes of the columns are what column
//! normalization in the linear system is there for.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::DemoConfig;
use crate::error::AppError;

/// Gaussian band: (center nm, width nm, peak cross-section cm²).
type Band = (f64, f64, f64);

const ABSORBER_A: (&str, &[Band]) = (
    "absorber_a",
    &[
        (334.0, 1.2, 4.0e-19),
        (341.5, 1.4, 6.0e-19),
        (349.0, 1.6, 5.0e-19),
        (356.5, 1.8, 3.5e-19),
        (364.0, 2.0, 2.0e-19),
    ],
);

const ABSORBER_B: (&str, &[Band]) = (
    "absorber_b",
    &[
        (338.0, 3.0, 2.5e-19),
        (351.0, 2.5, 4.5e-19),
        (362.0, 3.5, 3.0e-19),
    ],
);

const TRUE_SCD: [f64; 2] = [4.0e16, 2.5e16];

const TRUE_BASELINE: [f64; 6] = [0.12, -0.04, 0.015, -0.006, 0.002, -0.001];

/// A synthetic spectrum together with the basis it was built from.
#[derive(Debug, Clone)]
pub struct SyntheticSpectrum {
    pub wavelengths: Vec<f64>,
    /// Basis functions evaluated on the wavelength grid, in fit order.
    pub columns: Vec<(String, Vec<f64>)>,
    /// True coefficient of every column.
    pub truth: Vec<f64>,
    pub observed: Vec<f64>,
    pub sigma: Vec<f64>,
}

impl SyntheticSpectrum {
    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }
}

pub fn generate_spectrum(config: &DemoConfig) -> Result<SyntheticSpectrum, AppError> {
    if !(config.wavelength_min.is_finite()
        && config.wavelength_max.is_finite()
        && config.wavelength_max > config.wavelength_min)
    {
        return Err(AppError::new(2, "Invalid wavelength window for the demo spectrum."));
    }
    if !(config.noise.is_finite() && config.noise > 0.0) {
        return Err(AppError::new(2, "Demo noise must be finite and > 0."));
    }
    if config.baseline_order >= TRUE_BASELINE.len() {
        return Err(AppError::new(
            2,
            format!("Baseline order must be < {}.", TRUE_BASELINE.len()),
        ));
    }
    let n_unknowns = TRUE_SCD.len() + config.baseline_order + 1;
    if config.samples < n_unknowns {
        return Err(AppError::new(
            2,
            format!("Demo needs at least {n_unknowns} samples."),
        ));
    }

    let n = config.samples;
    let step = (config.wavelength_max - config.wavelength_min) / (n as f64 - 1.0).max(1.0);
    let wavelengths: Vec<f64> = (0..n).map(|i| config.wavelength_min + step * i as f64).collect();

    let center = 0.5 * (config.wavelength_min + config.wavelength_max);
    let half_width = 0.5 * (config.wavelength_max - config.wavelength_min);

    let mut columns = Vec::with_capacity(n_unknowns);
    let mut truth = Vec::with_capacity(n_unknowns);
    for ((name, bands), scd) in [ABSORBER_A, ABSORBER_B].into_iter().zip(TRUE_SCD) {
        columns.push((name.to_string(), cross_section(&wavelengths, bands)));
        truth.push(scd);
    }
    for k in 0..=config.baseline_order {
        let values = wavelengths
            .iter()
            .map(|&wl| ((wl - center) / half_width).powi(k as i32))
            .collect();
        columns.push((format!("poly_{k}"), values));
        truth.push(TRUE_BASELINE[k]);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let observed = (0..n)
        .map(|i| {
            let clean: f64 = columns
                .iter()
                .zip(&truth)
                .map(|((_, values), coeff)| values[i] * coeff)
                .sum();
            clean + normal.sample(&mut rng)
        })
        .collect();

    Ok(SyntheticSpectrum {
        wavelengths,
        columns,
        truth,
        observed,
        sigma: vec![config.noise; n],
    })
}

fn cross_section(wavelengths: &[f64], bands: &[Band]) -> Vec<f64> {
    wavelengths
        .iter()
        .map(|&wl| {
            bands
                .iter()
                .map(|&(c, w, peak)| peak * (-0.5 * ((wl - c) / w).powi(2)).exp())
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::DecompositionMode;

    fn config() -> DemoConfig {
        DemoConfig {
            samples: 200,
            seed: 7,
            noise: 1e-4,
            mode: DecompositionMode::Svd,
            baseline_order: 2,
            wavelength_min: 330.0,
            wavelength_max: 370.0,
            export: None,
        }
    }

    #[test]
    fn spectrum_has_consistent_shapes() {
        let s = generate_spectrum(&config()).unwrap();
        assert_eq!(s.wavelengths.len(), 200);
        assert_eq!(s.columns.len(), 5);
        assert_eq!(s.truth.len(), 5);
        assert!(s.columns.iter().all(|(_, v)| v.len() == 200));
        assert_eq!(s.labels()[2], "poly_0");
        assert!((s.wavelengths[199] - 370.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_noise() {
        let a = generate_spectrum(&config()).unwrap();
        let b = generate_spectrum(&config()).unwrap();
        assert_eq!(a.observed, b.observed);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut c = config();
        c.noise = 0.0;
        assert!(generate_spectrum(&c).is_err());

        let mut c = config();
        c.samples = 3;
        assert!(generate_spectrum(&c).is_err());

        let mut c = config();
        c.baseline_order = 9;
        assert!(generate_spectrum(&c).is_err());
    }
}
