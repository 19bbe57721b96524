//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - read from JSON problem files
//! - built from CLI flags
//! - exported as JSON fit reports

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::linear::DecompositionMode;

/// A linear least-squares problem as stored on disk.
///
/// `matrix` is row-major with one row per sample and one entry per unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearProblem {
    pub matrix: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
    /// Per-sample uncertainties.
    #[serde(default)]
    pub sigma: Option<Vec<f64>>,
    /// Names of the unknowns (cross-section / baseline term names).
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl LinearProblem {
    /// Validate shapes and build the dense design matrix.
    pub fn design(&self) -> Result<DMatrix<f64>, AppError> {
        let rows = self.matrix.len();
        if rows == 0 {
            return Err(AppError::new(3, "Problem matrix has no rows."));
        }
        let cols = self.matrix[0].len();
        if let Some((i, row)) = self.matrix.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(AppError::new(
                2,
                format!("Problem matrix row {i} has {} entries, expected {cols}.", row.len()),
            ));
        }
        if self.rhs.len() != rows {
            return Err(AppError::new(
                2,
                format!("Right-hand side has {} entries, expected {rows}.", self.rhs.len()),
            ));
        }
        if let Some(labels) = &self.labels {
            if labels.len() != cols {
                return Err(AppError::new(
                    2,
                    format!("Got {} labels for {cols} unknowns.", labels.len()),
                ));
            }
        }
        if self.matrix.iter().flatten().chain(&self.rhs).any(|v| !v.is_finite()) {
            return Err(AppError::new(2, "Problem contains non-finite values."));
        }
        Ok(DMatrix::from_fn(rows, cols, |i, j| self.matrix[i][j]))
    }

    /// Label of unknown `j`, falling back to `x{j}`.
    pub fn label(&self, j: usize) -> String {
        self.labels
            .as_ref()
            .and_then(|l| l.get(j).cloned())
            .unwrap_or_else(|| format!("x{j}"))
    }
}

/// A polynomial fit problem as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolyProblem {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub sigma: Option<Vec<f64>>,
}

/// One fitted unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coefficient {
    pub label: String,
    pub value: f64,
    /// Square root of the coefficient variance.
    pub std_dev: f64,
    /// Column normalization factor used during the fit.
    pub norm: f64,
}

/// Goodness-of-fit diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub n_samples: usize,
    pub n_unknowns: usize,
    pub rank: usize,
    /// Degrees of freedom: `n_samples - rank`.
    pub dof: usize,
    /// Sum of squared (weighted) residuals.
    pub chi_square: f64,
    /// Root mean square of the (weighted) residuals.
    pub rms: f64,
}

/// Result of a linear solve, as printed and exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub mode: DecompositionMode,
    pub coefficients: Vec<Coefficient>,
    pub quality: FitQuality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular_values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covariance: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pseudo_inverse: Option<Vec<Vec<f64>>>,
}

/// Run configuration for `doasfit solve`.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct SolveConfig {
    pub input: PathBuf,
    pub mode: DecompositionMode,
    pub covariance: bool,
    pub pseudo_inverse: bool,
    pub export: Option<PathBuf>,
}

/// Run configuration for `doasfit poly`.
#[derive(Debug, Clone)]
pub struct PolyConfig {
    pub input: PathBuf,
    pub order: usize,
    pub export: Option<PathBuf>,
}

/// Run configuration for `doasfit demo`.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub samples: usize,
    pub seed: u64,
    /// Standard deviation of the optical-depth noise.
    pub noise: f64,
    pub mode: DecompositionMode,
    pub baseline_order: usize,
    pub wavelength_min: f64,
    pub wavelength_max: f64,
    pub export: Option<PathBuf>,
}

/// Convert a dense matrix to row-major nested vectors for JSON export.
pub fn matrix_rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(matrix: Vec<Vec<f64>>, rhs: Vec<f64>) -> LinearProblem {
        LinearProblem {
            matrix,
            rhs,
            sigma: None,
            labels: None,
        }
    }

    #[test]
    fn design_is_row_major() {
        let p = problem(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]], vec![0.0; 3]);
        let a = p.design().unwrap();
        assert_eq!(a.shape(), (3, 2));
        assert_eq!(a[(1, 0)], 3.0);
        assert_eq!(a[(2, 1)], 6.0);
        assert_eq!(matrix_rows(&a), p.matrix);
    }

    #[test]
    fn ragged_matrix_is_rejected() {
        let p = problem(vec![vec![1.0, 2.0], vec![3.0]], vec![0.0; 2]);
        let err = p.design().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn labels_default_to_index() {
        let mut p = problem(vec![vec![1.0, 2.0]], vec![0.0]);
        assert_eq!(p.label(1), "x1");
        p.labels = Some(vec!["O3".into(), "NO2".into()]);
        assert_eq!(p.label(1), "NO2");
    }

    #[test]
    fn problem_json_sigma_is_optional() {
        let p: LinearProblem =
            serde_json::from_str(r#"{"matrix": [[1.0], [2.0]], "rhs": [1.0, 2.0]}"#).unwrap();
        assert!(p.sigma.is_none());
        assert!(p.labels.is_none());
    }
}
