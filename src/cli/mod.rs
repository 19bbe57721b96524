//! Command-line parsing for `doasfit`.
//!
//! Argument parsing and command dispatch are kept apart from the numerical
//! code in `linear` and `fit`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::linear::DecompositionMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "doasfit", version, about = "Weighted linear least-squares fitting for DOAS retrievals")]
pub struct Cli {
    /// Log filter (overrides DOASFIT_LOG / RUST_LOG), e.g. `debug`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve a linear problem stored as JSON and print coefficients with uncertainties.
    Solve(SolveArgs),
    /// Fit a polynomial to (x, y[, sigma]) samples stored as JSON.
    Poly(PolyArgs),
    /// Fit a synthetic DOAS spectrum (two absorbers plus a polynomial baseline).
    Demo(DemoArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SolveArgs {
    /// Problem file: {"matrix": [[...]], "rhs": [...], "sigma": [...], "labels": [...]}.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// Decomposition backend (defaults to DOASFIT_MODE, else svd).
    #[arg(long, value_enum)]
    pub mode: Option<DecompositionMode>,

    /// Include the full covariance matrix in the report.
    #[arg(long)]
    pub covariance: bool,

    /// Include the pseudo-inverse in the report (svd only).
    #[arg(long)]
    pub pinv: bool,

    /// Write the report as JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PolyArgs {
    /// Samples file: {"x": [...], "y": [...], "sigma": [...]}.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// Polynomial degree.
    #[arg(long, default_value_t = 2)]
    pub order: usize,

    /// Write the fitted coefficients as JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of spectral samples.
    #[arg(short = 'n', long, default_value_t = 400)]
    pub samples: usize,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the optical-depth noise.
    #[arg(long, default_value_t = 1e-3)]
    pub noise: f64,

    /// Decomposition backend (defaults to DOASFIT_MODE, else svd).
    #[arg(long, value_enum)]
    pub mode: Option<DecompositionMode>,

    /// Degree of the baseline polynomial.
    #[arg(long, default_value_t = 3)]
    pub baseline_order: usize,

    /// Start of the wavelength window (nm).
    #[arg(long, default_value_t = 330.0)]
    pub wl_min: f64,

    /// End of the wavelength window (nm).
    #[arg(long, default_value_t = 370.0)]
    pub wl_max: f64,

    /// Export wavelength, observed, fitted and residual optical depth to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
