//! Weighted linear least squares for spectral fitting.
//!
//! A [`LinearSystem`] holds an over-determined system `A x ≈ b` with one row per
//! spectral sample and one column per fitted basis function (cross-sections,
//! baseline polynomial terms, ...). It is driven through a fixed lifecycle:
//!
//! 1. allocate (or copy a dense matrix in)
//! 2. populate columns and apply optional per-sample uncertainties
//! 3. decompose, optionally requesting variance and/or covariance
//! 4. solve for any number of right-hand sides
//!
//! Two interchangeable backends implement the factorization: SVD, which is
//! rank-revealing and supports the pseudo-inverse, and column-pivoted
//! Householder QR, which requires full column rank.

mod backend;
pub mod error;
mod qr;
mod svd;
pub mod system;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use error::LinearError;
pub use system::*;

/// Numerical strategy used to factor a linear system.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DecompositionMode {
    /// Singular value decomposition.
    #[default]
    Svd,
    /// Orthogonal/triangular decomposition.
    Qr,
}

impl DecompositionMode {
    pub fn display_name(self) -> &'static str {
        match self {
            DecompositionMode::Svd => "SVD",
            DecompositionMode::Qr => "QR",
        }
    }
}

impl fmt::Display for DecompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DecompositionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svd" => Ok(DecompositionMode::Svd),
            "qr" => Ok(DecompositionMode::Qr),
            other => Err(format!("unknown decomposition mode '{other}' (expected svd or qr)")),
        }
    }
}
