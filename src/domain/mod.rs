//! Domain types used throughout the application layer.
//!
//! This module defines:
//!
//! - on-disk problem descriptions (`LinearProblem`, `PolyProblem`)
//! - fit outputs (`FitReport`, `Coefficient`, `FitQuality`)
//! - run configurations derived from CLI flags

pub mod types;

pub use types::*;
