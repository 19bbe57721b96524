//! Input/output helpers.
//!
//! - JSON problem files (`problem`)
//! - JSON reports and CSV spectra (`export`)

pub mod export;
pub mod problem;

pub use export::*;
pub use problem::*;
