//! Fitting entry points built on top of the linear system.
//!
//! - weighted polynomial fits (`polynomial`)
//! - solving a dense problem end to end, with its report (`problem`)

pub mod polynomial;
pub mod problem;

pub use polynomial::*;
pub use problem::*;
