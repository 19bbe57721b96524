//! Mathematical utilities: fallible dense storage and polynomial bases.

pub mod dense;
pub mod polynomial;

pub use dense::*;
