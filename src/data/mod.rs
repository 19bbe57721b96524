//! Synthetic input data for demonstrations and tests.

pub mod synthetic;

pub use synthetic::*;
