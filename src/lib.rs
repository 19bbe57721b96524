//! `doas-linfit` library crate.
//!
//! The core is [`linear::LinearSystem`], a weighted linear least-squares
//! solver with interchangeable SVD and QR backends, column normalization,
//! covariance extraction and pseudo-inverse support. [`fit`] builds the
//! polynomial and dense-problem entry points on top of it.
//!
//! The binary (`doasfit`) is a thin wrapper around this library so that the
//! numerical code is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod linear;
pub mod logging;
pub mod math;
pub mod report;
