//! Export fit results.
//!
//! - JSON reports for `solve` / `poly`
//! - per-sample CSV for the synthetic demo

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;

/// Write any serializable report as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| AppError::new(2, format!("Failed to write JSON: {e}")))
}

/// One row of the demo spectrum export.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumRow {
    pub wavelength: f64,
    pub observed: f64,
    pub fitted: f64,
}

/// Write the demo spectrum as CSV.
pub fn write_spectrum_csv(path: &Path, rows: &[SpectrumRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "wavelength_nm,observed,fitted,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    for r in rows {
        writeln!(
            out,
            "{:.4},{:.8e},{:.8e},{:.8e}",
            r.wavelength,
            r.observed,
            r.fitted,
            r.observed - r.fitted
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}
