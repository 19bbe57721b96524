//! Logger setup for the `doasfit` binary.
//!
//! The library only emits records through the `log` facade; installing a
//! backend is left to the binary.

use flexi_logger::{Logger, LoggerHandle};

use crate::error::AppError;

/// Start logging to stderr with the given filter spec (e.g. `info`, `debug`).
///
/// The returned handle must be kept alive for the duration of the program.
pub fn init(spec: &str) -> Result<LoggerHandle, AppError> {
    Logger::try_with_str(spec)
        .map_err(|e| AppError::new(2, format!("Invalid log level '{spec}': {e}")))?
        .log_to_stderr()
        .start()
        .map_err(|e| AppError::new(2, format!("Logger initialization failed: {e}")))
}
