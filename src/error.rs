use crate::linear::LinearError;

/// Application-level error: a message plus the process exit code.
///
/// Exit codes: `2` bad input or I/O, `3` empty input, `4` numerical failure.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<LinearError> for AppError {
    fn from(err: LinearError) -> Self {
        let exit_code = match err {
            LinearError::EmptySystem => 3,
            LinearError::DimensionMismatch { .. }
            | LinearError::ColumnOutOfRange { .. }
            | LinearError::InvalidWeight { .. }
            | LinearError::Underdetermined { .. } => 2,
            _ => 4,
        };
        Self::new(exit_code, format!("Linear fit failed: {err}."))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_errors_map_to_exit_codes() {
        let numeric: AppError = LinearError::Normalization { column: 1 }.into();
        assert_eq!(numeric.exit_code(), 4);
        assert!(numeric.to_string().contains("column 1"));

        let input: AppError = LinearError::Underdetermined { rows: 2, cols: 3 }.into();
        assert_eq!(input.exit_code(), 2);
    }
}
