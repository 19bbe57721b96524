//! Read problem files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::{LinearProblem, PolyProblem};
use crate::error::AppError;

pub fn read_linear_problem(path: &Path) -> Result<LinearProblem, AppError> {
    read_json(path, "linear problem")
}

pub fn read_poly_problem(path: &Path) -> Result<PolyProblem, AppError> {
    read_json(path, "polynomial problem")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open {what} '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid {what} JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_linear_problem(Path::new("/nonexistent/problem.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn reads_poly_problem() {
        let path = std::env::temp_dir().join(format!("doasfit_poly_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"x": [0, 1, 2], "y": [1, 2, 3], "sigma": [1, 1, 1]}"#).unwrap();
        let p = read_poly_problem(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(p.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(p.sigma.as_deref(), Some(&[1.0, 1.0, 1.0][..]));
    }
}
