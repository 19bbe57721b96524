//! Fallible dense storage allocation.
//!
//! `DMatrix::zeros` aborts the process when memory cannot be reserved. The
//! linear system reports that condition as an error instead, so all of its
//! storage goes through these helpers.

use nalgebra::{DMatrix, DVector};

use crate::linear::LinearError;

/// Reserve a zero-filled `rows x cols` matrix.
pub fn try_zeros(rows: usize, cols: usize) -> Result<DMatrix<f64>, LinearError> {
    let data = try_zeroed_vec(rows, cols)?;
    Ok(DMatrix::from_vec(rows, cols, data))
}

/// Reserve a zero-filled vector of length `len`.
pub fn try_zeros_vector(len: usize) -> Result<DVector<f64>, LinearError> {
    let data = try_zeroed_vec(len, 1)?;
    Ok(DVector::from_vec(data))
}

fn try_zeroed_vec(rows: usize, cols: usize) -> Result<Vec<f64>, LinearError> {
    let err = || LinearError::Allocation { rows, cols };
    let len = rows.checked_mul(cols).ok_or_else(err)?;
    let mut data: Vec<f64> = Vec::new();
    data.try_reserve_exact(len).map_err(|_| err())?;
    data.resize(len, 0.0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_have_requested_shape() {
        let m = try_zeros(4, 3).unwrap();
        assert_eq!(m.shape(), (4, 3));
        assert!(m.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn overflowing_size_is_an_allocation_error() {
        let err = try_zeros(usize::MAX, 2).unwrap_err();
        assert_eq!(
            err,
            LinearError::Allocation {
                rows: usize::MAX,
                cols: 2
            }
        );
    }

    #[test]
    fn huge_request_is_reported_not_aborted() {
        // Fits in usize but not in any address space.
        assert!(try_zeros_vector(usize::MAX / 8).is_err());
    }
}
