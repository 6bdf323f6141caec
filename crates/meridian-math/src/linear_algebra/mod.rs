//! Linear algebra utilities.
//!
//! Thin helpers over `nalgebra` used by the sensitivity chain rule and by
//! calibration.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

/// Multiplies a row vector by a matrix.
///
/// Returns `row · m`, a vector with one entry per column of `m`.
///
/// # Errors
///
/// Returns `MathError::DimensionMismatch` if `row.len() != m.nrows()`.
pub fn row_times_matrix(row: &[f64], m: &DMatrix<f64>) -> MathResult<Vec<f64>> {
    if row.len() != m.nrows() {
        return Err(MathError::DimensionMismatch {
            rows1: 1,
            cols1: row.len(),
            rows2: m.nrows(),
            cols2: m.ncols(),
        });
    }
    let product = DVector::from_column_slice(row).transpose() * m;
    Ok(product.iter().copied().collect())
}

/// Inverts a square matrix using LU decomposition.
///
/// # Errors
///
/// Returns `MathError::SingularMatrix` if the matrix cannot be inverted.
pub fn invert(m: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    if m.nrows() != m.ncols() {
        return Err(MathError::invalid_input("Matrix must be square to invert"));
    }
    m.clone().lu().try_inverse().ok_or(MathError::SingularMatrix)
}

/// Solves a linear system Ax = b using LU decomposition.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(MathError::invalid_input("Matrix must be square"));
    }
    if n != b.len() {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: n,
            rows2: b.len(),
            cols2: 1,
        });
    }
    a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)
}

/// Splits a vector into consecutive slices of the given sizes.
///
/// # Errors
///
/// Returns an error if the sizes do not add up to the vector length.
pub fn split_by_sizes(values: &[f64], sizes: &[usize]) -> MathResult<Vec<Vec<f64>>> {
    let total: usize = sizes.iter().sum();
    if total != values.len() {
        return Err(MathError::invalid_input(format!(
            "Split sizes total {total} but vector has {} entries",
            values.len()
        )));
    }
    let mut offset = 0;
    Ok(sizes
        .iter()
        .map(|size| {
            let part = values[offset..offset + size].to_vec();
            offset += size;
            part
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_row_times_matrix() {
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = row_times_matrix(&[1.0, -1.0], &m).unwrap();
        assert_eq!(result, vec![-3.0, -3.0, -3.0]);
        assert!(row_times_matrix(&[1.0], &m).is_err());
    }

    #[test]
    fn test_invert() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let inv = invert(&a).unwrap();
        let identity = &a * &inv;
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(identity[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_invert_singular() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(invert(&a), Err(MathError::SingularMatrix));
    }

    #[test]
    fn test_solve_linear_system() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 5.0]);

        let x = solve_linear_system(&a, &b).unwrap();

        assert_relative_eq!(x[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_split_by_sizes() {
        let parts = split_by_sizes(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2, 0, 3]).unwrap();
        assert_eq!(parts, vec![vec![1.0, 2.0], vec![], vec![3.0, 4.0, 5.0]]);
        assert!(split_by_sizes(&[1.0, 2.0], &[3]).is_err());
    }

    proptest! {
        #[test]
        fn prop_split_by_sizes_concatenates_back(
            sizes in prop::collection::vec(0usize..5, 0..6),
            seed in -100.0f64..100.0,
        ) {
            let total: usize = sizes.iter().sum();
            let values: Vec<f64> = (0..total).map(|i| seed + i as f64).collect();
            let parts = split_by_sizes(&values, &sizes).unwrap();
            prop_assert_eq!(parts.len(), sizes.len());
            for (part, size) in parts.iter().zip(&sizes) {
                prop_assert_eq!(part.len(), *size);
            }
            prop_assert_eq!(parts.concat(), values);
        }

        #[test]
        fn prop_row_times_matrix_is_linear(
            row in prop::collection::vec(-10.0f64..10.0, 3),
            entries in prop::collection::vec(-10.0f64..10.0, 6),
            factor in -5.0f64..5.0,
        ) {
            let m = DMatrix::from_row_slice(3, 2, &entries);
            let base = row_times_matrix(&row, &m).unwrap();
            let scaled_row: Vec<f64> = row.iter().map(|v| v * factor).collect();
            let scaled = row_times_matrix(&scaled_row, &m).unwrap();
            for (actual, expected) in scaled.iter().zip(&base) {
                prop_assert!((actual - expected * factor).abs() <= 1e-9 * (1.0 + expected.abs()));
            }
        }
    }
}
