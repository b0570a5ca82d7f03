use approx::assert_relative_eq;
use matgrad_core::Matrix;

/// Asserts that a column-major flattening of `matrix` matches `expected`.
#[allow(dead_code)] // not every integration file uses every helper
pub fn assert_matrix_close(matrix: &Matrix, expected: &[f64]) {
    assert_eq!(
        matrix.len(),
        expected.len(),
        "matrix has {} elements, expected {}",
        matrix.len(),
        expected.len()
    );
    for (actual, &wanted) in matrix.iter().zip(expected) {
        assert_relative_eq!(*actual, wanted, epsilon = 1e-10);
    }
}
