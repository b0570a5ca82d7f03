//! Adapter over the dense matrix backend.
//!
//! The graph engine only needs an opaque dense real matrix with elementwise
//! arithmetic, matrix product, transpose and sum reduction. All of that is
//! consumed directly from [`ndarray`]; this module pins the concrete type and
//! gathers the construction helpers so backend details never leak into the
//! graph code.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// The dense matrix type every node value and gradient is stored as.
pub type Matrix = Array2<f64>;

/// A rows x cols matrix with every element set to `fill`.
pub fn full(rows: usize, cols: usize, fill: f64) -> Matrix {
    Array2::from_elem((rows, cols), fill)
}

/// A rows x cols matrix of zeros.
pub fn zeros(rows: usize, cols: usize) -> Matrix {
    Array2::zeros((rows, cols))
}

/// The 0x0 placeholder used for values and gradients that were never computed.
pub fn empty() -> Matrix {
    Array2::zeros((0, 0))
}

/// A 1x1 matrix holding a single scalar.
pub fn scalar(value: f64) -> Matrix {
    Array2::from_elem((1, 1), value)
}

/// An all-ones matrix with the same shape as `like`.
pub fn ones_like(like: &Matrix) -> Matrix {
    Array2::from_elem(like.raw_dim(), 1.0)
}

/// A column vector built from an explicit literal sequence.
pub fn column(values: &[f64]) -> Matrix {
    Array2::from_shape_fn((values.len(), 1), |(i, _)| values[i])
}

/// A rows x cols matrix with elements drawn uniformly from [-1, 1).
pub fn random(rows: usize, cols: usize) -> Matrix {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-1.0..1.0))
}

/// A rows x cols matrix with elements drawn from the standard normal.
pub fn randn(rows: usize, cols: usize) -> Matrix {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| {
        let v: f64 = StandardNormal.sample(&mut rng);
        v
    })
}

/// Formats a matrix row by row for human-readable debug dumps.
pub fn format_matrix(matrix: &Matrix) -> String {
    let mut out = String::new();
    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            out.push_str(&format!("{:>10.4}", matrix[[i, j]]));
        }
        out.push('\n');
    }
    out
}
