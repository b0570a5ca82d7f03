//! Checks analytical operator gradients against central-difference numerics.

use approx::relative_eq;
use ndarray::Array2;
use thiserror::Error;

use crate::matrix::Matrix;
use crate::ops::Operator;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical:?} != numerical {numerical:?} (difference {difference:?})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Gradient is NaN or infinite for input {input_index}, element {element_index}: analytical {analytical:?}, numerical {numerical:?}")]
    NonFiniteGradient {
        input_index: usize,
        element_index: usize,
        analytical: f64,
        numerical: f64,
    },
}

/// Compares `op.gradient()` against a central-difference gradient of
/// `op.compute()` for every element of every input.
///
/// The scalar loss is the output weighted by a deterministic non-uniform
/// seed, `sum(seed ⊙ compute(inputs))`, and the same seed is fed to the
/// analytic side as the upstream gradient. A uniform all-ones seed would
/// make operators with a non-diagonal Jacobian (Softmax) degenerate to a
/// zero gradient and mask errors.
pub fn check_grad(
    op: &dyn Operator,
    inputs: &[Matrix],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    let output = op.compute(inputs);
    let seed = loss_seed(&output);

    for input_index in 0..op.arity() {
        let analytic = op.gradient(input_index, inputs, &seed);

        let (rows, cols) = inputs[input_index].dim();
        for r in 0..rows {
            for c in 0..cols {
                let element_index = r * cols + c;

                let mut plus = inputs.to_vec();
                plus[input_index][[r, c]] += epsilon;
                let loss_plus = weighted_loss(op, &plus, &seed);

                let mut minus = inputs.to_vec();
                minus[input_index][[r, c]] -= epsilon;
                let loss_minus = weighted_loss(op, &minus, &seed);

                let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
                let analytical = analytic[[r, c]];

                if !numerical.is_finite() || !analytical.is_finite() {
                    return Err(GradCheckError::NonFiniteGradient {
                        input_index,
                        element_index,
                        analytical,
                        numerical,
                    });
                }

                if !relative_eq!(
                    analytical,
                    numerical,
                    epsilon = tolerance,
                    max_relative = tolerance
                ) {
                    return Err(GradCheckError::GradientMismatch {
                        input_index,
                        element_index,
                        analytical,
                        numerical,
                        difference: (analytical - numerical).abs(),
                    });
                }
            }
        }
    }

    Ok(())
}

fn weighted_loss(op: &dyn Operator, inputs: &[Matrix], seed: &Matrix) -> f64 {
    (op.compute(inputs) * seed).sum()
}

/// A deterministic, element-varying upstream seed matching `output`'s shape.
fn loss_seed(output: &Matrix) -> Matrix {
    let cols = output.ncols();
    Array2::from_shape_fn(output.raw_dim(), |(r, c)| 1.0 + 0.25 * (r * cols + c) as f64)
}
