//! Activation functions: ReLU, LeakyReLU, Sigmoid and Softmax.

use ndarray::Array2;

use crate::matrix::Matrix;
use crate::ops::Operator;

/// Rectified Linear Unit, `max(0, x)` elementwise.
#[derive(Debug, Default)]
pub struct ReLU;

impl Operator for ReLU {
    fn name(&self) -> &'static str {
        "ReLU"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].mapv(|x| x.max(0.0))
    }

    fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        inputs[0].mapv(|x| if x > 0.0 { 1.0 } else { 0.0 }) * upstream
    }
}

/// LeakyReLU with a configurable leak slope on the negative side.
#[derive(Debug)]
pub struct LeakyReLU {
    leak: f64,
}

impl LeakyReLU {
    pub fn new(leak: f64) -> Self {
        LeakyReLU { leak }
    }
}

impl Default for LeakyReLU {
    fn default() -> Self {
        LeakyReLU { leak: 0.1 }
    }
}

impl Operator for LeakyReLU {
    fn name(&self) -> &'static str {
        "LeakyReLU"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].mapv(|x| if x > 0.0 { x } else { self.leak * x })
    }

    fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        inputs[0].mapv(|x| if x > 0.0 { 1.0 } else { self.leak }) * upstream
    }
}

/// Logistic sigmoid, `1 / (1 + exp(-x))` elementwise.
#[derive(Debug, Default)]
pub struct Sigmoid;

impl Operator for Sigmoid {
    fn name(&self) -> &'static str {
        "Sigmoid"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].mapv(|x| 1.0 / (1.0 + (-x).exp()))
    }

    fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        inputs[0].mapv(|x| {
            let e = (-x).exp();
            e / ((1.0 + e) * (1.0 + e))
        }) * upstream
    }
}

/// Softmax over a column vector, `exp(x) / sum(exp(x))`.
///
/// Unlike the elementwise operators this one couples every output to every
/// input, so the backward pass applies the full Jacobian
/// `diag(s) - s·sᵀ` to the upstream gradient.
#[derive(Debug, Default)]
pub struct Softmax;

impl Operator for Softmax {
    fn name(&self) -> &'static str {
        "Softmax"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        let exp = inputs[0].mapv(f64::exp);
        let sum = exp.sum();
        exp.mapv(|x| x / sum)
    }

    fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        let exp = inputs[0].mapv(f64::exp);
        let sum = exp.sum();
        let softmax = exp.mapv(|x| x / sum);

        let diagonal = Array2::from_diag(&softmax.column(0).to_owned());
        let jacobian = diagonal - softmax.dot(&softmax.t());
        jacobian.dot(upstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grad_check::check_grad;
    use crate::matrix;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-5;
    const TOLERANCE: f64 = 1e-5;

    #[test]
    fn test_relu_forward() {
        let a = matrix::column(&[-2.0, -1.0, 0.0, 1.0, 2.0]);
        let out = ReLU.compute(&[a]);
        let expected = [0.0, 0.0, 0.0, 1.0, 2.0];
        for (i, &e) in expected.iter().enumerate() {
            assert_relative_eq!(out[[i, 0]], e);
        }
    }

    #[test]
    fn test_leaky_relu_forward() {
        let a = matrix::column(&[0.1, -0.2, 0.1]);
        let out = LeakyReLU::new(0.1).compute(&[a]);
        assert_relative_eq!(out[[0, 0]], 0.1);
        assert_relative_eq!(out[[1, 0]], -0.02);
        assert_relative_eq!(out[[2, 0]], 0.1);
    }

    #[test]
    fn test_leaky_relu_default_leak() {
        let a = matrix::column(&[-1.0]);
        let out = LeakyReLU::default().compute(&[a]);
        assert_relative_eq!(out[[0, 0]], -0.1);
    }

    #[test]
    fn test_sigmoid_forward() {
        let a = matrix::scalar(0.0);
        let out = Sigmoid.compute(&[a]);
        assert_relative_eq!(out[[0, 0]], 0.5);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let a = matrix::column(&[1.0, 2.0, 3.0]);
        let out = Softmax.compute(&[a]);
        assert_relative_eq!(out.sum(), 1.0, epsilon = 1e-12);
        assert!(out.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_relu_family_grads() {
        // Inputs bounded away from zero: the ReLU kink has no two-sided
        // derivative and would fail a central-difference comparison.
        let inputs = vec![matrix::random(4, 1).mapv(|x| if x.abs() < 0.2 { x + 0.5 } else { x })];
        check_grad(&ReLU, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&LeakyReLU::new(0.1), &inputs, EPSILON, TOLERANCE).unwrap();
    }

    #[test]
    fn test_sigmoid_grad() {
        let inputs = vec![matrix::randn(3, 2)];
        check_grad(&Sigmoid, &inputs, EPSILON, TOLERANCE).unwrap();
    }

    #[test]
    fn test_softmax_grad() {
        let inputs = vec![matrix::random(4, 1)];
        check_grad(&Softmax, &inputs, EPSILON, TOLERANCE).unwrap();
    }
}
