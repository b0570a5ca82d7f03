//! Arithmetic operators: addition, subtraction, matrix product, negation,
//! elementwise reciprocal, power and square root.

use crate::matrix::Matrix;
use crate::ops::Operator;

/// Elementwise addition of two equally shaped matrices.
#[derive(Debug, Default)]
pub struct Add;

impl Operator for Add {
    fn name(&self) -> &'static str {
        "Add"
    }

    fn arity(&self) -> usize {
        2
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        &inputs[0] + &inputs[1]
    }

    fn gradient(&self, _wrt: usize, _inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        upstream.clone()
    }
}

/// Elementwise subtraction `a - b`.
#[derive(Debug, Default)]
pub struct Sub;

impl Operator for Sub {
    fn name(&self) -> &'static str {
        "Sub"
    }

    fn arity(&self) -> usize {
        2
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        &inputs[0] - &inputs[1]
    }

    fn gradient(&self, wrt: usize, _inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        if wrt == 0 {
            upstream.clone()
        } else {
            upstream.mapv(|x| -x)
        }
    }
}

/// Matrix product `a · b`.
///
/// The chain rule for the bilinear product uses transposed operands:
/// d/da = upstream · bᵀ and d/db = aᵀ · upstream.
#[derive(Debug, Default)]
pub struct MatMul;

impl Operator for MatMul {
    fn name(&self) -> &'static str {
        "MatMul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].dot(&inputs[1])
    }

    fn gradient(&self, wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        if wrt == 0 {
            upstream.dot(&inputs[1].t())
        } else {
            inputs[0].t().dot(upstream)
        }
    }
}

/// Elementwise negation.
#[derive(Debug, Default)]
pub struct Neg;

impl Operator for Neg {
    fn name(&self) -> &'static str {
        "Neg"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].mapv(|x| -x)
    }

    fn gradient(&self, _wrt: usize, _inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        upstream.mapv(|x| -x)
    }
}

/// Elementwise reciprocal `1 / x`.
#[derive(Debug, Default)]
pub struct Reciprocal;

impl Operator for Reciprocal {
    fn name(&self) -> &'static str {
        "Reciprocal"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].mapv(|x| 1.0 / x)
    }

    fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        inputs[0].mapv(|x| -1.0 / (x * x)) * upstream
    }
}

/// Elementwise power with a fixed exponent parameter.
#[derive(Debug)]
pub struct Pow {
    exponent: f64,
}

impl Pow {
    pub fn new(exponent: f64) -> Self {
        Pow { exponent }
    }
}

impl Operator for Pow {
    fn name(&self) -> &'static str {
        "Pow"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].mapv(|x| x.powf(self.exponent))
    }

    fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        inputs[0].mapv(|x| self.exponent * x.powf(self.exponent - 1.0)) * upstream
    }
}

/// Elementwise square root.
#[derive(Debug, Default)]
pub struct Sqrt;

impl Operator for Sqrt {
    fn name(&self) -> &'static str {
        "Sqrt"
    }

    fn arity(&self) -> usize {
        1
    }

    fn compute(&self, inputs: &[Matrix]) -> Matrix {
        inputs[0].mapv(f64::sqrt)
    }

    fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
        inputs[0].mapv(|x| 0.5 / x.sqrt()) * upstream
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
    fn test_add_forward() {
        let a = matrix::column(&[1.0, 2.0]);
        let b = matrix::column(&[0.5, -1.0]);
        let out = Add.compute(&[a, b]);
        assert_relative_eq!(out[[0, 0]], 1.5);
        assert_relative_eq!(out[[1, 0]], 1.0);
    }

    #[test]
    fn test_sub_forward() {
        let a = matrix::column(&[1.0, 2.0]);
        let b = matrix::column(&[0.5, -1.0]);
        let out = Sub.compute(&[a, b]);
        assert_relative_eq!(out[[0, 0]], 0.5);
        assert_relative_eq!(out[[1, 0]], 3.0);
    }

    #[test]
    fn test_matmul_forward() {
        let a = matrix::full(2, 3, 1.0);
        let b = matrix::column(&[1.0, 2.0, 3.0]);
        let out = MatMul.compute(&[a, b]);
        assert_eq!(out.dim(), (2, 1));
        assert_relative_eq!(out[[0, 0]], 6.0);
        assert_relative_eq!(out[[1, 0]], 6.0);
    }

    #[test]
    fn test_pow_forward() {
        let a = matrix::column(&[2.0, 3.0]);
        let out = Pow::new(2.0).compute(&[a]);
        assert_relative_eq!(out[[0, 0]], 4.0);
        assert_relative_eq!(out[[1, 0]], 9.0);
    }

    #[test]
    fn test_add_sub_neg_grad() {
        let inputs = vec![matrix::randn(3, 2), matrix::randn(3, 2)];
        check_grad(&Add, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Sub, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Neg, &inputs[..1], EPSILON, TOLERANCE).unwrap();
    }

    #[test]
    fn test_matmul_grad() {
        let inputs = vec![matrix::randn(2, 3), matrix::randn(3, 2)];
        check_grad(&MatMul, &inputs, EPSILON, TOLERANCE).unwrap();
    }

    #[test]
    fn test_pow_sqrt_reciprocal_grad() {
        // Positive inputs: fractional powers and sqrt are undefined below zero,
        // and the reciprocal check must stay away from the pole at zero.
        let inputs = vec![matrix::random(3, 1).mapv(|x| x.abs() + 0.5)];
        check_grad(&Pow::new(2.5), &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Sqrt, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Reciprocal, &inputs, EPSILON, TOLERANCE).unwrap();
    }
}
