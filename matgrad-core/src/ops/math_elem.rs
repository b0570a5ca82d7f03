//! Elementwise transcendental operators.
//!
//! All of these are unary, shape preserving, and differentiate by multiplying
//! the analytic elementwise derivative into the upstream gradient.

use crate::matrix::Matrix;
use crate::ops::Operator;

macro_rules! elementwise_operator {
    ($name:ident, $label:literal, $forward:expr, $derivative:expr) => {
        #[derive(Debug, Default)]
        pub struct $name;

        impl Operator for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn arity(&self) -> usize {
                1
            }

            fn compute(&self, inputs: &[Matrix]) -> Matrix {
                inputs[0].mapv($forward)
            }

            fn gradient(&self, _wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix {
                inputs[0].mapv($derivative) * upstream
            }
        }
    };
}

elementwise_operator!(Exp, "Exp", f64::exp, f64::exp);
elementwise_operator!(Ln, "Ln", f64::ln, |x: f64| 1.0 / x);
elementwise_operator!(Sin, "Sin", f64::sin, f64::cos);
elementwise_operator!(Cos, "Cos", f64::cos, |x: f64| -x.sin());
elementwise_operator!(Tan, "Tan", f64::tan, |x: f64| {
    let c = x.cos();
    1.0 / (c * c)
});
elementwise_operator!(Sinh, "Sinh", f64::sinh, f64::cosh);
elementwise_operator!(Cosh, "Cosh", f64::cosh, f64::sinh);
elementwise_operator!(Tanh, "Tanh", f64::tanh, |x: f64| {
    let c = x.cosh();
    1.0 / (c * c)
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grad_check::check_grad;
    use crate::matrix;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-5;
    const TOLERANCE: f64 = 1e-5;

    #[test]
    fn test_exp_ln_roundtrip_forward() {
        let a = matrix::column(&[0.5, 1.0, 2.0]);
        let out = Ln.compute(&[Exp.compute(&[a.clone()])]);
        for i in 0..3 {
            assert_relative_eq!(out[[i, 0]], a[[i, 0]], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sin_cos_forward() {
        let a = matrix::scalar(std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(Sin.compute(&[a.clone()])[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(Cos.compute(&[a])[[0, 0]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trig_grads() {
        let inputs = vec![matrix::random(3, 2)];
        check_grad(&Sin, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Cos, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Tan, &inputs, EPSILON, TOLERANCE).unwrap();
    }

    #[test]
    fn test_hyperbolic_grads() {
        let inputs = vec![matrix::random(3, 2)];
        check_grad(&Sinh, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Cosh, &inputs, EPSILON, TOLERANCE).unwrap();
        check_grad(&Tanh, &inputs, EPSILON, TOLERANCE).unwrap();
    }

    #[test]
    fn test_exp_ln_grads() {
        check_grad(&Exp, &[matrix::random(3, 2)], EPSILON, TOLERANCE).unwrap();
        // Ln needs inputs bounded away from zero.
        let positive = vec![matrix::random(3, 2).mapv(|x| x.abs() + 0.5)];
        check_grad(&Ln, &positive, EPSILON, TOLERANCE).unwrap();
    }
}
