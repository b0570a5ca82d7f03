//! The operator catalog and the contract it implements.

use std::fmt::Debug;

use crate::matrix::Matrix;

pub mod activation;
pub mod arithmetic;
pub mod math_elem;

pub use activation::{LeakyReLU, ReLU, Sigmoid, Softmax};
pub use arithmetic::{Add, MatMul, Neg, Pow, Reciprocal, Sqrt, Sub};
pub use math_elem::{Cos, Cosh, Exp, Ln, Sin, Sinh, Tan, Tanh};

/// Defines the math of a single fixed-arity operator node.
///
/// The graph engine owns all lifecycle bookkeeping (lazy evaluation, fan-out
/// counting, gradient accumulation); an `Operator` only supplies the forward
/// formula and its local chain-rule partial. Both methods must be pure
/// functions of the current input values and must never mutate them.
///
/// `gradient` receives the node's accumulated `upstream` gradient and must
/// fold it in per the chain rule: elementwise multiplication for elementwise
/// operators, matrix product with a transpose for bilinear ones.
///
/// The engine is single-threaded (plain recursive traversal), so no
/// `Send + Sync` bound is required.
pub trait Operator: Debug {
    /// Operator label used in diagnostics and debug dumps.
    fn name(&self) -> &'static str;

    /// The fixed fan-in count; construction validates the input list against it.
    fn arity(&self) -> usize;

    /// Computes the node value from the (already evaluated) input values.
    fn compute(&self, inputs: &[Matrix]) -> Matrix;

    /// The partial to propagate to input `wrt`, with `upstream` folded in.
    fn gradient(&self, wrt: usize, inputs: &[Matrix], upstream: &Matrix) -> Matrix;
}
