// Leaf factory helpers: convenience constructors over the matrix capability.

use crate::graph::{Graph, NodeId};
use crate::matrix;

impl Graph {
    /// A leaf filled with `fill`.
    pub fn full(&mut self, rows: usize, cols: usize, fill: f64) -> NodeId {
        self.leaf(matrix::full(rows, cols, fill))
    }

    /// A 1x1 leaf holding a single scalar.
    pub fn scalar(&mut self, value: f64) -> NodeId {
        self.leaf(matrix::scalar(value))
    }

    /// A zero-filled column vector leaf.
    pub fn vector(&mut self, rows: usize) -> NodeId {
        self.leaf(matrix::zeros(rows, 1))
    }

    /// A column vector leaf built from an explicit literal sequence.
    pub fn vector_from(&mut self, values: &[f64]) -> NodeId {
        self.leaf(matrix::column(values))
    }

    /// A random column vector leaf, uniform in [-1, 1).
    pub fn random(&mut self, rows: usize) -> NodeId {
        self.leaf(matrix::random(rows, 1))
    }

    /// A random matrix leaf, uniform in [-1, 1).
    pub fn random2(&mut self, rows: usize, cols: usize) -> NodeId {
        self.leaf(matrix::random(rows, cols))
    }

    /// A random matrix leaf drawn from the standard normal.
    pub fn randn(&mut self, rows: usize, cols: usize) -> NodeId {
        self.leaf(matrix::randn(rows, cols))
    }
}
