//! The computation graph arena and its forward/backward machinery.
//!
//! A [`Graph`] owns every node in a single slot vector; operators reference
//! their inputs by [`NodeId`] index. Because an operator can only be wired to
//! ids that already exist, edges always point at strictly older slots and the
//! graph is acyclic by construction.
//!
//! Lifecycle of one pass over an assembled graph:
//!
//! 1. `forward(root)` — lazy depth-first evaluation; every node's `compute`
//!    runs at most once per pass regardless of fan-out.
//! 2. `finalize(root)` — one-time walk stamping each node's fan-out (one
//!    increment per consumer edge) and propagating differentiability upward;
//!    must happen exactly once, after the first forward, before any backward.
//! 3. `backward(root)` — reverse-mode sweep; each node accumulates partials
//!    from its consumers and pushes downstream exactly once, when the last
//!    expected consumer has reported. Fan-in counting stands in for an
//!    explicit topological sort.
//! 4. `reset(root)` — clears the per-pass flags so leaves can be mutated and
//!    the graph re-run without reassembly.

mod create;
mod debug;
mod node;

pub use node::NodeId;

use node::{Node, NodeKind};

use crate::error::MatGradError;
use crate::matrix::{self, Matrix};
use crate::ops::Operator;

/// Arena of computation nodes supporting forward evaluation and reverse-mode
/// gradient accumulation.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
    finalized: bool,
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            nodes: Vec::new(),
            finalized: false,
        }
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Adds a leaf node holding `value`; differentiable by default.
    pub fn leaf(&mut self, value: Matrix) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::leaf(value));
        id
    }

    /// Adds an operator node wired to `inputs`.
    ///
    /// The input list length must equal the operator's arity, and every id
    /// must name an existing slot of this graph.
    pub fn op(
        &mut self,
        op: Box<dyn Operator>,
        inputs: &[NodeId],
    ) -> Result<NodeId, MatGradError> {
        if inputs.len() != op.arity() {
            return Err(MatGradError::ArityMismatch {
                operator: op.name().to_string(),
                expected: op.arity(),
                actual: inputs.len(),
            });
        }
        for &input in inputs {
            self.check_id(input)?;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::operator(op, inputs.to_vec()));
        Ok(id)
    }

    /// The node's current value. Valid only after `forward` in the current
    /// pass for operator nodes; for leaves it is simply the stored matrix.
    pub fn value(&self, id: NodeId) -> &Matrix {
        &self.nodes[id.0].value
    }

    /// Overwrites a node's value. Intended for mutating leaves between
    /// passes (together with `reset`).
    pub fn set_value(&mut self, id: NodeId, value: Matrix) {
        self.nodes[id.0].value = value;
    }

    /// The node's accumulated gradient.
    ///
    /// Meaningful only for differentiable nodes after a full backward pass.
    /// Reading the gradient of a constant node is not an error, but the
    /// returned accumulator is stale or zero, so it is flagged in the log.
    pub fn grad(&self, id: NodeId) -> &Matrix {
        let node = &self.nodes[id.0];
        if !node.differentiable {
            log::warn!("grad() called on a non-differentiable (constant) node");
        }
        &node.grad
    }

    /// Marks a leaf as a constant: it no longer takes part in gradient
    /// accumulation. Irreversible for the node's lifetime.
    pub fn mark_constant(&mut self, id: NodeId) {
        self.nodes[id.0].differentiable = false;
    }

    pub fn is_differentiable(&self, id: NodeId) -> bool {
        self.nodes[id.0].differentiable
    }

    /// The node's consumer-edge count, as stamped by `finalize`.
    pub fn fan_out(&self, id: NodeId) -> usize {
        self.nodes[id.0].fan_out
    }

    /// Evaluates the subgraph rooted at `id` and returns its value.
    ///
    /// Memoized: a node whose value is already ready returns it immediately,
    /// so shared sub-expressions are computed once per pass.
    pub fn forward(&mut self, id: NodeId) -> Result<&Matrix, MatGradError> {
        self.check_id(id)?;
        self.forward_node(id);
        Ok(&self.nodes[id.0].value)
    }

    fn forward_node(&mut self, id: NodeId) {
        if self.nodes[id.0].value_ready {
            return;
        }
        let inputs = match &self.nodes[id.0].kind {
            NodeKind::Leaf => return,
            NodeKind::Operator { inputs, .. } => inputs.clone(),
        };
        // Depth-first, left to right.
        for &input in &inputs {
            self.forward_node(input);
        }
        let input_values: Vec<Matrix> = inputs
            .iter()
            .map(|&input| self.nodes[input.0].value.clone())
            .collect();

        let node = &mut self.nodes[id.0];
        if let NodeKind::Operator { op, .. } = &node.kind {
            node.value = op.compute(&input_values);
        }
        node.value_ready = true;
    }

    /// Finalizes the assembled graph rooted at `id`: stamps every node's
    /// fan-out with the multiplicity of its consumer edges, propagates the
    /// differentiability flag (inclusive OR over inputs) and locks output
    /// shapes for the default backward seed.
    ///
    /// Must be called exactly once, after `forward`, before any `backward`.
    /// Every node is visited exactly once; fan-out is incremented once per
    /// consumer edge, so a shared subtree is never over-counted. The root
    /// itself is nobody's input, so its own fan-out stays zero.
    pub fn finalize(&mut self, id: NodeId) -> Result<(), MatGradError> {
        self.check_id(id)?;
        if self.finalized {
            return Err(MatGradError::AlreadyFinalized);
        }
        let root = &self.nodes[id.0];
        if matches!(root.kind, NodeKind::Operator { .. }) && !root.value_ready {
            return Err(MatGradError::NotEvaluated);
        }
        let mut visited = vec![false; self.nodes.len()];
        self.finalize_node(id, &mut visited);
        self.finalized = true;
        log::debug!("graph finalized: {} nodes, root {:?}", self.nodes.len(), id);
        Ok(())
    }

    fn finalize_node(&mut self, id: NodeId, visited: &mut [bool]) {
        if visited[id.0] {
            return;
        }
        visited[id.0] = true;

        let inputs = match &self.nodes[id.0].kind {
            NodeKind::Leaf => Vec::new(),
            NodeKind::Operator { inputs, .. } => inputs.clone(),
        };

        if !inputs.is_empty() {
            let mut differentiable = false;
            for &input in &inputs {
                // One increment per consumer edge, even when both edges come
                // from the same operator.
                self.nodes[input.0].fan_out += 1;
                self.finalize_node(input, visited);
                differentiable = differentiable || self.nodes[input.0].differentiable;
            }
            self.nodes[id.0].differentiable = differentiable;
        }

        let node = &mut self.nodes[id.0];
        let (rows, cols) = node.value.dim();
        node.rows = rows;
        node.cols = cols;
    }

    /// Runs a backward pass from `id` seeded with an all-ones matrix of the
    /// node's finalized shape.
    pub fn backward(&mut self, id: NodeId) -> Result<(), MatGradError> {
        self.check_id(id)?;
        let (rows, cols) = {
            let node = &self.nodes[id.0];
            (node.rows, node.cols)
        };
        self.backward_seeded(id, matrix::full(rows, cols, 1.0))
    }

    /// Runs a backward pass from `id` with an explicit seed gradient.
    pub fn backward_seeded(&mut self, id: NodeId, seed: Matrix) -> Result<(), MatGradError> {
        self.check_id(id)?;
        if !self.finalized {
            return Err(MatGradError::NotFinalized);
        }
        self.backward_node(id, seed)
    }

    fn backward_node(&mut self, id: NodeId, partial: Matrix) -> Result<(), MatGradError> {
        {
            let node = &mut self.nodes[id.0];
            // Accumulating into a constant is a deliberate silent no-op.
            if !node.differentiable {
                return Ok(());
            }
            if partial.dim() != node.value.dim() {
                return Err(MatGradError::GradientShapeMismatch {
                    expected: node.value.dim(),
                    actual: partial.dim(),
                });
            }
            if node.consumers_reported == 0 {
                node.grad = partial;
            } else {
                node.grad += &partial;
            }
            node.consumers_reported += 1;
            // The root's fan-out is zero; the seed counts as its one
            // consumer. Comparing for equality keeps the downstream push to
            // exactly once per pass even under over-reporting.
            if node.consumers_reported != node.fan_out.max(1) {
                return Ok(());
            }
        }

        let inputs = match &self.nodes[id.0].kind {
            NodeKind::Leaf => return Ok(()),
            NodeKind::Operator { inputs, .. } => inputs.clone(),
        };
        let input_values: Vec<Matrix> = inputs
            .iter()
            .map(|&input| self.nodes[input.0].value.clone())
            .collect();
        let upstream = self.nodes[id.0].grad.clone();

        let mut partials = Vec::with_capacity(inputs.len());
        if let NodeKind::Operator { op, .. } = &self.nodes[id.0].kind {
            for wrt in 0..inputs.len() {
                partials.push(op.gradient(wrt, &input_values, &upstream));
            }
        }
        for (&input, partial) in inputs.iter().zip(partials) {
            self.backward_node(input, partial)?;
        }
        Ok(())
    }

    /// Clears per-pass state (`value_ready`, `consumers_reported`) for the
    /// subgraph rooted at `id`, enabling a fresh forward/backward pass with
    /// mutated leaf values. Values and gradients themselves are untouched.
    pub fn reset(&mut self, id: NodeId) -> Result<(), MatGradError> {
        self.check_id(id)?;
        self.reset_node(id);
        Ok(())
    }

    fn reset_node(&mut self, id: NodeId) {
        let inputs = {
            let node = &mut self.nodes[id.0];
            match &node.kind {
                NodeKind::Leaf => {
                    node.value_ready = false;
                    node.consumers_reported = 0;
                    return;
                }
                NodeKind::Operator { inputs, .. } => {
                    // An already-reset subgraph is not walked twice.
                    if !node.value_ready {
                        return;
                    }
                    node.value_ready = false;
                    node.consumers_reported = 0;
                    inputs.clone()
                }
            }
        };
        for input in inputs {
            self.reset_node(input);
        }
    }

    fn check_id(&self, id: NodeId) -> Result<(), MatGradError> {
        if id.0 >= self.nodes.len() {
            return Err(MatGradError::InvalidNodeId {
                index: id.0,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{Add, Exp};
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_sets_value_ready() {
        let mut graph = Graph::new();
        let a = graph.scalar(1.0);
        let f = graph.op(Box::new(Exp), &[a]).unwrap();
        assert!(!graph.nodes[f.0].value_ready);
        graph.forward(f).unwrap();
        assert!(graph.nodes[f.0].value_ready);
    }

    #[test]
    fn test_reset_on_unevaluated_operator_is_a_no_op() {
        let mut graph = Graph::new();
        let a = graph.scalar(1.0);
        let f = graph.op(Box::new(Exp), &[a]).unwrap();
        // The value_ready guard stops the walk before it reaches `a`.
        graph.reset(f).unwrap();
        assert!(!graph.nodes[f.0].value_ready);
    }

    #[test]
    fn test_seeded_backward_scales_gradient() {
        let x = 0.7_f64;
        let mut graph = Graph::new();
        let a = graph.scalar(x);
        let f = graph.op(Box::new(Exp), &[a]).unwrap();
        graph.forward(f).unwrap();
        graph.finalize(f).unwrap();
        graph.backward_seeded(f, matrix::scalar(2.0)).unwrap();
        assert_relative_eq!(graph.grad(a)[[0, 0]], 2.0 * x.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_accumulation_overwrites_then_adds() {
        let mut graph = Graph::new();
        let a = graph.scalar(1.0);
        let b = graph.op(Box::new(Exp), &[a]).unwrap();
        let c = graph.op(Box::new(Exp), &[a]).unwrap();
        let root = graph.op(Box::new(Add), &[b, c]).unwrap();
        graph.forward(root).unwrap();
        graph.finalize(root).unwrap();
        graph.backward(root).unwrap();
        // Two consumers of `a`: the accumulator holds the sum of both
        // partials, e^1 from each branch.
        assert_eq!(graph.nodes[a.0].consumers_reported, 2);
        assert_relative_eq!(graph.grad(a)[[0, 0]], 2.0 * 1.0_f64.exp(), epsilon = 1e-12);
    }
}
