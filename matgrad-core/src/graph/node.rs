use crate::matrix::{self, Matrix};
use crate::ops::Operator;

/// Index of a node slot inside a [`Graph`](crate::graph::Graph) arena.
///
/// Ids are only meaningful for the graph that handed them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a node slot is: a plain leaf (input or parameter), or an operator
/// applied to earlier slots. Operator inputs are arena indices, never owned
/// references, so the DAG edges carry no lifetime obligations.
pub(crate) enum NodeKind {
    Leaf,
    Operator {
        op: Box<dyn Operator>,
        inputs: Vec<NodeId>,
    },
}

/// One slot of the graph arena.
///
/// Per-pass state machine:
/// `UNEVALUATED -> (forward) -> READY -> (backward while consumers remain)
/// -> ACCUMULATING -> (last consumer reported) -> PROPAGATED`.
/// `reset` returns the slot to `UNEVALUATED`; `grad` keeps the previous
/// pass's result until the next pass's first accumulation overwrites it.
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) value: Matrix,
    pub(crate) grad: Matrix,
    /// False only for constants; an operator is differentiable iff at least
    /// one of its inputs is (set during finalize).
    pub(crate) differentiable: bool,
    pub(crate) value_ready: bool,
    /// Number of distinct consumer edges, stamped by finalize.
    pub(crate) fan_out: usize,
    /// Backward calls received so far in the current pass.
    pub(crate) consumers_reported: usize,
    /// Output shape locked at finalize, used for the default backward seed.
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl Node {
    pub(crate) fn leaf(value: Matrix) -> Self {
        let (rows, cols) = value.dim();
        Node {
            kind: NodeKind::Leaf,
            grad: matrix::zeros(rows, cols),
            value,
            differentiable: true,
            value_ready: false,
            fan_out: 0,
            consumers_reported: 0,
            rows,
            cols,
        }
    }

    pub(crate) fn operator(op: Box<dyn Operator>, inputs: Vec<NodeId>) -> Self {
        Node {
            kind: NodeKind::Operator { op, inputs },
            value: matrix::empty(),
            grad: matrix::empty(),
            differentiable: true,
            value_ready: false,
            fan_out: 0,
            consumers_reported: 0,
            rows: 0,
            cols: 0,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match &self.kind {
            NodeKind::Leaf => "Leaf",
            NodeKind::Operator { op, .. } => op.name(),
        }
    }
}
