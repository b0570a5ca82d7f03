// Human-readable node dumps. Not part of any machine-readable protocol.

use crate::graph::{Graph, NodeId};
use crate::matrix::format_matrix;

impl Graph {
    /// Formats a node's label and current value for debugging.
    pub fn dump(&self, id: NodeId) -> String {
        let node = self.node(id);
        let (rows, cols) = node.value.dim();
        format!(
            "{}: ({}x{})\n----\n{}----\n",
            node.label(),
            rows,
            cols,
            format_matrix(&node.value)
        )
    }

    /// Formats a node's label and accumulated gradient for debugging.
    pub fn dump_grad(&self, id: NodeId) -> String {
        let node = self.node(id);
        format!(
            "{} grad:\n----\n{}----\n",
            node.label(),
            format_matrix(&node.grad)
        )
    }
}
