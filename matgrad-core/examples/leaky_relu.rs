//! Minimal end-to-end pass: LeakyReLU over a small vector.
//!
//! Builds `f = LeakyReLU(a, leak = 0.1)` for `a = [0.1, -0.2, 0.1]`, runs a
//! forward pass, finalizes the graph, then backpropagates a unit seed and
//! prints the input gradient.

use matgrad_core::ops::LeakyReLU;
use matgrad_core::{Graph, MatGradError};

fn main() -> Result<(), MatGradError> {
    let mut graph = Graph::new();

    let a = graph.vector_from(&[0.1, -0.2, 0.1]);
    let f = graph.op(Box::new(LeakyReLU::new(0.1)), &[a])?;

    graph.forward(f)?;
    graph.finalize(f)?;
    print!("{}", graph.dump(f));

    graph.backward(f)?;
    print!("{}", graph.dump_grad(a));

    Ok(())
}
