use thiserror::Error;

/// Custom error type for the matgrad graph engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum MatGradError {
    #[error("Arity mismatch for operator {operator}: expected {expected} inputs, got {actual}")]
    ArityMismatch {
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("Shape mismatch during gradient accumulation: expected {expected:?}, got {actual:?}")]
    GradientShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("backward() called on a graph that was never finalized")]
    NotFinalized,

    #[error("finalize() called twice; a second walk would corrupt fan-out counts")]
    AlreadyFinalized,

    #[error("finalize() called on a root whose value was never computed; run forward() first")]
    NotEvaluated,

    #[error("Node id {index} does not name a slot in this graph (len {len})")]
    InvalidNodeId { index: usize, len: usize },
    // Add more specific errors as needed
}
