// Déclare les modules principaux de la crate
pub mod error;
pub mod grad_check;
pub mod graph;
pub mod matrix;
pub mod ops;

// Ré-exporte les types centraux pour qu'ils soient accessibles directement
// via `matgrad_core::Graph` etc.
pub use error::MatGradError;
pub use graph::{Graph, NodeId};
pub use matrix::Matrix;
pub use ops::Operator;
