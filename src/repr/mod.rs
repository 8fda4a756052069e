//! Trained model representation: trees and forests.

mod forest;
mod tree;

pub use forest::Forest;
pub use tree::{Node, NodeId, Tree, TreeValidationError, INVALID_NODE};
