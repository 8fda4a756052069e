//! Binary regression tree with leaf payloads.
//!
//! Nodes live in a flat arena indexed by [`NodeId`]; children are arena
//! indices rather than owned pointers, which keeps deep trees cheap to build
//! and drop. A leaf carries the raw target values of the training rows that
//! reached it, so callers can compute their own statistics (mean, median,
//! quantiles) after evaluation.

use crate::data::Scalar;

/// Node identifier within one tree's arena.
pub type NodeId = u32;

/// Placeholder child id used while a subtree is still under construction.
pub const INVALID_NODE: NodeId = NodeId::MAX;

/// One tree node: an axis-aligned split or a leaf payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T> {
    /// Internal decision node: rows with `row[feature] < pivot` descend left.
    Split {
        feature: usize,
        pivot: T,
        left: NodeId,
        right: NodeId,
    },
    /// Terminal node carrying the target values that fell into it.
    Leaf { values: Vec<T> },
}

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("root node {root} out of bounds ({n_nodes} nodes)")]
    RootOutOfBounds { root: NodeId, n_nodes: usize },
    #[error("node {node} references out-of-bounds child {child}")]
    ChildOutOfBounds { node: NodeId, child: NodeId },
    #[error("node {node} reached by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("node {node} unreachable from the root")]
    UnreachableNode { node: NodeId },
}

/// A binary regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
}

impl<T: Scalar> Tree<T> {
    /// Assemble a tree from an arena and a root id.
    ///
    /// The builder and the parser both produce arenas where every split
    /// references two in-bounds children; [`Tree::validate`] checks this.
    pub fn from_nodes(nodes: Vec<Node<T>>, root: NodeId) -> Self {
        debug_assert!((root as usize) < nodes.len());
        Self { nodes, root }
    }

    /// The root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Borrow a node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id as usize]
    }

    /// Iterate over all nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }

    /// Walk a feature row from the root to its leaf and borrow the payload.
    ///
    /// # Panics
    ///
    /// Panics if `row` is shorter than a feature index used by a split.
    pub fn eval(&self, row: &[T]) -> &[T] {
        let mut id = self.root;
        loop {
            match &self.nodes[id as usize] {
                Node::Leaf { values } => return values,
                Node::Split {
                    feature,
                    pivot,
                    left,
                    right,
                } => {
                    id = if row[*feature] < *pivot { *left } else { *right };
                }
            }
        }
    }

    /// Maximum leaf depth; a single-leaf tree has depth 0.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match &self.nodes[id as usize] {
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        max_depth
    }

    /// Validate structural invariants: every split has two in-bounds
    /// children, and every node is reached exactly once from the root.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.nodes.len();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        if self.root as usize >= n_nodes {
            return Err(TreeValidationError::RootOutOfBounds {
                root: self.root,
                n_nodes,
            });
        }

        let mut visited = vec![false; n_nodes];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if visited[id as usize] {
                return Err(TreeValidationError::DuplicateVisit { node: id });
            }
            visited[id as usize] = true;

            if let Node::Split { left, right, .. } = &self.nodes[id as usize] {
                for child in [*left, *right] {
                    if child as usize >= n_nodes {
                        return Err(TreeValidationError::ChildOutOfBounds { node: id, child });
                    }
                    stack.push(child);
                }
            }
        }

        if let Some(node) = visited.iter().position(|&v| !v) {
            return Err(TreeValidationError::UnreachableNode {
                node: node as NodeId,
            });
        }

        Ok(())
    }
}
