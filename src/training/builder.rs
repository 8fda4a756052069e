//! Depth-first tree construction.
//!
//! The builder drives an explicit frame stack instead of recursing, so tree
//! depth never threatens the call stack. Each frame describes one pending
//! node: its window into the build view, its depth, and the parent slot to
//! fill once the node exists.

use crate::config::BuildConfig;
use crate::data::{BuildView, Scalar};
use crate::repr::{Node, NodeId, Tree, INVALID_NODE};
use crate::utils::{resample_prefix, take, TrainRng};

use super::scorer::SplitScorer;

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    start: usize,
    end: usize,
    depth: usize,
    parent: Option<(NodeId, Side)>,
}

/// Builds one tree over a build view.
///
/// Scratch buffers (the feature-index buffer and the gather buffers for the
/// sorted feature and target) are allocated once and reused across every
/// node of the tree, bounding per-tree allocation to the view size plus the
/// tree itself.
pub struct TreeBuilder<'a, T: Scalar> {
    config: &'a BuildConfig,
    view: BuildView<'a, T>,
    scorer: SplitScorer,
    columns: Vec<usize>,
    feat_buffer: Vec<T>,
    tgt_buffer: Vec<T>,
    num_columns: Option<usize>,
}

impl<'a, T: Scalar> TreeBuilder<'a, T> {
    /// Create a builder for one tree.
    pub fn new(config: &'a BuildConfig, view: BuildView<'a, T>) -> Self {
        let num_rows = view.num_rows();
        let num_cols = view.dataset().num_cols();
        Self {
            config,
            scorer: SplitScorer::new(config, num_rows),
            columns: (0..num_cols).collect(),
            feat_buffer: vec![T::zero(); num_rows],
            tgt_buffer: vec![T::zero(); num_rows],
            num_columns: config.num_columns.resolve(num_cols),
            view,
        }
    }

    /// Grow the tree and return it.
    pub fn build(mut self, rng: &mut TrainRng) -> Tree<T> {
        let mut nodes: Vec<Node<T>> = Vec::new();
        let mut stack = vec![Frame {
            start: 0,
            end: self.view.num_rows(),
            depth: 0,
            parent: None,
        }];

        while let Some(frame) = stack.pop() {
            let id = nodes.len() as NodeId;

            // A pivot inside a leading run of exactly tied feature values
            // sends every row right; such a partition cannot shrink the
            // window, so the frame becomes a leaf.
            let split = self.find_split(&frame, rng).and_then(|(feature, pivot)| {
                let boundary = self.view.partition(feature, pivot, frame.start, frame.end);
                (boundary > frame.start).then_some((feature, pivot, boundary))
            });

            match split {
                None => {
                    let values = take(
                        self.view.dataset().target(),
                        self.view.window(frame.start, frame.end),
                    );
                    nodes.push(Node::Leaf { values });
                }
                Some((feature, pivot, boundary)) => {
                    nodes.push(Node::Split {
                        feature,
                        pivot,
                        left: INVALID_NODE,
                        right: INVALID_NODE,
                    });
                    stack.push(Frame {
                        start: frame.start,
                        end: boundary,
                        depth: frame.depth + 1,
                        parent: Some((id, Side::Left)),
                    });
                    stack.push(Frame {
                        start: boundary,
                        end: frame.end,
                        depth: frame.depth + 1,
                        parent: Some((id, Side::Right)),
                    });
                }
            }

            if let Some((parent, side)) = frame.parent {
                match &mut nodes[parent as usize] {
                    Node::Split { left, right, .. } => match side {
                        Side::Left => *left = id,
                        Side::Right => *right = id,
                    },
                    Node::Leaf { .. } => unreachable!("parent frame is always a split node"),
                }
            }
        }

        Tree::from_nodes(nodes, 0)
    }

    /// Search the sampled feature set for the best split of a window.
    ///
    /// Returns the winning `(feature, pivot)` pair, or `None` when the
    /// window must become a leaf.
    fn find_split(&mut self, frame: &Frame, rng: &mut TrainRng) -> Option<(usize, T)> {
        let size = frame.end - frame.start;
        if self.config.min_leaf_size >= size {
            return None;
        }
        if let Some(max_depth) = self.config.max_depth {
            if frame.depth >= max_depth {
                return None;
            }
        }

        let mut best: Option<(f64, usize, T)> = None;
        let sampled = resample_prefix(&mut self.columns, self.num_columns, rng);

        for &column in sampled {
            self.view.sort_window_by(column, frame.start, frame.end);
            self.view
                .gather_column(column, frame.start, frame.end, &mut self.feat_buffer[..size]);
            self.view
                .gather_target(frame.start, frame.end, &mut self.tgt_buffer[..size]);

            let proposal = self.scorer.score(
                &self.feat_buffer[..size],
                &self.tgt_buffer[..size],
                rng,
            );
            if let Some(proposal) = proposal {
                if best.map_or(true, |(score, _, _)| proposal.score > score) {
                    let pivot = split_value(&self.feat_buffer[..size], proposal.index);
                    best = Some((proposal.score, column, pivot));
                }
            }
        }

        best.map(|(_, column, pivot)| (column, pivot))
    }
}

/// Pivot for a split at `index` of a sorted feature window: the midpoint
/// between the neighboring sorted values, so the decision boundary is not
/// tied to any observed value.
fn split_value<T: Scalar>(feat: &[T], index: usize) -> T {
    let value = feat[index];
    if index > 0 {
        T::from_f64((feat[index - 1].as_f64() + value.as_f64()) * 0.5)
    } else {
        value
    }
}
