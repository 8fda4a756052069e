//! Forest of regression trees.

use crate::data::Scalar;

use super::Tree;

/// An ordered collection of trained trees.
///
/// Evaluation returns one leaf payload borrow per tree; callers aggregate
/// those payloads however they like. [`Forest::eval_mean`] implements the
/// conventional point prediction (the mean over every payload value).
#[derive(Debug, Clone, PartialEq)]
pub struct Forest<T> {
    trees: Vec<Tree<T>>,
}

impl<T: Scalar> Forest<T> {
    /// Wrap an ordered list of trees.
    pub fn new(trees: Vec<Tree<T>>) -> Self {
        Self { trees }
    }

    /// Number of trees.
    #[inline]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the forest holds no trees.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Borrow tree `i`.
    #[inline]
    pub fn tree(&self, i: usize) -> &Tree<T> {
        &self.trees[i]
    }

    /// Iterate over trees in training order.
    pub fn trees(&self) -> impl Iterator<Item = &Tree<T>> {
        self.trees.iter()
    }

    /// Evaluate a row against every tree, returning the leaf payloads in
    /// tree order.
    pub fn eval(&self, row: &[T]) -> Vec<&[T]> {
        self.trees.iter().map(|tree| tree.eval(row)).collect()
    }

    /// Point prediction: the mean over every leaf payload value returned by
    /// [`Forest::eval`]. Returns NaN for an empty forest.
    pub fn eval_mean(&self, row: &[T]) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for payload in self.eval(row) {
            for &value in payload {
                sum += value.as_f64();
                count += 1;
            }
        }
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::Node;

    fn stump(pivot: f32, left_values: Vec<f32>, right_values: Vec<f32>) -> Tree<f32> {
        Tree::from_nodes(
            vec![
                Node::Split {
                    feature: 0,
                    pivot,
                    left: 1,
                    right: 2,
                },
                Node::Leaf {
                    values: left_values,
                },
                Node::Leaf {
                    values: right_values,
                },
            ],
            0,
        )
    }

    #[test]
    fn eval_returns_payload_per_tree() {
        let forest = Forest::new(vec![
            stump(0.5, vec![1.0], vec![2.0]),
            stump(0.7, vec![3.0, 4.0], vec![5.0]),
        ]);

        let payloads = forest.eval(&[0.6]);
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0], &[2.0]);
        assert_eq!(payloads[1], &[3.0, 4.0]);
    }

    #[test]
    fn eval_mean_averages_all_values() {
        let forest = Forest::new(vec![
            stump(0.5, vec![1.0], vec![2.0]),
            stump(0.5, vec![3.0, 5.0], vec![9.0]),
        ]);

        // Row goes left in both trees: payloads [1.0] and [3.0, 5.0].
        let mean = forest.eval_mean(&[0.0]);
        assert!((mean - 3.0).abs() < 1e-12);
    }

    #[test]
    fn eval_mean_empty_forest_is_nan() {
        let forest: Forest<f32> = Forest::new(Vec::new());
        assert!(forest.eval_mean(&[0.0]).is_nan());
    }
}
