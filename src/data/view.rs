//! Row-index permutation over a dataset.
//!
//! Tree construction never moves column data. Instead it permutes row
//! indices: a [`BuildView`] owns one contiguous index buffer, and each tree
//! node works on a half-open window `[start, end)` of it. Splitting a node
//! partitions its window in place into two disjoint adjacent child windows.

use std::cmp::Ordering;

use crate::utils::take_into;

use super::{Dataset, Scalar};

/// A mutable row-index permutation over a borrowed [`Dataset`].
///
/// Windows are expressed as `[start, end)` ranges into the single index
/// buffer, so sibling node windows never alias. The dataset itself is only
/// ever read.
#[derive(Debug)]
pub struct BuildView<'a, T: Scalar> {
    dataset: &'a Dataset<T>,
    indices: Vec<usize>,
}

impl<'a, T: Scalar> BuildView<'a, T> {
    /// Create a view covering every dataset row in order.
    pub fn new(dataset: &'a Dataset<T>) -> Self {
        Self {
            dataset,
            indices: (0..dataset.num_rows()).collect(),
        }
    }

    /// Create a view over an explicit row-index permutation (bootstrap
    /// samples hand their drawn indices in here).
    pub fn with_indices(dataset: &'a Dataset<T>, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// The underlying dataset.
    #[inline]
    pub fn dataset(&self) -> &'a Dataset<T> {
        self.dataset
    }

    /// Number of rows covered by the full view.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.indices.len()
    }

    /// Borrow the indices of a window.
    #[inline]
    pub fn window(&self, start: usize, end: usize) -> &[usize] {
        &self.indices[start..end]
    }

    /// Gather the target values of a window, in current permutation order.
    pub fn gather_target(&self, start: usize, end: usize, out: &mut [T]) {
        take_into(self.dataset.target(), self.window(start, end), out);
    }

    /// Gather the values of feature column `c` over a window, in current
    /// permutation order.
    pub fn gather_column(&self, c: usize, start: usize, end: usize, out: &mut [T]) {
        take_into(self.dataset.column(c), self.window(start, end), out);
    }

    /// Sort the indices of a window by ascending value of feature column `c`.
    ///
    /// The sort is stable, so the result is deterministic for a given input
    /// order even in the presence of ties.
    pub fn sort_window_by(&mut self, c: usize, start: usize, end: usize) {
        let column = self.dataset.column(c);
        self.indices[start..end].sort_by(|&a, &b| {
            column[a]
                .partial_cmp(&column[b])
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Partition a window in place around `pivot` on feature column `c`.
    ///
    /// On return, indices in `[start, p)` reference rows with
    /// `column[c] < pivot` and indices in `[p, end)` rows with
    /// `column[c] >= pivot`. Relative order within the two blocks is not
    /// preserved. Returns the boundary `p`.
    pub fn partition(&mut self, c: usize, pivot: T, start: usize, end: usize) -> usize {
        let column = self.dataset.column(c);
        let window = &mut self.indices[start..end];

        let mut pos = 0;
        let mut top = window.len();
        while pos < top {
            let row = window[pos];
            if column[row] < pivot {
                pos += 1;
            } else {
                window.swap(pos, top - 1);
                top -= 1;
            }
        }

        start + pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset<f32> {
        let mut ds = Dataset::new(vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0]);
        // Alternating small/large values
        ds.add_column(vec![1.0, 5.0, 2.0, 6.0, 3.0, 7.0, 4.0, 8.0])
            .unwrap();
        // Already sorted
        ds.add_column(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
            .unwrap();
        ds
    }

    #[test]
    fn new_covers_all_rows_in_order() {
        let ds = sample_dataset();
        let view = BuildView::new(&ds);
        assert_eq!(view.num_rows(), 8);
        assert_eq!(view.window(0, 8), &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn gather_follows_permutation() {
        let ds = sample_dataset();
        let view = BuildView::with_indices(&ds, vec![3, 1, 0]);

        let mut tgt = [0.0f32; 3];
        view.gather_target(0, 3, &mut tgt);
        assert_eq!(tgt, [13.0, 11.0, 10.0]);

        let mut col = [0.0f32; 3];
        view.gather_column(0, 0, 3, &mut col);
        assert_eq!(col, [6.0, 5.0, 1.0]);
    }

    #[test]
    fn sort_window_by_column() {
        let ds = sample_dataset();
        let mut view = BuildView::new(&ds);

        view.sort_window_by(0, 0, 8);
        assert_eq!(view.window(0, 8), &[0, 2, 4, 6, 1, 3, 5, 7]);

        // Sorting a sub-window leaves the rest untouched.
        let mut view = BuildView::new(&ds);
        view.sort_window_by(0, 2, 6);
        assert_eq!(view.window(0, 2), &[0, 1]);
        assert_eq!(view.window(6, 8), &[6, 7]);
        assert_eq!(view.window(2, 6), &[2, 4, 3, 5]);
    }

    #[test]
    fn partition_respects_pivot() {
        let ds = sample_dataset();
        let mut view = BuildView::new(&ds);

        let p = view.partition(0, 5.0, 0, 8);
        let column = ds.column(0);
        for &row in view.window(0, p) {
            assert!(column[row] < 5.0);
        }
        for &row in view.window(p, 8) {
            assert!(column[row] >= 5.0);
        }
        assert_eq!(p, 4);
    }

    #[test]
    fn partition_preserves_window_multiset() {
        let ds = sample_dataset();
        let mut view = BuildView::new(&ds);

        let before: Vec<usize> = {
            let mut v = view.window(2, 7).to_vec();
            v.sort_unstable();
            v
        };
        view.partition(0, 4.5, 2, 7);
        let after: Vec<usize> = {
            let mut v = view.window(2, 7).to_vec();
            v.sort_unstable();
            v
        };
        assert_eq!(before, after);

        // Outside the window nothing moved.
        assert_eq!(view.window(0, 2), &[0, 1]);
        assert_eq!(view.window(7, 8), &[7]);
    }

    #[test]
    fn partition_boundary_cases() {
        let ds = sample_dataset();

        // Pivot below every value: everything lands right.
        let mut view = BuildView::new(&ds);
        let p = view.partition(0, 0.0, 0, 8);
        assert_eq!(p, 0);

        // Pivot above every value: everything lands left.
        let mut view = BuildView::new(&ds);
        let p = view.partition(0, 100.0, 0, 8);
        assert_eq!(p, 8);
    }
}
