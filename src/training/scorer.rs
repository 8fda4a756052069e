//! Variance-reduction split scoring.
//!
//! Given a window already sorted by the feature under evaluation, the scorer
//! proposes the split position that maximizes the reduction from the
//! window's variance to the size-weighted variance of the two blocks it
//! produces.
//!
//! Prefix sums of the target and its square make every candidate an O(1)
//! evaluation:
//!
//! ```text
//! Error = Sum((Vi - M)^2)
//!       = Sum(Vi^2) + n * M^2 - 2 * M * Sum(Vi)
//!       = Sum(Vi^2) - M * Sum(Vi)
//! Var   = Sum(Vi^2) / n - M^2
//! ```

use crate::config::BuildConfig;
use crate::data::Scalar;
use crate::utils::{resample_prefix, TrainRng};

/// A proposed split: the position within the sorted window where the left
/// block ends, and the variance-reduction score it achieves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitProposal {
    pub index: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct PrefixEntry {
    sum: f64,
    sum2: f64,
}

/// Population variance of the block `[from, to)` read off the prefix array.
fn block_variance(prefix: &[PrefixEntry], from: usize, to: usize) -> f64 {
    let len = (to - from) as f64;
    let sum = prefix[to].sum - prefix[from].sum;
    let sum2 = prefix[to].sum2 - prefix[from].sum2;
    let mean = sum / len;
    sum2 / len - mean * mean
}

/// Size-weighted variance of the two blocks produced by splitting at `index`.
fn split_variance(prefix: &[PrefixEntry], index: usize, len: usize) -> f64 {
    let left = block_variance(prefix, 0, index);
    let right = block_variance(prefix, index, len);
    let left_weight = index as f64 / len as f64;
    left * left_weight + right * (1.0 - left_weight)
}

/// Reusable split-scoring engine.
///
/// Owns two scratch buffers sized to the root window of one tree: the prefix
/// array and the candidate-position buffer. One scorer instance serves every
/// node of that tree; instances are never shared across trees.
pub struct SplitScorer {
    min_leaf_size: usize,
    num_split_points: Option<usize>,
    min_split_error: f64,
    same_eps: f64,
    prefix: Vec<PrefixEntry>,
    candidates: Vec<usize>,
}

impl SplitScorer {
    /// Create a scorer for windows of at most `num_rows` rows.
    pub fn new(config: &BuildConfig, num_rows: usize) -> Self {
        Self {
            min_leaf_size: config.min_leaf_size,
            num_split_points: config.num_split_points,
            min_split_error: config.min_split_error,
            same_eps: config.same_eps,
            prefix: vec![PrefixEntry::default(); num_rows + 1],
            candidates: vec![0; num_rows],
        }
    }

    /// Score a sorted `(feature, target)` window.
    ///
    /// `feat` must be sorted ascending and `tgt` permuted alongside it.
    /// Returns the best admissible split position and its score, or `None`
    /// when the window is too small, degenerate, or no candidate clears
    /// `min_split_error`.
    pub fn score<T: Scalar>(
        &mut self,
        feat: &[T],
        tgt: &[T],
        rng: &mut TrainRng,
    ) -> Option<SplitProposal> {
        debug_assert_eq!(feat.len(), tgt.len());
        let len = tgt.len();
        assert!(
            self.prefix.len() > len,
            "scorer scratch too small: {} vs. window {}",
            self.prefix.len(),
            len
        );

        if self.min_leaf_size >= len {
            return None;
        }

        // Skip the leading plateau: while both the feature and the target
        // still sit at the window-start values, no meaningful split exists.
        let right = len;
        let mut left = 0;
        let first_feat = feat[0].as_f64();
        let first_tgt = tgt[0].as_f64();
        while left < right
            && feat[left].as_f64() - first_feat < self.same_eps
            && (tgt[left].as_f64() - first_tgt).abs() < self.same_eps
        {
            left += 1;
        }
        if left >= right {
            return None;
        }

        let mut sum = 0.0;
        let mut sum2 = 0.0;
        for (entry, &value) in self.prefix.iter_mut().zip(tgt.iter()) {
            entry.sum = sum;
            entry.sum2 = sum2;
            let value = value.as_f64();
            sum += value;
            sum2 += value * value;
        }
        self.prefix[len] = PrefixEntry { sum, sum2 };

        let prefix = &self.prefix[..len + 1];
        let total = block_variance(prefix, 0, len);

        let mut best: Option<(usize, f64)> = None;
        let mut consider = |index: usize| {
            let score = total - split_variance(prefix, index, len);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        };

        let exhaustive = match self.num_split_points {
            None => true,
            Some(count) => count >= right - left,
        };
        if exhaustive {
            for index in left..right {
                consider(index);
            }
        } else {
            let candidates = &mut self.candidates[..right - left];
            for (slot, index) in candidates.iter_mut().zip(left..right) {
                *slot = index;
            }
            for &index in resample_prefix(candidates, self.num_split_points, rng) {
                consider(index);
            }
        }

        match best {
            Some((index, score)) if score > self.min_split_error => {
                Some(SplitProposal { index, score })
            }
            _ => None,
        }
    }
}
