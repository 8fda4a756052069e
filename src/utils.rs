//! Common utilities used across the crate.
//!
//! Index gathering, argsort, bitmap reduction, the resampling routines
//! behind bootstrap and candidate subsampling, and RNG forking.

use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

// =============================================================================
// RNG
// =============================================================================

/// The RNG used throughout training.
pub type TrainRng = Xoshiro256PlusPlus;

/// Derive a child RNG from a parent by drawing the parent's next 64-bit
/// output as the child seed.
///
/// Forest training forks one child per tree on the calling thread before
/// dispatch, which keeps the parent's consumption order deterministic.
pub fn fork_rng(rng: &mut TrainRng) -> TrainRng {
    TrainRng::seed_from_u64(rng.next_u64())
}

// =============================================================================
// Index utilities
// =============================================================================

/// Indices that sort `values` ascending.
///
/// The sort is stable, so ties keep their original relative order.
pub fn argsort<T: PartialOrd>(values: &[T]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

/// Gather `values[i]` for each `i` in `indices` into a fresh vector.
pub fn take<T: Copy>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i]).collect()
}

/// Gather `values[i]` for each `i` in `indices` into `out`.
///
/// # Panics
///
/// Panics if `out` is shorter than `indices`.
pub fn take_into<T: Copy>(values: &[T], indices: &[usize], out: &mut [T]) {
    assert!(
        out.len() >= indices.len(),
        "gather buffer too small: {} vs. {}",
        out.len(),
        indices.len()
    );
    for (slot, &i) in out.iter_mut().zip(indices.iter()) {
        *slot = values[i];
    }
}

/// Mark the given indices in a fresh bitmap of length `len`.
pub fn create_bitmap(len: usize, indices: &[usize]) -> Vec<bool> {
    let mut bitmap = vec![false; len];
    for &i in indices {
        bitmap[i] = true;
    }
    bitmap
}

/// Keep only the indices whose bitmap slot is set.
pub fn reduce_indices(indices: &[usize], bitmap: &[bool]) -> Vec<usize> {
    indices.iter().copied().filter(|&i| bitmap[i]).collect()
}

// =============================================================================
// Resampling
// =============================================================================

/// Draw a row sample from the population `[0, len)`.
///
/// - `count = None` returns the identity permutation (no sampling).
/// - With replacement: a partial Fisher-Yates pass over the identity
///   permutation; returns exactly `min(count, len)` indices in draw order.
/// - Without replacement: `count` positions are drawn uniformly and marked
///   in a bitmap; marked indices are returned in ascending order, so
///   colliding draws shrink the sample (size `<= count`).
pub fn resample(
    len: usize,
    count: Option<usize>,
    rng: &mut TrainRng,
    with_replacement: bool,
) -> Vec<usize> {
    let count = match count {
        None => return (0..len).collect(),
        Some(count) => count.min(len),
    };

    if with_replacement {
        let mut indices: Vec<usize> = (0..len).collect();
        for i in 0..count {
            let j = rng.gen_range(i..len);
            indices.swap(i, j);
        }
        indices.truncate(count);
        indices
    } else {
        let draws: Vec<usize> = (0..count).map(|_| rng.gen_range(0..len)).collect();
        let bitmap = create_bitmap(len, &draws);
        (0..len).filter(|&i| bitmap[i]).collect()
    }
}

/// Shuffle a distinct `count`-element sample into the prefix of `indices`
/// and return it.
///
/// `count = None`, or a count covering the whole slice, returns the slice
/// unchanged. The tree builder uses this for per-node feature subsets and
/// the scorer for candidate split positions; both reuse their index buffer
/// across calls, so the shuffle is done in place.
pub fn resample_prefix<'a>(
    indices: &'a mut [usize],
    count: Option<usize>,
    rng: &mut TrainRng,
) -> &'a [usize] {
    let len = indices.len();
    let count = match count {
        None => return indices,
        Some(count) if count >= len => return indices,
        Some(count) => count,
    };

    for i in 0..count {
        let j = rng.gen_range(i..len);
        indices.swap(i, j);
    }
    &indices[..count]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> TrainRng {
        TrainRng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn argsort_ascending() {
        let values = [3.0f32, 1.0, 2.0, 0.5];
        assert_eq!(argsort(&values), vec![3, 1, 2, 0]);
    }

    #[test]
    fn argsort_stable_on_ties() {
        let values = [1.0f32, 0.0, 1.0, 0.0];
        assert_eq!(argsort(&values), vec![1, 3, 0, 2]);
    }

    #[test]
    fn take_gathers() {
        let values = [10, 20, 30, 40];
        assert_eq!(take(&values, &[3, 0, 0]), vec![40, 10, 10]);

        let mut out = [0; 2];
        take_into(&values, &[1, 2], &mut out);
        assert_eq!(out, [20, 30]);
    }

    #[test]
    fn bitmap_round_trip() {
        let bitmap = create_bitmap(6, &[1, 4]);
        assert_eq!(bitmap, vec![false, true, false, false, true, false]);

        let kept = reduce_indices(&[0, 1, 2, 3, 4, 5], &bitmap);
        assert_eq!(kept, vec![1, 4]);
    }

    #[test]
    fn resample_all_is_identity() {
        let mut rng = rng();
        assert_eq!(resample(5, None, &mut rng, true), vec![0, 1, 2, 3, 4]);
        assert_eq!(resample(5, None, &mut rng, false), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn resample_with_replacement_exact_size() {
        let mut rng = rng();
        for k in [1usize, 7, 16, 40] {
            let sample = resample(40, Some(k), &mut rng, true);
            assert_eq!(sample.len(), k);
            for &i in &sample {
                assert!(i < 40);
            }
            // The Fisher-Yates prefix never repeats a position.
            let mut sorted = sample.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), k);
        }
    }

    #[test]
    fn resample_without_replacement_bounded_and_sorted() {
        let mut rng = rng();
        for _ in 0..16 {
            let sample = resample(50, Some(20), &mut rng, false);
            assert!(sample.len() <= 20);
            assert!(!sample.is_empty());
            assert!(sample.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn resample_count_clamped_to_len() {
        let mut rng = rng();
        let sample = resample(4, Some(100), &mut rng, true);
        assert_eq!(sample.len(), 4);
    }

    #[test]
    fn resample_deterministic_per_seed() {
        let a = resample(100, Some(30), &mut rng(), true);
        let b = resample(100, Some(30), &mut rng(), true);
        assert_eq!(a, b);

        let c = resample(100, Some(30), &mut TrainRng::seed_from_u64(7), true);
        assert_ne!(a, c);
    }

    #[test]
    fn resample_prefix_distinct() {
        let mut rng = rng();
        let mut buffer: Vec<usize> = (0..12).collect();
        let picked = resample_prefix(&mut buffer, Some(5), &mut rng).to_vec();
        assert_eq!(picked.len(), 5);
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }

    #[test]
    fn resample_prefix_full_slice_untouched() {
        let mut rng = rng();
        let mut buffer: Vec<usize> = (0..4).collect();
        assert_eq!(resample_prefix(&mut buffer, None, &mut rng), &[0, 1, 2, 3]);
        assert_eq!(
            resample_prefix(&mut buffer, Some(10), &mut rng),
            &[0, 1, 2, 3]
        );
    }

    #[test]
    fn fork_rng_decouples_streams() {
        let mut parent = rng();
        let mut child_a = fork_rng(&mut parent);
        let mut child_b = fork_rng(&mut parent);

        // Children start from different seeds drawn in parent order.
        assert_ne!(child_a.next_u64(), child_b.next_u64());

        // Refork from an identically seeded parent reproduces the children.
        let mut parent2 = rng();
        let mut child_a2 = fork_rng(&mut parent2);
        child_a2.next_u64();
        assert_eq!(child_a.next_u64(), child_a2.next_u64());
    }
}
