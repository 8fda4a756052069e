//! Forest training orchestration.
//!
//! Each tree trains on its own bootstrap row sample over the shared dataset.
//! With one thread the parent RNG drives everything in sequence; with more,
//! every tree's row sample and RNG are pre-generated on the calling thread
//! (fixing the parent RNG consumption order) before tree construction is
//! farmed out to the worker pool.

use std::time::Instant;

use rand::SeedableRng;

use crate::config::{BuildConfig, ConfigError};
use crate::data::{BuildView, Dataset, Scalar};
use crate::parallel::{effective_num_threads, try_map, WorkerError};
use crate::repr::{Forest, Tree};
use crate::utils::{fork_rng, resample, TrainRng};

use super::builder::TreeBuilder;

/// Error raised by [`train`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrainError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A worker task failed; surfaced after every sibling finished.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Grow a single tree over a bootstrap row sample.
pub fn build_tree<T: Scalar>(
    config: &BuildConfig,
    dataset: &Dataset<T>,
    indices: Vec<usize>,
    rng: &mut TrainRng,
) -> Tree<T> {
    let view = BuildView::with_indices(dataset, indices);
    TreeBuilder::new(config, view).build(rng)
}

/// Train `num_trees` trees over bootstrap samples of `dataset`.
///
/// `num_threads = 1` runs sequentially on the caller, consuming the parent
/// RNG directly. Any other value pre-generates per-tree `(row sample, RNG)`
/// pairs from the parent on the calling thread and maps tree construction
/// over a worker pool of `effective_num_threads(num_threads, num_trees)`
/// workers, so results are deterministic for a fixed thread count.
pub fn build_forest<T: Scalar>(
    config: &BuildConfig,
    dataset: &Dataset<T>,
    num_trees: usize,
    rng: &mut TrainRng,
    num_threads: usize,
) -> Result<Forest<T>, TrainError> {
    let num_rows = dataset.num_rows();
    let row_budget = config.num_rows.resolve(num_rows);

    let trees = if num_threads == 1 {
        let mut trees = Vec::with_capacity(num_trees);
        for _ in 0..num_trees {
            let indices = resample(num_rows, row_budget, rng, config.with_replacement);
            trees.push(build_tree(config, dataset, indices, rng));
        }
        trees
    } else {
        let contexts: Vec<(Vec<usize>, TrainRng)> = (0..num_trees)
            .map(|_| {
                let indices = resample(num_rows, row_budget, rng, config.with_replacement);
                (indices, fork_rng(rng))
            })
            .collect();

        let workers = effective_num_threads(num_threads, num_trees);
        log::debug!("dispatching {} trees to {} workers", num_trees, workers);
        try_map(contexts, workers, |(indices, mut tree_rng)| {
            build_tree(config, dataset, indices, &mut tree_rng)
        })?
    };

    Ok(Forest::new(trees))
}

/// Training entry point.
///
/// Validates the configuration, seeds the parent RNG and delegates to
/// [`build_forest`]. For fixed `(seed, num_threads)` and inputs the result
/// is fully deterministic.
pub fn train<T: Scalar>(
    config: &BuildConfig,
    dataset: &Dataset<T>,
    num_trees: usize,
    seed: u64,
    num_threads: usize,
) -> Result<Forest<T>, TrainError> {
    config.validate()?;

    let started = Instant::now();
    log::debug!(
        "training {} trees over {} rows x {} columns (seed {}, {} threads requested)",
        num_trees,
        dataset.num_rows(),
        dataset.num_cols(),
        seed,
        num_threads
    );

    let mut rng = TrainRng::seed_from_u64(seed);
    let forest = build_forest(config, dataset, num_trees, &mut rng, num_threads)?;

    log::info!(
        "trained {} trees over {} rows in {:.2?}",
        forest.len(),
        dataset.num_rows(),
        started.elapsed()
    );
    Ok(forest)
}
