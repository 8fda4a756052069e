//! Synthetic data generators and model introspection helpers for tests.

use rand::{Rng, SeedableRng};

use crate::data::Dataset;
use crate::repr::{Node, Tree};
use crate::utils::TrainRng;

/// Uniform random values in `[min, max)`.
pub fn random_values(count: usize, rng: &mut TrainRng, min: f32, max: f32) -> Vec<f32> {
    (0..count)
        .map(|_| min + rng.gen::<f32>() * (max - min))
        .collect()
}

/// Random dataset: `num_cols` feature columns and a target, all uniform in
/// `[0, 1)`.
pub fn random_dataset(num_rows: usize, num_cols: usize, seed: u64) -> Dataset<f32> {
    let mut rng = TrainRng::seed_from_u64(seed);
    let mut dataset = Dataset::new(random_values(num_rows, &mut rng, 0.0, 1.0));
    for _ in 0..num_cols {
        dataset
            .add_column(random_values(num_rows, &mut rng, 0.0, 1.0))
            .expect("columns generated with the target length");
    }
    dataset
}

/// Point clusters on a circle.
///
/// `num_clusters` cluster centers are spread evenly around a circle of the
/// given radius; each cluster gets `per_cluster` points jittered by
/// `angular_noise` radians. Features are the x/y coordinates, the target is
/// `cluster_index * (2 * PI / num_clusters)`.
pub fn circle_clusters(
    num_clusters: usize,
    per_cluster: usize,
    radius: f32,
    angular_noise: f32,
    seed: u64,
) -> Dataset<f32> {
    let mut rng = TrainRng::seed_from_u64(seed);
    let step = 2.0 * std::f32::consts::PI / num_clusters as f32;

    let mut xs = Vec::with_capacity(num_clusters * per_cluster);
    let mut ys = Vec::with_capacity(num_clusters * per_cluster);
    let mut target = Vec::with_capacity(num_clusters * per_cluster);

    for cluster in 0..num_clusters {
        let center = cluster as f32 * step;
        for _ in 0..per_cluster {
            let angle = center + (rng.gen::<f32>() * 2.0 - 1.0) * angular_noise;
            xs.push(radius * angle.cos());
            ys.push(radius * angle.sin());
            target.push(cluster as f32 * step);
        }
    }

    let mut dataset = Dataset::new(target);
    dataset.add_column(xs).expect("column length matches target");
    dataset.add_column(ys).expect("column length matches target");
    dataset
}

/// Total number of target values stored across a tree's leaves.
///
/// Every training row of the tree's root window lands in exactly one leaf,
/// so this recovers the bootstrap sample size.
pub fn leaf_value_count<T: crate::data::Scalar>(tree: &Tree<T>) -> usize {
    tree.nodes()
        .map(|node| match node {
            Node::Leaf { values } => values.len(),
            Node::Split { .. } => 0,
        })
        .sum()
}
