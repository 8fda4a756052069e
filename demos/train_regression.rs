//! Random-forest regression training example.
//!
//! Trains a small forest on synthetic data, reports the training error and
//! round-trips the model through its text serialization.
//!
//! Run with:
//! ```bash
//! cargo run --example train_regression
//! ```

use canopy::config::{BuildConfig, SampleSize};
use canopy::{load_forest, store_forest, train, Dataset};

fn main() {
    // =========================================================================
    // Generate synthetic regression data: y = x0 + 0.5*x1 + 0.25*x2 + noise
    // =========================================================================
    let num_rows = 500;

    let x0: Vec<f32> = (0..num_rows)
        .map(|i| (i as f32) / (num_rows as f32) * 10.0)
        .collect();
    let x1: Vec<f32> = (0..num_rows).map(|i| ((i * 7) % 100) as f32 / 10.0).collect();
    let x2: Vec<f32> = (0..num_rows).map(|i| ((i * 13) % 100) as f32 / 10.0).collect();

    let target: Vec<f32> = (0..num_rows)
        .map(|i| {
            let noise = ((i * 31) % 100) as f32 / 500.0 - 0.1;
            x0[i] + 0.5 * x1[i] + 0.25 * x2[i] + noise
        })
        .collect();

    let mut dataset = Dataset::new(target.clone());
    for column in [x0, x1, x2] {
        dataset.add_column(column).expect("columns match the target");
    }

    // =========================================================================
    // Train
    // =========================================================================
    let config = BuildConfig {
        num_rows: SampleSize::Fraction(0.75),
        num_columns: SampleSize::Sqrt,
        min_leaf_size: 4,
        ..Default::default()
    };
    let num_trees = 50;

    println!("Training a random forest...");
    println!("  Trees: {}", num_trees);
    println!("  Row budget: {:?}", config.num_rows);
    println!("  Column budget: {:?}\n", config.num_columns);

    let forest = train(&config, &dataset, num_trees, 42, 0).unwrap();

    // =========================================================================
    // Evaluate
    // =========================================================================
    let mut squared_error = 0.0f64;
    for i in 0..num_rows {
        let row = dataset.row(i);
        let prediction = forest.eval_mean(&row);
        let residual = prediction - target[i] as f64;
        squared_error += residual * residual;
    }
    let rmse = (squared_error / num_rows as f64).sqrt();

    println!("=== Results ===");
    println!("Trees: {}", forest.len());
    println!("Train RMSE: {:.4}", rmse);

    // =========================================================================
    // Round-trip through the text format
    // =========================================================================
    let mut buffer = Vec::new();
    store_forest(&forest, &mut buffer, 10).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let reloaded: canopy::Forest<f32> = load_forest(&text).unwrap();

    let probe = dataset.row(0);
    assert_eq!(forest.eval(&probe), reloaded.eval(&probe));
    println!("Serialized size: {} bytes (round-trip ok)", text.len());
}
