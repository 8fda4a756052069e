//! canopy: regression random forests for Rust.
//!
//! Trains ensembles of variance-reducing regression trees over dense,
//! column-major numeric data, and evaluates rows against the trained forest.
//!
//! # Key Types
//!
//! - [`Dataset`] - Immutable column store (target + feature columns)
//! - [`BuildConfig`] / [`SampleSize`] - Training configuration
//! - [`Forest`] / [`Tree`] - Trained model, row evaluation
//! - [`train`] - Training entry point
//!
//! # Training
//!
//! ```ignore
//! use canopy::{train, BuildConfig, Dataset};
//!
//! let mut dataset = Dataset::new(target);
//! for column in columns {
//!     dataset.add_column(column)?;
//! }
//! let forest = train(&BuildConfig::default(), &dataset, 100, 42, 0)?;
//! let payloads = forest.eval(&row);
//! ```
//!
//! # Persistence
//!
//! Forests serialize to a line-oriented text format; see the [`io`] module.

pub mod config;
pub mod data;
pub mod io;
pub mod parallel;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// High-level surface
pub use config::{BuildConfig, ConfigError, SampleSize};
pub use data::{BuildView, Dataset, DatasetError, Scalar};
pub use repr::{Forest, Node, NodeId, Tree};
pub use training::{build_forest, build_tree, train, SplitProposal, SplitScorer, TrainError};

// Persistence
pub use io::{load_forest, load_forest_path, store_forest, store_forest_path, ParseError};

// Shared utilities
pub use parallel::{effective_num_threads, try_map, WorkerError};
pub use utils::{fork_rng, resample, TrainRng};
