//! Tree and forest training.
//!
//! - [`SplitScorer`]: variance-reduction scoring over a sorted window
//! - [`TreeBuilder`]: depth-first tree construction over a build view
//! - [`train`] / [`build_forest`]: forest orchestration over bootstrap
//!   samples

mod builder;
mod scorer;
mod trainer;

pub use builder::TreeBuilder;
pub use scorer::{SplitProposal, SplitScorer};
pub use trainer::{build_forest, build_tree, train, TrainError};
