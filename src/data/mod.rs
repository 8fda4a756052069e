//! Dataset storage and the row-index views used during training.
//!
//! # Overview
//!
//! [`Dataset`] holds the target column and the feature columns as immutable,
//! equally sized arrays in column-major layout. [`BuildView`] wraps a dataset
//! with a mutable row-index permutation; tree construction repeatedly sorts
//! and partitions windows of that permutation without ever touching the
//! column data itself.
//!
//! All columns share a single scalar type implementing [`Scalar`]
//! (`f32` or `f64`).

use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use num_traits::Float;

mod dataset;
mod view;

pub use dataset::{Dataset, DatasetError};
pub use view::BuildView;

// =============================================================================
// Scalar
// =============================================================================

/// Element type for dataset columns and targets.
///
/// Implemented for `f32` and `f64`. The trait pins down everything training
/// and persistence need: float arithmetic, ordering, text formatting at a
/// requested precision, and parsing.
pub trait Scalar:
    Float
    + FromStr<Err = ParseFloatError>
    + fmt::Display
    + fmt::LowerExp
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
    /// Widen to `f64` for accumulation.
    fn as_f64(self) -> f64;

    /// Narrow from an `f64` accumulator.
    fn from_f64(value: f64) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Scalar for f64 {
    #[inline]
    fn as_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}
