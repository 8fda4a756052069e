//! Training configuration.
//!
//! [`BuildConfig`] collects the knobs that control tree growth, and
//! [`SampleSize`] expresses the row/column budgets that may be absolute
//! counts, dataset proportions, or the square-root heuristic.

use std::str::FromStr;

// =============================================================================
// SampleSize
// =============================================================================

/// Budget for a row or column subsample.
///
/// Resolved against the dataset dimension it applies to at training time:
///
/// - `All` uses the full dimension (no subsampling).
/// - `Count(c)` caps at `c`, clamped to the dimension.
/// - `Fraction(f)` with `f` in `(0, 1]` uses `ceil(f * size)`.
/// - `Sqrt` uses `ceil(sqrt(size))`.
///
/// The string forms accepted by [`FromStr`] are `"all"`, `"sqrt"`, `"auto"`
/// (alias for `"sqrt"`), integer literals, and fractional literals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SampleSize {
    /// Use the full dimension.
    #[default]
    All,
    /// Absolute cap.
    Count(usize),
    /// Proportion of the dimension, in `(0, 1]`.
    Fraction(f64),
    /// `ceil(sqrt(size))`.
    Sqrt,
}

impl SampleSize {
    /// Resolve the budget against a concrete dimension.
    ///
    /// Returns `None` when the full dimension should be used, otherwise the
    /// effective count clamped to `size`.
    pub fn resolve(&self, size: usize) -> Option<usize> {
        match *self {
            SampleSize::All => None,
            SampleSize::Count(count) => Some(count.min(size)),
            SampleSize::Fraction(fraction) => {
                Some(((size as f64 * fraction).ceil() as usize).min(size))
            }
            SampleSize::Sqrt => Some(((size as f64).sqrt().ceil() as usize).min(size)),
        }
    }

    /// Validate the budget value itself (independent of any dimension).
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            SampleSize::Count(0) => Err(ConfigError::InvalidCount(0)),
            SampleSize::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
                Err(ConfigError::InvalidFraction(f))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for SampleSize {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "all" => Ok(SampleSize::All),
            "sqrt" | "auto" => Ok(SampleSize::Sqrt),
            text => {
                if let Ok(count) = text.parse::<usize>() {
                    return Ok(SampleSize::Count(count));
                }
                if let Ok(fraction) = text.parse::<f64>() {
                    if fraction > 0.0 && fraction <= 1.0 {
                        return Ok(SampleSize::Fraction(fraction));
                    }
                }
                Err(ConfigError::InvalidSampleSize {
                    value: value.to_string(),
                })
            }
        }
    }
}

// =============================================================================
// BuildConfig
// =============================================================================

/// Configuration for growing trees and forests.
///
/// Use struct construction with `..Default::default()` for convenient
/// configuration:
///
/// ```
/// use canopy::config::{BuildConfig, SampleSize};
///
/// let config = BuildConfig {
///     num_rows: SampleSize::Fraction(0.75),
///     num_columns: SampleSize::Sqrt,
///     min_leaf_size: 2,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Bootstrap sample size per tree.
    pub num_rows: SampleSize,
    /// Feature subsample size per split.
    pub num_columns: SampleSize,
    /// A node with at most this many rows becomes a leaf.
    pub min_leaf_size: usize,
    /// Depth cap; the root has depth 0. `None` means unbounded.
    pub max_depth: Option<usize>,
    /// Candidate pivots sampled per feature at a node. `None` evaluates
    /// every admissible split position.
    pub num_split_points: Option<usize>,
    /// Minimum variance-reduction score required to accept a split.
    pub min_split_error: f64,
    /// Tolerance below which two feature or target values are considered
    /// equal.
    pub same_eps: f64,
    /// Whether bootstrap row samples are drawn with replacement.
    pub with_replacement: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            num_rows: SampleSize::All,
            num_columns: SampleSize::All,
            min_leaf_size: 4,
            max_depth: None,
            num_split_points: Some(10),
            min_split_error: 0.0,
            same_eps: 1e-6,
            with_replacement: false,
        }
    }
}

impl BuildConfig {
    /// Build a configuration from string-keyed options (host-binding
    /// surface).
    ///
    /// Recognized keys: `max_rows`, `max_columns` (sample-size syntax),
    /// `min_leaf_size`, `max_depth`, `num_split_points` (`"all"` lifts the
    /// cap), `min_split_error`, `same_eps`, `with_replacement`. Missing keys
    /// keep their defaults; an unrecognized key or a value of the wrong
    /// shape is a [`ConfigError`].
    ///
    /// ```
    /// use canopy::config::BuildConfig;
    ///
    /// let config = BuildConfig::from_options([
    ///     ("max_rows", "0.75"),
    ///     ("max_columns", "sqrt"),
    ///     ("max_depth", "all"),
    ///     ("min_leaf_size", "2"),
    /// ])
    /// .unwrap();
    /// assert_eq!(config.min_leaf_size, 2);
    /// ```
    pub fn from_options<'a, I>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (name, value) in options {
            match name {
                "max_rows" => config.num_rows = value.parse()?,
                "max_columns" => config.num_columns = value.parse()?,
                "min_leaf_size" => config.min_leaf_size = parse_option(name, value)?,
                "max_depth" => config.max_depth = parse_optional(name, value)?,
                "num_split_points" => config.num_split_points = parse_optional(name, value)?,
                "min_split_error" => config.min_split_error = parse_option(name, value)?,
                "same_eps" => config.same_eps = parse_option(name, value)?,
                "with_replacement" => config.with_replacement = parse_option(name, value)?,
                _ => {
                    return Err(ConfigError::UnknownOption {
                        name: name.to_string(),
                    })
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that cannot be trained with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.num_rows.validate()?;
        self.num_columns.validate()?;
        if self.min_leaf_size == 0 {
            return Err(ConfigError::InvalidMinLeafSize(self.min_leaf_size));
        }
        if self.num_split_points == Some(0) {
            return Err(ConfigError::InvalidNumSplitPoints(0));
        }
        if self.min_split_error < 0.0 {
            return Err(ConfigError::InvalidMinSplitError(self.min_split_error));
        }
        if !(self.same_eps >= 0.0) {
            return Err(ConfigError::InvalidSameEps(self.same_eps));
        }
        Ok(())
    }
}

fn parse_option<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOptionValue {
            name: name.to_string(),
            value: value.to_string(),
        })
}

fn parse_optional<T: FromStr>(name: &str, value: &str) -> Result<Option<T>, ConfigError> {
    if value.trim() == "all" {
        Ok(None)
    } else {
        parse_option(name, value).map(Some)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Configuration validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An option key that no knob answers to.
    #[error("unrecognized option {name:?}")]
    UnknownOption { name: String },

    /// An option value of the wrong shape for its knob.
    #[error("invalid value {value:?} for option {name:?}")]
    InvalidOptionValue { name: String, value: String },

    /// A sample-size string was not a count, a fraction, or a known mode.
    #[error("invalid sample size {value:?}: expected a count, a fraction in (0, 1], \"sqrt\", \"auto\" or \"all\"")]
    InvalidSampleSize { value: String },

    /// Sample count must be positive.
    #[error("sample count must be positive, got {0}")]
    InvalidCount(usize),

    /// Sample fraction must be in (0, 1].
    #[error("sample fraction must be in (0, 1], got {0}")]
    InvalidFraction(f64),

    /// min_leaf_size must be >= 1.
    #[error("min_leaf_size must be >= 1, got {0}")]
    InvalidMinLeafSize(usize),

    /// num_split_points must be >= 1 when set.
    #[error("num_split_points must be >= 1 when set, got {0}")]
    InvalidNumSplitPoints(usize),

    /// min_split_error must be >= 0.
    #[error("min_split_error must be >= 0, got {0}")]
    InvalidMinSplitError(f64),

    /// same_eps must be a non-negative number.
    #[error("same_eps must be a non-negative number, got {0}")]
    InvalidSameEps(f64),
}
