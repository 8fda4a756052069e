//! Dataset container.
//!
//! This module provides [`Dataset`], the immutable column store shared by
//! every tree builder.

use ndarray::{ArrayView1, ArrayView2};

use crate::utils::{take, take_into};

use super::Scalar;

/// Error raised while assembling a [`Dataset`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatasetError {
    /// A feature column's length disagrees with the target column's.
    #[error("column length {got} does not match target length {expected}")]
    ShapeMismatch { expected: usize, got: usize },
}

/// Immutable column store for training and evaluation.
///
/// # Storage Layout
///
/// One target column plus `M` feature columns, all of length `N`. Columns
/// are stored contiguously (column-major), so per-feature scans during
/// split search stay cache friendly.
///
/// # Lifecycle
///
/// Constructed once, then borrowed read-only by every tree builder. There
/// is no mutation API beyond [`Dataset::add_column`], which is only used
/// while assembling the store.
///
/// # Example
///
/// ```
/// use canopy::data::Dataset;
///
/// let mut ds = Dataset::new(vec![1.0f32, 2.0, 3.0]);
/// ds.add_column(vec![0.5, 0.25, 0.125]).unwrap();
///
/// assert_eq!(ds.num_rows(), 3);
/// assert_eq!(ds.num_cols(), 1);
/// assert_eq!(ds.column(0), &[0.5, 0.25, 0.125]);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset<T: Scalar> {
    target: Vec<T>,
    columns: Vec<Vec<T>>,
}

impl<T: Scalar> Dataset<T> {
    /// Create a dataset holding only the target column.
    pub fn new(target: Vec<T>) -> Self {
        Self {
            target,
            columns: Vec::new(),
        }
    }

    /// Append a feature column.
    ///
    /// Returns the index of the new column.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ShapeMismatch`] if the column's length differs
    /// from the target's length.
    pub fn add_column(&mut self, column: Vec<T>) -> Result<usize, DatasetError> {
        if column.len() != self.target.len() {
            return Err(DatasetError::ShapeMismatch {
                expected: self.target.len(),
                got: column.len(),
            });
        }
        self.columns.push(column);
        Ok(self.columns.len() - 1)
    }

    /// Build a dataset from borrowed 1-D arrays (host-binding surface).
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ShapeMismatch`] if any column's length differs
    /// from the target's length.
    pub fn from_columns(
        target: ArrayView1<'_, T>,
        columns: &[ArrayView1<'_, T>],
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(target.to_vec());
        for column in columns {
            dataset.add_column(column.to_vec())?;
        }
        Ok(dataset)
    }

    /// Build a dataset from a feature-major matrix `[num_cols, num_rows]`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ShapeMismatch`] if the matrix row length
    /// differs from the target's length.
    pub fn from_matrix(
        features: ArrayView2<'_, T>,
        target: ArrayView1<'_, T>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(target.to_vec());
        for row in features.rows() {
            dataset.add_column(row.to_vec())?;
        }
        Ok(dataset)
    }

    /// Number of rows (length of every column).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.target.len()
    }

    /// Number of feature columns.
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// The target column.
    #[inline]
    pub fn target(&self) -> &[T] {
        &self.target
    }

    /// Borrow feature column `i`.
    #[inline]
    pub fn column(&self, i: usize) -> &[T] {
        &self.columns[i]
    }

    /// Gather row `i` from every feature column into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range or `out` is shorter than the number of
    /// columns.
    pub fn row_into(&self, i: usize, out: &mut [T]) {
        assert!(
            i < self.num_rows(),
            "row {} out of range (num_rows {})",
            i,
            self.num_rows()
        );
        assert!(
            out.len() >= self.num_cols(),
            "row buffer too small: {} vs. {}",
            out.len(),
            self.num_cols()
        );
        for (slot, column) in out.iter_mut().zip(self.columns.iter()) {
            *slot = column[i];
        }
    }

    /// Gather row `i` from every feature column into a fresh vector.
    pub fn row(&self, i: usize) -> Vec<T> {
        let mut values = vec![T::zero(); self.num_cols()];
        self.row_into(i, &mut values);
        values
    }

    /// Gather the values of column `i` at the given row indices.
    pub fn column_sample(&self, i: usize, indices: &[usize]) -> Vec<T> {
        take(&self.columns[i], indices)
    }

    /// Gather the values of column `i` at the given row indices into `out`.
    pub fn column_sample_into(&self, i: usize, indices: &[usize], out: &mut [T]) {
        take_into(&self.columns[i], indices, out);
    }
}
