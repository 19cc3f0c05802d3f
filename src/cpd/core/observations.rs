//! Observation batches for fitting a softmax CPD.
//!
//! Each observation carries one value per continuous parent and the state
//! index of the discrete child. Batches are validated once on construction
//! and are read-only afterwards; optimizers only ever borrow them.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::cpd::{
    core::shape::SoftmaxShape,
    errors::{CPDError, CPDResult},
};

/// Validated observation batch.
///
/// - `values`: `[n_obs, P]` parent values, all finite.
/// - `labels`: `[n_obs]` child states.
///
/// Invariants: `n_obs >= 1` and `values.nrows() == labels.len()`. Label
/// ranges depend on the CPD and are checked by [`SoftmaxObservations::check_against`].
#[derive(Debug, Clone, PartialEq)]
pub struct SoftmaxObservations {
    values: Array2<f64>,
    labels: Array1<usize>,
}

impl SoftmaxObservations {
    /// Build an observation batch from observation-major parent values and
    /// child labels.
    ///
    /// # Errors
    /// - [`CPDError::EmptyObservations`] if there are no rows.
    /// - [`CPDError::ObservationLengthMismatch`] if row and label counts differ.
    /// - [`CPDError::NonFiniteObservation`] for the first NaN/±inf value.
    pub fn new(values: Array2<f64>, labels: Array1<usize>) -> CPDResult<Self> {
        if labels.is_empty() {
            return Err(CPDError::EmptyObservations);
        }
        if values.nrows() != labels.len() {
            return Err(CPDError::ObservationLengthMismatch {
                values: values.nrows(),
                labels: labels.len(),
            });
        }
        if let Some(((row, col), &value)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(CPDError::NonFiniteObservation { row, col, value });
        }
        Ok(SoftmaxObservations { values, labels })
    }

    /// Build a batch from the node-major layout used by evidence tables:
    /// one row per node, one column per observation, with the child's state
    /// stored as a float in the last row.
    ///
    /// # Errors
    /// - [`CPDError::EmptyObservations`] if the table has no rows or columns.
    /// - [`CPDError::InvalidLabel`] if a child entry is not a finite,
    ///   non-negative integer.
    /// - Any error from [`SoftmaxObservations::new`].
    pub fn from_node_major(table: ArrayView2<'_, f64>) -> CPDResult<Self> {
        if table.nrows() == 0 || table.ncols() == 0 {
            return Err(CPDError::EmptyObservations);
        }
        let child_row = table.nrows() - 1;
        let labels = table
            .row(child_row)
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                    Ok(value as usize)
                } else {
                    Err(CPDError::InvalidLabel { index, value })
                }
            })
            .collect::<CPDResult<Array1<usize>>>()?;
        let values = table.slice(ndarray::s![..child_row, ..]).t().to_owned();
        Self::new(values, labels)
    }

    /// Check the batch against a CPD's dimensions.
    ///
    /// # Errors
    /// - [`CPDError::ParentCountMismatch`] if the column count differs from
    ///   `shape.parent_count`.
    /// - [`CPDError::LabelOutOfRange`] for the first label `>= child_states`.
    pub fn check_against(&self, shape: &SoftmaxShape) -> CPDResult<()> {
        if self.values.ncols() != shape.parent_count {
            return Err(CPDError::ParentCountMismatch {
                expected: shape.parent_count,
                found: self.values.ncols(),
            });
        }
        if let Some((index, &label)) =
            self.labels.iter().enumerate().find(|(_, l)| **l >= shape.child_states)
        {
            return Err(CPDError::LabelOutOfRange { index, label, states: shape.child_states });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn parent_count(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn labels(&self) -> ArrayView1<'_, usize> {
        self.labels.view()
    }

    /// Iterate `(parent values, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f64>, usize)> + '_ {
        self.values.outer_iter().zip(self.labels.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpd::core::node_type::NodeType;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction checks (empty, mismatched, non-finite).
    // - Conversion from the node-major evidence layout.
    // - Validation against a CPD shape.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Reject malformed batches at construction.
    //
    // Given
    // -----
    // - An empty batch, a batch with one label too many, and a NaN value.
    //
    // Expect
    // ------
    // - `EmptyObservations`, `ObservationLengthMismatch`,
    //   `NonFiniteObservation` with its position.
    fn new_rejects_empty_mismatched_and_non_finite_batches() {
        // Arrange
        let empty = SoftmaxObservations::new(Array2::zeros((0, 2)), Array1::zeros(0));
        let mismatched = SoftmaxObservations::new(Array2::zeros((2, 1)), array![0, 1, 0]);
        let nan = SoftmaxObservations::new(array![[0.0], [f64::NAN]], array![0, 1]);

        // Assert
        assert_eq!(empty.unwrap_err(), CPDError::EmptyObservations);
        assert_eq!(
            mismatched.unwrap_err(),
            CPDError::ObservationLengthMismatch { values: 2, labels: 3 }
        );
        match nan.unwrap_err() {
            CPDError::NonFiniteObservation { row: 1, col: 0, value } => assert!(value.is_nan()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Transpose node-major tables and decode float labels.
    //
    // Given
    // -----
    // - A 3x2 table: two parent rows and a child row `[2, 0]`.
    // - A table whose child row holds `1.5`.
    //
    // Expect
    // ------
    // - Values `[[1, 3], [2, 4]]`, labels `[2, 0]`.
    // - `InvalidLabel` for the fractional label.
    fn from_node_major_transposes_values_and_decodes_labels() {
        // Arrange
        let table = array![[1.0, 2.0], [3.0, 4.0], [2.0, 0.0]];
        let bad = array![[1.0], [1.5]];

        // Act
        let obs = SoftmaxObservations::from_node_major(table.view()).unwrap();

        // Assert
        assert_eq!(obs.values(), array![[1.0, 3.0], [2.0, 4.0]]);
        assert_eq!(obs.labels(), array![2, 0]);
        assert_eq!(
            SoftmaxObservations::from_node_major(bad.view()).unwrap_err(),
            CPDError::InvalidLabel { index: 0, value: 1.5 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Enforce parent count and label range for a concrete CPD shape.
    //
    // Given
    // -----
    // - A shape with one parent and two states.
    //
    // Expect
    // ------
    // - A two-column batch fails with `ParentCountMismatch`.
    // - A label of 2 fails with `LabelOutOfRange`.
    fn check_against_rejects_wrong_parent_count_and_out_of_range_labels() {
        // Arrange
        let shape =
            SoftmaxShape::from_node_types(&[NodeType::continuous(), NodeType::discrete(2)])
                .unwrap();
        let wide = SoftmaxObservations::new(Array2::zeros((1, 2)), array![0]).unwrap();
        let out_of_range = SoftmaxObservations::new(array![[0.0], [1.0]], array![1, 2]).unwrap();

        // Act / Assert
        assert_eq!(
            wide.check_against(&shape).unwrap_err(),
            CPDError::ParentCountMismatch { expected: 1, found: 2 }
        );
        assert_eq!(
            out_of_range.check_against(&shape).unwrap_err(),
            CPDError::LabelOutOfRange { index: 1, label: 2, states: 2 }
        );
    }
}
