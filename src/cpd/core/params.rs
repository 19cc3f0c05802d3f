//! Softmax parameter pack: weight matrix, offsets, pivoting, and the flat
//! θ-vector mapping used by the optimizers.
//!
//! `SoftmaxParams` is the plain-array form of a CPD's parameters, used for
//! learning copies and for likelihood/gradient evaluation. Weights are
//! `[K, P]` (child state by parent) and offsets are `[K]`.
//!
//! The θ layout is defined by [`SoftmaxShape`]: state-major blocks of
//! `P + 1` entries for every non-pivot state, weights first and bias last.
//! The pivot state never appears in θ; its row is held at zero.
use ndarray::{Array1, Array2, ArrayView1};

use crate::{
    cpd::{
        core::shape::SoftmaxShape,
        errors::{CPDError, CPDResult},
    },
    optimization::loglik_optimizer::Theta,
};

/// Weights and offsets of a softmax CPD in plain array form.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftmaxParams {
    pub weights: Array2<f64>,
    pub offsets: Array1<f64>,
}

impl SoftmaxParams {
    /// All-zero parameters for `shape`.
    pub fn zeros(shape: &SoftmaxShape) -> Self {
        SoftmaxParams {
            weights: Array2::zeros(shape.weight_dims()),
            offsets: Array1::zeros(shape.child_states),
        }
    }

    /// Pair weights with offsets after checking both against `shape`.
    ///
    /// # Errors
    /// - [`CPDError::WeightShapeMismatch`] / [`CPDError::OffsetLengthMismatch`].
    pub fn from_parts(
        shape: &SoftmaxShape, weights: Array2<f64>, offsets: Array1<f64>,
    ) -> CPDResult<Self> {
        if weights.dim() != shape.weight_dims() {
            return Err(CPDError::WeightShapeMismatch {
                expected: shape.weight_dims(),
                found: weights.dim(),
            });
        }
        if offsets.len() != shape.child_states {
            return Err(CPDError::OffsetLengthMismatch {
                expected: shape.child_states,
                found: offsets.len(),
            });
        }
        Ok(SoftmaxParams { weights, offsets })
    }

    pub fn child_states(&self) -> usize {
        self.offsets.len()
    }

    pub fn parent_count(&self) -> usize {
        self.weights.ncols()
    }

    /// Fix the last state's logit at zero.
    ///
    /// Subtracts the last offset from every offset and the last weight row
    /// from every weight row, then zeroes the last row and offset exactly.
    /// Class probabilities are unchanged.
    pub fn pivot(&mut self) {
        let Some(last) = self.offsets.len().checked_sub(1) else {
            return;
        };
        let last_offset = self.offsets[last];
        self.offsets.mapv_inplace(|o| o - last_offset);
        let last_row = self.weights.row(last).to_owned();
        for mut row in self.weights.outer_iter_mut() {
            row -= &last_row;
        }
        self.offsets[last] = 0.0;
        self.weights.row_mut(last).fill(0.0);
    }

    /// Logit of `state` for one observation: `offset[state] + Σ_p w[state, p]·x_p`.
    #[inline]
    pub fn logit(&self, state: usize, x: ArrayView1<'_, f64>) -> f64 {
        self.offsets[state] + self.weights.row(state).dot(&x)
    }

    /// Flatten the non-pivot states into θ.
    pub fn pack(&self) -> Theta {
        let shape = self.shape();
        let mut theta = Theta::zeros(shape.free_parameter_count());
        for state in 0..shape.child_states.saturating_sub(1) {
            for parent in 0..shape.parent_count {
                theta[shape.theta_index(state, parent)] = self.weights[[state, parent]];
            }
            theta[shape.bias_index(state)] = self.offsets[state];
        }
        theta
    }

    /// Overwrite the non-pivot states from θ; the pivot row is left untouched.
    ///
    /// # Panics
    /// - If `theta.len()` differs from the free-parameter count. Callers
    ///   validate θ lengths before unpacking.
    pub fn unpack_from(&mut self, theta: &Theta) {
        let shape = self.shape();
        assert_eq!(theta.len(), shape.free_parameter_count(), "theta length mismatch");
        for state in 0..shape.child_states.saturating_sub(1) {
            for parent in 0..shape.parent_count {
                self.weights[[state, parent]] = theta[shape.theta_index(state, parent)];
            }
            self.offsets[state] = theta[shape.bias_index(state)];
        }
    }

    /// Dimensions implied by the stored arrays.
    pub fn shape(&self) -> SoftmaxShape {
        SoftmaxShape { child_states: self.child_states(), parent_count: self.parent_count() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The pivot transformation and its invariance of logit differences.
    // - θ packing/unpacking layout.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The pivot zeroes the last state exactly regardless of magnitude and
    // preserves every pairwise logit difference.
    //
    // Given
    // -----
    // - 3 states, 2 parents, large last-state parameters.
    //
    // Expect
    // ------
    // - Last offset and weight row are exactly 0.
    // - `logit_k - logit_last` is unchanged at an arbitrary input.
    fn pivot_zeroes_last_state_and_preserves_logit_differences() {
        // Arrange
        let mut params = SoftmaxParams {
            weights: array![[1.0, -2.0], [0.5, 0.25], [1e6, -3e5]],
            offsets: array![0.3, -1.2, 7e4],
        };
        let x = array![0.7, -1.1];
        let before: Vec<f64> =
            (0..3).map(|k| params.logit(k, x.view()) - params.logit(2, x.view())).collect();

        // Act
        params.pivot();

        // Assert
        assert_eq!(params.offsets[2], 0.0);
        assert!(params.weights.row(2).iter().all(|&w| w == 0.0));
        for k in 0..3 {
            assert_relative_eq!(params.logit(k, x.view()), before[k], max_relative = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // θ is state-major with the bias last in each block, and unpacking
    // restores the non-pivot states.
    //
    // Given
    // -----
    // - 3 states and 2 parents with distinct entries.
    //
    // Expect
    // ------
    // - `pack` yields `[w00, w01, o0, w10, w11, o1]`.
    // - `unpack_from` into zeros restores rows 0 and 1, leaves row 2 at zero.
    fn pack_and_unpack_follow_state_major_layout() {
        // Arrange
        let params = SoftmaxParams {
            weights: array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            offsets: array![10.0, 20.0, 30.0],
        };
        let shape = SoftmaxShape { child_states: 3, parent_count: 2 };
        let mut restored = SoftmaxParams::zeros(&shape);

        // Act
        let theta = params.pack();
        restored.unpack_from(&theta);

        // Assert
        assert_eq!(theta, array![1.0, 2.0, 10.0, 3.0, 4.0, 20.0]);
        assert_eq!(restored.weights, array![[1.0, 2.0], [3.0, 4.0], [0.0, 0.0]]);
        assert_eq!(restored.offsets, array![10.0, 20.0, 0.0]);
    }
}
