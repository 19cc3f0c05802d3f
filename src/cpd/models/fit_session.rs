//! Maximum-likelihood fitting on learning copies of a softmax CPD.
//!
//! Purpose
//! -------
//! Keep fitting state apart from the live CPD. A [`FitSession`] owns deep
//! copies of the weights and offsets, a Hessian buffer of side
//! `(K − 1)·node_count`, the optimizer selection inherited from the CPD, and
//! the outcome of the last fit. The live CPD only changes when the session
//! is committed with [`SoftmaxCPD::commit_learning`](super::softmax::SoftmaxCPD::commit_learning).
//!
//! Key behaviors
//! -------------
//! - [`FitSession::maximum_likelihood_with`] validates the batch, pivots the
//!   learning copies once, and dispatches on [`OptimizerKind`]:
//!   gradient ascent, conjugate gradient, or L-BFGS. The Newton method is
//!   recognized but not dispatched and fails with `NotImplemented`.
//! - [`FitSession::calculate_hessian`] fills the buffer with the analytic
//!   Hessian at the learning copies and inverts it in place.
//! - [`FitSession::standard_errors`] reports classical standard errors of
//!   the free parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Learning copies always match the session's shape when present.
//! - A failed fit leaves the learning copies untouched.
use ndarray::{Array1, Array2};

use crate::{
    cpd::{
        core::{
            likelihood,
            node_type::NodeType,
            observations::SoftmaxObservations,
            options::{DEFAULT_MAX_ITER, FitOptions, OptimizerKind},
            params::SoftmaxParams,
            shape::SoftmaxShape,
        },
        errors::{CPDError, CPDResult},
        models::objective::SoftmaxObjective,
    },
    inference::hessian::{invert_in_place, log_likelihood_hessian, standard_errors},
    optimization::{
        ascent::{ConjugateGradient, SteepestAscent, maximize_ascent},
        loglik_optimizer::{Grad, Hessian, OptimOutcome, maximize},
    },
};

/// Learning state of one softmax CPD.
#[derive(Debug, Clone)]
pub struct FitSession {
    node_types: Vec<NodeType>,
    shape: SoftmaxShape,
    weights: Option<Array2<f64>>,
    offsets: Option<Array1<f64>>,
    hessian: Hessian,
    optimizer_kind: OptimizerKind,
    outcome: Option<OptimOutcome>,
}

impl FitSession {
    /// Session over `params`, which must already match the node types.
    pub(crate) fn new(
        node_types: Vec<NodeType>, params: SoftmaxParams, optimizer_kind: OptimizerKind,
    ) -> Self {
        let shape = params.shape();
        let side = shape.hessian_side();
        FitSession {
            node_types,
            shape,
            weights: Some(params.weights),
            offsets: Some(params.offsets),
            hessian: Hessian::zeros((side, side)),
            optimizer_kind,
            outcome: None,
        }
    }

    pub fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    pub fn shape(&self) -> SoftmaxShape {
        self.shape
    }

    pub fn optimizer_kind(&self) -> OptimizerKind {
        self.optimizer_kind
    }

    pub fn set_optimizer_kind(&mut self, kind: OptimizerKind) {
        self.optimizer_kind = kind;
    }

    pub fn learning_weights(&self) -> Option<&Array2<f64>> {
        self.weights.as_ref()
    }

    pub fn learning_offsets(&self) -> Option<&Array1<f64>> {
        self.offsets.as_ref()
    }

    /// Hessian buffer; holds the inverse after [`FitSession::calculate_hessian`].
    pub fn hessian(&self) -> &Hessian {
        &self.hessian
    }

    /// Outcome of the last successful fit.
    pub fn outcome(&self) -> Option<&OptimOutcome> {
        self.outcome.as_ref()
    }

    /// Drop the learning copies and reset the Hessian buffer and outcome.
    pub fn clear_statistics(&mut self) {
        self.weights = None;
        self.offsets = None;
        self.hessian.fill(0.0);
        self.outcome = None;
    }

    /// Replace the learning weights.
    ///
    /// # Errors
    /// - [`CPDError::WeightShapeMismatch`] unless the shape is `[K, P]`.
    pub fn set_statistics(&mut self, weights: Array2<f64>) -> CPDResult<()> {
        if weights.dim() != self.shape.weight_dims() {
            return Err(CPDError::WeightShapeMismatch {
                expected: self.shape.weight_dims(),
                found: weights.dim(),
            });
        }
        self.weights = Some(weights);
        Ok(())
    }

    /// Replace the learning offsets.
    ///
    /// # Errors
    /// - [`CPDError::OffsetLengthMismatch`] unless the length is `K`.
    pub fn set_offset_statistics(&mut self, offsets: Array1<f64>) -> CPDResult<()> {
        if offsets.len() != self.shape.child_states {
            return Err(CPDError::OffsetLengthMismatch {
                expected: self.shape.child_states,
                found: offsets.len(),
            });
        }
        self.offsets = Some(offsets);
        Ok(())
    }

    /// Copy of the learning parameters.
    ///
    /// # Errors
    /// - [`CPDError::LearningNotInitialized`] if either copy was cleared.
    pub fn learning_params(&self) -> CPDResult<SoftmaxParams> {
        let weights =
            self.weights.clone().ok_or(CPDError::LearningNotInitialized { what: "weights" })?;
        let offsets =
            self.offsets.clone().ok_or(CPDError::LearningNotInitialized { what: "offsets" })?;
        Ok(SoftmaxParams { weights, offsets })
    }

    /// Consume the session, yielding the learning parameters.
    ///
    /// # Errors
    /// - [`CPDError::LearningNotInitialized`] if either copy was cleared.
    pub fn into_params(self) -> CPDResult<SoftmaxParams> {
        let weights = self.weights.ok_or(CPDError::LearningNotInitialized { what: "weights" })?;
        let offsets = self.offsets.ok_or(CPDError::LearningNotInitialized { what: "offsets" })?;
        Ok(SoftmaxParams { weights, offsets })
    }

    /// Pivot the learning copies: the last state's row and offset become zero.
    ///
    /// # Errors
    /// - [`CPDError::LearningNotInitialized`] if either copy was cleared.
    pub fn pivot(&mut self) -> CPDResult<()> {
        let mut params = self.learning_params()?;
        params.pivot();
        self.store(params);
        Ok(())
    }

    /// Log-likelihood of `obs` under the learning copies.
    ///
    /// # Errors
    /// - Observation mismatches from [`SoftmaxObservations::check_against`].
    /// - [`CPDError::LearningNotInitialized`] if a copy was cleared.
    /// - [`CPDError::NonFiniteLikelihood`] if the value is NaN/±inf.
    pub fn log_likelihood(&self, obs: &SoftmaxObservations) -> CPDResult<f64> {
        obs.check_against(&self.shape)?;
        let value = likelihood::log_likelihood(&self.learning_params()?, obs);
        if !value.is_finite() {
            return Err(CPDError::NonFiniteLikelihood { value });
        }
        Ok(value)
    }

    /// Gradient of the log-likelihood at the learning copies, in θ layout.
    ///
    /// # Errors
    /// As for [`FitSession::log_likelihood`], minus the finiteness check.
    pub fn gradient(&self, obs: &SoftmaxObservations) -> CPDResult<Grad> {
        obs.check_against(&self.shape)?;
        Ok(likelihood::gradient(&self.learning_params()?, obs))
    }

    /// Fill the Hessian buffer at the learning copies and invert it in place.
    ///
    /// # Errors
    /// - Observation mismatches and [`CPDError::LearningNotInitialized`].
    /// - [`CPDError::SingularHessian`]; the buffer then holds the
    ///   uninverted Hessian.
    pub fn calculate_hessian(&mut self, obs: &SoftmaxObservations) -> CPDResult<&Hessian> {
        obs.check_against(&self.shape)?;
        let params = self.learning_params()?;
        self.hessian.assign(&log_likelihood_hessian(&params, obs));
        invert_in_place(&mut self.hessian)?;
        Ok(&self.hessian)
    }

    /// Standard errors of the free parameters at the learning copies, in θ
    /// order, from the observed information `−H`.
    ///
    /// # Errors
    /// - Observation mismatches and [`CPDError::LearningNotInitialized`].
    pub fn standard_errors(&self, obs: &SoftmaxObservations) -> CPDResult<Array1<f64>> {
        obs.check_against(&self.shape)?;
        let params = self.learning_params()?;
        standard_errors(&log_likelihood_hessian(&params, obs))
    }

    /// Fit with the default iteration cap and L-BFGS memory.
    ///
    /// # Errors
    /// As for [`FitSession::maximum_likelihood_with`], plus option validation.
    pub fn maximum_likelihood(
        &mut self, obs: &SoftmaxObservations, accuracy: f64, initial_step: f64,
    ) -> CPDResult<&OptimOutcome> {
        let options = FitOptions::new(accuracy, initial_step, DEFAULT_MAX_ITER, None)?;
        self.maximum_likelihood_with(obs, &options)
    }

    /// Fit the learning copies to `obs` with the session's optimizer.
    ///
    /// The learning copies are pivoted once, θ is packed from the non-pivot
    /// states, and the fitted θ̂ is unpacked back on success.
    ///
    /// # Errors
    /// - Observation mismatches from [`SoftmaxObservations::check_against`].
    /// - [`CPDError::LearningNotInitialized`] if a copy was cleared.
    /// - [`CPDError::NotImplemented`] for [`OptimizerKind::Hessian`].
    /// - [`CPDError::OptimizationFailed`] for optimizer failures.
    pub fn maximum_likelihood_with(
        &mut self, obs: &SoftmaxObservations, options: &FitOptions,
    ) -> CPDResult<&OptimOutcome> {
        obs.check_against(&self.shape)?;
        let mut params = self.learning_params()?;
        params.pivot();
        let objective = SoftmaxObjective::new(self.shape);
        let theta0 = params.pack();
        log::debug!(
            "fitting softmax CPD ({} states, {} parents) on {} observations with {:?}",
            self.shape.child_states,
            self.shape.parent_count,
            obs.len(),
            self.optimizer_kind
        );
        let outcome = match self.optimizer_kind {
            OptimizerKind::Gradient => maximize_ascent(
                &objective,
                theta0,
                obs,
                &options.ascent_options(),
                &mut SteepestAscent,
            )?,
            OptimizerKind::ConjugateGradient => maximize_ascent(
                &objective,
                theta0,
                obs,
                &options.ascent_options(),
                &mut ConjugateGradient::new(),
            )?,
            OptimizerKind::Lbfgs(line_searcher) => {
                maximize(&objective, theta0, obs, &options.mle_options(line_searcher)?)?
            }
            OptimizerKind::Hessian => {
                return Err(CPDError::NotImplemented { operation: "Newton maximum likelihood" });
            }
        };
        params.unpack_from(&outcome.theta_hat);
        self.store(params);
        log::debug!(
            "softmax fit finished: log-likelihood {:.6} after {} iterations ({})",
            outcome.value,
            outcome.iterations,
            outcome.status
        );
        Ok(self.outcome.insert(outcome))
    }

    fn store(&mut self, params: SoftmaxParams) {
        self.weights = Some(params.weights);
        self.offsets = Some(params.offsets);
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
    // - Statistics setters and clearing.
    // - Pivoting of the learning copies.
    // - Hessian buffer inversion and the disabled Newton dispatch.
    // - A small gradient-ascent fit improving the likelihood.
    // -------------------------------------------------------------------------

    fn session(kind: OptimizerKind) -> FitSession {
        let params = SoftmaxParams {
            weights: array![[0.5, -0.3], [0.1, 0.2], [1.0, -1.0]],
            offsets: array![0.2, -0.1, 0.4],
        };
        let node_types =
            vec![NodeType::continuous(), NodeType::continuous(), NodeType::discrete(3)];
        FitSession::new(node_types, params, kind)
    }

    fn batch() -> SoftmaxObservations {
        SoftmaxObservations::new(
            array![[0.1, 1.2], [-0.7, 0.3], [1.5, -0.4], [0.0, 0.9], [-1.1, -0.6], [0.8, 0.8]],
            array![0, 1, 2, 1, 0, 2],
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Pivoting zeroes the last row and offset of the learning copies.
    //
    // Given
    // -----
    // - Learning weights whose last row is [1, -1] and last offset 0.4.
    //
    // Expect
    // ------
    // - Last row and offset exactly zero; first offset 0.2 - 0.4.
    fn pivot_zeroes_last_state() {
        // Arrange
        let mut s = session(OptimizerKind::Gradient);

        // Act
        s.pivot().unwrap();

        // Assert
        let w = s.learning_weights().unwrap();
        let o = s.learning_offsets().unwrap();
        assert_eq!(w.row(2).to_vec(), vec![0.0, 0.0]);
        assert_eq!(o[2], 0.0);
        assert_relative_eq!(o[0], -0.2, epsilon = 1e-12);
        assert_relative_eq!(w[[0, 0]], -0.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Cleared statistics make every learning operation fail, and setters
    // validate shapes.
    //
    // Given
    // -----
    // - A session after `clear_statistics`.
    //
    // Expect
    // ------
    // - `LearningNotInitialized` from the likelihood and Hessian, and shape
    //   errors for wrongly sized statistics.
    fn cleared_statistics_are_reported() {
        // Arrange
        let mut s = session(OptimizerKind::Gradient);
        s.clear_statistics();

        // Act / Assert
        assert_eq!(
            s.log_likelihood(&batch()),
            Err(CPDError::LearningNotInitialized { what: "weights" })
        );
        assert!(matches!(
            s.calculate_hessian(&batch()),
            Err(CPDError::LearningNotInitialized { .. })
        ));
        assert!(matches!(
            s.set_statistics(Array2::zeros((2, 3))),
            Err(CPDError::WeightShapeMismatch { .. })
        ));
        assert!(matches!(
            s.set_offset_statistics(Array1::zeros(2)),
            Err(CPDError::OffsetLengthMismatch { expected: 3, found: 2 })
        ));
        s.set_statistics(Array2::zeros((3, 2))).unwrap();
        s.set_offset_statistics(Array1::zeros(3)).unwrap();
        assert_relative_eq!(s.log_likelihood(&batch()).unwrap(), -6.0 * 3f64.ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The Hessian buffer holds the inverse of the analytic Hessian.
    //
    // Given
    // -----
    // - Pivoted learning copies and six observations.
    //
    // Expect
    // ------
    // - A 6×6 buffer whose product with the analytic Hessian is the identity.
    fn calculate_hessian_inverts_buffer() {
        // Arrange
        let mut s = session(OptimizerKind::Gradient);
        s.pivot().unwrap();
        let h = log_likelihood_hessian(&s.learning_params().unwrap(), &batch());

        // Act
        let inv = s.calculate_hessian(&batch()).unwrap().clone();

        // Assert
        assert_eq!(inv.dim(), (6, 6));
        let product = h.dot(&inv);
        for ((i, j), &v) in product.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_relative_eq!(v, expected, epsilon = 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // The Newton optimizer is recognized but not dispatched.
    //
    // Given
    // -----
    // - A session whose optimizer kind is `Hessian`.
    //
    // Expect
    // ------
    // - `NotImplemented` and untouched learning copies.
    fn newton_dispatch_is_not_implemented() {
        // Arrange
        let mut s = session(OptimizerKind::Hessian);
        let before = s.learning_params().unwrap();

        // Act
        let err = s.maximum_likelihood(&batch(), 1e-4, 0.1).unwrap_err();

        // Assert
        assert!(matches!(err, CPDError::NotImplemented { .. }));
        assert_eq!(s.learning_params().unwrap(), before);
        assert!(s.outcome().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Gradient ascent raises the likelihood of the learning copies.
    //
    // Given
    // -----
    // - Six observations, accuracy 1e-6, step 0.1.
    //
    // Expect
    // ------
    // - Final log-likelihood at least the initial one, stored outcome equal
    //   to the session's likelihood, and a pivoted last state.
    fn gradient_fit_improves_likelihood() {
        // Arrange
        let mut s = session(OptimizerKind::Gradient);
        let mut pivoted = s.clone();
        pivoted.pivot().unwrap();
        let initial = pivoted.log_likelihood(&batch()).unwrap();
        let options = FitOptions::new(1e-6, 0.1, 10_000, None).unwrap();

        // Act
        let value = s.maximum_likelihood_with(&batch(), &options).unwrap().value;

        // Assert
        assert!(value >= initial);
        assert_relative_eq!(s.log_likelihood(&batch()).unwrap(), value, epsilon = 1e-10);
        assert_eq!(s.learning_offsets().unwrap()[2], 0.0);
        assert_eq!(s.learning_weights().unwrap().row(2).to_vec(), vec![0.0, 0.0]);
    }
}
