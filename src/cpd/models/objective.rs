//! Softmax log-likelihood as an optimizer objective.
//!
//! [`SoftmaxObjective`] evaluates `ℓ(θ)`, `∇ℓ(θ)` and `∇²ℓ(θ)` for a flat θ
//! of a pivoted softmax CPD. θ is unpacked into a scratch parameter pack
//! whose pivot row stays at zero, so every evaluation sees the pivoted model.
use std::cell::RefCell;

use crate::{
    cpd::core::{
        likelihood::{gradient, log_likelihood},
        observations::SoftmaxObservations,
        params::SoftmaxParams,
        shape::SoftmaxShape,
    },
    inference::hessian::log_likelihood_hessian,
    optimization::{
        errors::OptResult,
        loglik_optimizer::{
            Cost, Grad, Hessian, Theta, traits::LogLikelihood, validation::validate_theta,
        },
    },
};

/// Objective over the free parameters of a softmax CPD.
#[derive(Debug)]
pub struct SoftmaxObjective {
    shape: SoftmaxShape,
    scratch: RefCell<SoftmaxParams>,
}

impl SoftmaxObjective {
    pub fn new(shape: SoftmaxShape) -> Self {
        SoftmaxObjective { shape, scratch: RefCell::new(SoftmaxParams::zeros(&shape)) }
    }

    pub fn shape(&self) -> SoftmaxShape {
        self.shape
    }

    /// Evaluate `eval` on the parameters encoded by `theta`.
    fn with_params<R>(&self, theta: &Theta, eval: impl FnOnce(&SoftmaxParams) -> R) -> OptResult<R> {
        validate_theta(theta, self.shape.free_parameter_count())?;
        let mut params = self.scratch.borrow_mut();
        params.unpack_from(theta);
        Ok(eval(&params))
    }
}

impl LogLikelihood for SoftmaxObjective {
    type Data = SoftmaxObservations;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        self.with_params(theta, |params| log_likelihood(params, data))
    }

    /// Validate θ and the observation batch against the CPD's dimensions.
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        validate_theta(theta, self.shape.free_parameter_count())?;
        data.check_against(&self.shape)?;
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &Self::Data) -> OptResult<Grad> {
        self.with_params(theta, |params| gradient(params, data))
    }

    fn hessian(&self, theta: &Theta, data: &Self::Data) -> OptResult<Hessian> {
        self.with_params(theta, |params| log_likelihood_hessian(params, data))
    }
}
