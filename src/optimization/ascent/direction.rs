//! Search-direction strategies for the ascent loop.
//!
//! A strategy is asked once per outer iteration for the direction along which
//! the line search moves `θ`. Strategies may keep state between iterations
//! (conjugate gradient caches its previous direction), so they take
//! `&mut self` and a fresh instance should be used per run.
use crate::{
    inference::hessian::invert_in_place,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Grad, Theta, traits::LogLikelihood, validation::validate_hessian},
    },
};

/// Produces an ascent direction from the current point and its gradient.
pub trait DirectionStrategy {
    /// Short label used in log messages and outcome status strings.
    fn name(&self) -> &'static str;

    /// Direction for the line search starting at `theta`, where `grad` is
    /// `∇ℓ(theta)`.
    fn direction<F: LogLikelihood>(
        &mut self, f: &F, theta: &Theta, data: &F::Data, grad: &Grad,
    ) -> OptResult<Grad>;
}

/// Plain gradient ascent: the direction is the gradient itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteepestAscent;

impl DirectionStrategy for SteepestAscent {
    fn name(&self) -> &'static str {
        "gradient"
    }

    fn direction<F: LogLikelihood>(
        &mut self, _f: &F, _theta: &Theta, _data: &F::Data, grad: &Grad,
    ) -> OptResult<Grad> {
        Ok(grad.clone())
    }
}

/// Conjugate-gradient directions.
///
/// With `d` the previously used direction and `g` the current gradient:
/// `β = -‖g‖² / ‖d‖²` and the new direction is `g - β·d`. The first
/// iteration uses `g`. The method restarts from `g` when `‖d‖² = 0` or when
/// the corrected direction is not an ascent direction (`g·d_new <= 0`).
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradient {
    prev: Option<Grad>,
}

impl ConjugateGradient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction used at the previous iteration, if any.
    pub fn previous_direction(&self) -> Option<&Grad> {
        self.prev.as_ref()
    }

    fn next_direction(&self, grad: &Grad) -> Grad {
        let Some(prev) = self.prev.as_ref() else {
            return grad.clone();
        };
        let prev_norm_sq = prev.dot(prev);
        if prev_norm_sq == 0.0 || prev.len() != grad.len() {
            return grad.clone();
        }
        let beta = -(grad.dot(grad) / prev_norm_sq);
        let mut dir = grad.clone();
        dir.scaled_add(-beta, prev);
        if grad.dot(&dir) <= 0.0 || dir.iter().any(|v| !v.is_finite()) {
            log::trace!("conjugate gradient restart with steepest direction");
            return grad.clone();
        }
        dir
    }
}

impl DirectionStrategy for ConjugateGradient {
    fn name(&self) -> &'static str {
        "conjugate gradient"
    }

    fn direction<F: LogLikelihood>(
        &mut self, _f: &F, _theta: &Theta, _data: &F::Data, grad: &Grad,
    ) -> OptResult<Grad> {
        let dir = self.next_direction(grad);
        self.prev = Some(dir.clone());
        Ok(dir)
    }
}

/// Newton directions `d = -H⁻¹ g` from the objective's analytic Hessian.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewtonStep;

impl DirectionStrategy for NewtonStep {
    fn name(&self) -> &'static str {
        "newton"
    }

    fn direction<F: LogLikelihood>(
        &mut self, f: &F, theta: &Theta, data: &F::Data, grad: &Grad,
    ) -> OptResult<Grad> {
        let mut hessian = f.hessian(theta, data)?;
        validate_hessian(&hessian, theta.len())?;
        invert_in_place(&mut hessian).map_err(OptError::from)?;
        Ok(-hessian.dot(grad))
    }
}
