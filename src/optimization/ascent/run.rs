//! Outer loop of the line-search ascent optimizers.
use crate::optimization::{
    ascent::{
        direction::DirectionStrategy,
        line_search::{backtracking_line_search, relative_change},
        options::AscentOptions,
    },
    errors::OptResult,
    loglik_optimizer::{
        FnEvalMap, OptimOutcome, Theta,
        traits::LogLikelihood,
        validation::{validate_grad, validate_value},
    },
};

/// Maximize `f` from `theta0` with directions supplied by `strategy`.
///
/// Each outer iteration computes `∇ℓ(θ)`, asks the strategy for a direction
/// and runs [`backtracking_line_search`] against the previous value. The line
/// search step persists across iterations. The run stops when the relative
/// change `|2(old - new)/(old + new)|` drops to `opts.accuracy` or below, or
/// after `opts.max_iter` iterations. When `old + new == 0` the change is
/// undefined; the run then stops only if the value did not move.
///
/// The returned outcome reports `ℓ(θ̂)` and the gradient norm at `θ̂`.
///
/// # Errors
/// - Anything returned by `f.check`, `f.value`, `f.grad` or the strategy.
/// - [`OptError::NonFiniteCost`](crate::optimization::errors::OptError::NonFiniteCost)
///   if the starting or final log-likelihood is not finite.
pub fn maximize_ascent<F, D>(
    f: &F, theta0: Theta, data: &F::Data, opts: &AscentOptions, strategy: &mut D,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    D: DirectionStrategy,
{
    f.check(&theta0, data)?;
    let dim = theta0.len();
    let mut theta = theta0;
    let mut new_value = f.value(&theta, data)?;
    validate_value(new_value)?;
    let mut cost_count: u64 = 1;
    let mut gradient_count: u64 = 0;
    let mut step = opts.initial_step;
    let mut iterations = 0usize;
    log::debug!("{} ascent start: log-likelihood {new_value:.6}", strategy.name());

    let converged = loop {
        iterations += 1;
        let old_value = new_value;

        let grad = f.grad(&theta, data)?;
        validate_grad(&grad, dim)?;
        gradient_count += 1;
        let dir = strategy.direction(f, &theta, data, &grad)?;

        let search = backtracking_line_search(
            f,
            &mut theta,
            data,
            &dir,
            &mut step,
            opts.initial_step,
            old_value,
        )?;
        cost_count += search.evaluations;
        new_value = search.value;
        if !search.accepted && search.evaluations > 0 {
            log::warn!(
                "{} ascent: line search exhausted at iteration {iterations} (step {step:e})",
                strategy.name()
            );
        }
        log::trace!(
            "{} ascent iteration {iterations}: log-likelihood {new_value:.6}, step {step}",
            strategy.name()
        );

        let keep_going = match relative_change(old_value, new_value) {
            Some(change) => change > opts.accuracy,
            None => {
                log::warn!(
                    "{} ascent: relative change undefined at iteration {iterations} \
                     (old + new log-likelihood is zero)",
                    strategy.name()
                );
                old_value != new_value
            }
        };
        if !keep_going {
            break true;
        }
        if iterations >= opts.max_iter {
            log::warn!(
                "{} ascent stopped at the iteration cap ({}) before converging",
                strategy.name(),
                opts.max_iter
            );
            break false;
        }
    };

    validate_value(new_value)?;
    let final_grad = f.grad(&theta, data)?;
    gradient_count += 1;
    log::debug!(
        "{} ascent finished after {iterations} iterations: log-likelihood {new_value:.6}",
        strategy.name()
    );

    let mut fn_evals = FnEvalMap::new();
    fn_evals.insert("cost_count".to_string(), cost_count);
    fn_evals.insert("gradient_count".to_string(), gradient_count);
    let status = if converged { "Converged" } else { "Maximum iterations reached" };
    OptimOutcome::from_ascent(
        theta,
        new_value,
        converged,
        status,
        iterations,
        fn_evals,
        Some(&final_grad),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        ascent::direction::{ConjugateGradient, NewtonStep, SteepestAscent},
        errors::OptError,
        loglik_optimizer::{Grad, types::Hessian},
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Convergence of each direction strategy on a concave objective with a
    //   non-zero optimum value.
    // - The iteration cap and the reported status.
    // - Rejection of a non-finite starting value.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -10 - (θ₀ - 1)² - 2(θ₁ + 0.5)²; maximum -10 at (1, -0.5).
    struct Bowl;

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<f64> {
            if theta[0].is_nan() {
                return Ok(f64::NAN);
            }
            Ok(-10.0 - (theta[0] - 1.0).powi(2) - 2.0 * (theta[1] + 0.5).powi(2))
        }

        fn check(&self, theta: &Theta, _data: &()) -> OptResult<()> {
            if theta.len() != 2 {
                return Err(OptError::ThetaLengthMismatch { expected: 2, actual: theta.len() });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, _data: &()) -> OptResult<Grad> {
            Ok(array![-2.0 * (theta[0] - 1.0), -4.0 * (theta[1] + 0.5)])
        }

        fn hessian(&self, _theta: &Theta, _data: &()) -> OptResult<Hessian> {
            Ok(array![[-2.0, 0.0], [0.0, -4.0]])
        }
    }

    fn tight() -> AscentOptions {
        AscentOptions::new(1e-10, 0.1, 10_000).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Steepest ascent converges and never ends below the starting value.
    //
    // Given
    // -----
    // - θ₀ = (0, 0), accuracy 1e-10, step 0.1.
    //
    // Expect
    // ------
    // - Converged, ℓ(θ̂) ≈ -10, θ̂ ≈ (1, -0.5).
    fn steepest_ascent_converges_on_bowl() {
        // Arrange
        let start = Bowl.value(&array![0.0, 0.0], &()).unwrap();

        // Act
        let out =
            maximize_ascent(&Bowl, array![0.0, 0.0], &(), &tight(), &mut SteepestAscent).unwrap();

        // Assert
        assert!(out.converged);
        assert!(out.value >= start);
        assert_relative_eq!(out.value, -10.0, epsilon = 1e-6);
        assert_relative_eq!(out.theta_hat[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(out.theta_hat[1], -0.5, epsilon = 1e-3);
        assert!(out.fn_evals["cost_count"] > out.iterations as u64);
    }

    #[test]
    // Purpose
    // -------
    // Conjugate gradient and Newton directions reach the same optimum.
    //
    // Given
    // -----
    // - θ₀ = (3, 2), accuracy 1e-10.
    //
    // Expect
    // ------
    // - Both values within 1e-6 of -10.
    fn conjugate_gradient_and_newton_converge_on_bowl() {
        let cg = maximize_ascent(
            &Bowl,
            array![3.0, 2.0],
            &(),
            &tight(),
            &mut ConjugateGradient::new(),
        )
        .unwrap();
        let newton = maximize_ascent(
            &Bowl,
            array![3.0, 2.0],
            &(),
            &AscentOptions::new(1e-10, 1.0, 100).unwrap(),
            &mut NewtonStep,
        )
        .unwrap();

        assert_relative_eq!(cg.value, -10.0, epsilon = 1e-6);
        assert_relative_eq!(newton.value, -10.0, epsilon = 1e-9);
        assert_relative_eq!(newton.theta_hat[0], 1.0, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Hitting the iteration cap is reported as non-converged.
    //
    // Given
    // -----
    // - max_iter = 2 with a tiny step.
    //
    // Expect
    // ------
    // - `converged == false`, two iterations, cap status.
    fn iteration_cap_is_reported() {
        let opts = AscentOptions::new(1e-12, 1e-3, 2).unwrap();

        let out = maximize_ascent(&Bowl, array![0.0, 0.0], &(), &opts, &mut SteepestAscent).unwrap();

        assert!(!out.converged);
        assert_eq!(out.iterations, 2);
        assert_eq!(out.status, "Maximum iterations reached");
    }

    #[test]
    // Purpose
    // -------
    // Invalid starting points fail before any iteration.
    //
    // Given
    // -----
    // - A θ₀ of the wrong length, and a θ₀ whose value is NaN.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch` and `NonFiniteCost`.
    fn invalid_start_is_rejected() {
        let opts = tight();

        let short = maximize_ascent(&Bowl, array![0.0], &(), &opts, &mut SteepestAscent);
        let nan = maximize_ascent(&Bowl, array![f64::NAN, 0.0], &(), &opts, &mut SteepestAscent);

        assert!(matches!(short, Err(OptError::ThetaLengthMismatch { .. })));
        assert!(matches!(nan, Err(OptError::NonFiniteCost { .. })));
    }
}
