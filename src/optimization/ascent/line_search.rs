//! Backtracking line search with sign-flipping step halving.
//!
//! Moves are cumulative: every trial adds `step · dir` to the *current* `θ`,
//! not to the starting point. After a rejected trial a positive step becomes
//! `-step/2` (walking back past the last move) and a negative step is halved
//! again. The first trial whose value does not fall below the baseline is
//! accepted; if that step was negative the step is restored to its starting
//! value for the next outer iteration. The search gives up once
//! `|step| <= MIN_LINE_SEARCH_STEP`, leaving `θ` and the step where they are.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Grad, Theta, traits::LogLikelihood},
    numerical_stability::transformations::MIN_LINE_SEARCH_STEP,
};

/// Result of one line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchOutcome {
    /// Log-likelihood at the final `θ`; equals the baseline when no trial ran.
    pub value: f64,
    /// Whether a trial reached the baseline.
    pub accepted: bool,
    /// Number of objective evaluations performed.
    pub evaluations: u64,
}

/// Search along `dir` from `theta`, updating `theta` and `step` in place.
///
/// A NaN trial value counts as a decrease.
///
/// # Errors
/// Propagates failures of `f.value`.
pub fn backtracking_line_search<F: LogLikelihood>(
    f: &F, theta: &mut Theta, data: &F::Data, dir: &Grad, step: &mut f64, start_step: f64,
    baseline: f64,
) -> OptResult<LineSearchOutcome> {
    let mut outcome = LineSearchOutcome { value: baseline, accepted: false, evaluations: 0 };
    while step.abs() > MIN_LINE_SEARCH_STEP {
        theta.scaled_add(*step, dir);
        outcome.value = f.value(theta, data)?;
        outcome.evaluations += 1;
        if outcome.value >= baseline {
            if *step < 0.0 {
                *step = start_step;
            }
            outcome.accepted = true;
            break;
        }
        *step = if *step > 0.0 { -*step / 2.0 } else { *step / 2.0 };
    }
    Ok(outcome)
}

/// Relative change `|2(old - new) / (old + new)|` used as the stopping rule.
///
/// Returns `None` when `old + new == 0`; the ratio is undefined there and the
/// caller decides how to proceed.
pub fn relative_change(old: f64, new: f64) -> Option<f64> {
    let denom = old + new;
    if denom == 0.0 {
        return None;
    }
    Some((2.0 * (old - new) / denom).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Immediate acceptance and step bookkeeping.
    // - Cumulative back-off after overshooting.
    // - Exhaustion without acceptance.
    // - The relative-change criterion and its degenerate denominator.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -(θ - 1)².
    struct Parabola;

    impl LogLikelihood for Parabola {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<f64> {
            Ok(-(theta[0] - 1.0).powi(2))
        }

        fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // An improving first trial is accepted and the step is left unchanged.
    //
    // Given
    // -----
    // - θ = 0, dir = 1, step 0.5, baseline ℓ(0) = -1.
    //
    // Expect
    // ------
    // - θ = 0.5, value -0.25, one evaluation, step still 0.5.
    fn accepts_improving_first_trial() {
        // Arrange
        let mut theta = array![0.0];
        let mut step = 0.5;

        // Act
        let out =
            backtracking_line_search(&Parabola, &mut theta, &(), &array![1.0], &mut step, 0.5, -1.0)
                .unwrap();

        // Assert
        assert!(out.accepted);
        assert_eq!(out.evaluations, 1);
        assert_relative_eq!(theta[0], 0.5);
        assert_relative_eq!(out.value, -0.25);
        assert_eq!(step, 0.5);
    }

    #[test]
    // Purpose
    // -------
    // Overshooting walks back cumulatively and restores the start step.
    //
    // Given
    // -----
    // - θ = 0.25, dir = 1, step 4, baseline ℓ(0.25) = -0.5625.
    //
    // Expect
    // ------
    // - Trials at 4.25, 2.25, 1.25: θ = 1.25 accepted after three
    //   evaluations, with the negative step reset to 4.
    fn overshoot_backs_off_and_restores_step() {
        // Arrange
        let mut theta = array![0.25];
        let mut step = 4.0;

        // Act
        let out = backtracking_line_search(
            &Parabola,
            &mut theta,
            &(),
            &array![1.0],
            &mut step,
            4.0,
            -0.5625,
        )
        .unwrap();

        // Assert
        assert!(out.accepted);
        assert_eq!(out.evaluations, 3);
        assert_relative_eq!(theta[0], 1.25);
        assert_relative_eq!(out.value, -0.0625);
        assert_eq!(step, 4.0);
    }

    #[test]
    // Purpose
    // -------
    // A descent direction exhausts the search without acceptance.
    //
    // Given
    // -----
    // - θ = 1 (the optimum), dir = 1, step 0.1, baseline 0.
    //
    // Expect
    // ------
    // - Not accepted, |step| <= 1e-7 afterwards, θ within 1e-6 of the start.
    fn exhausts_when_no_trial_improves() {
        // Arrange
        let mut theta = array![1.0];
        let mut step = 0.1;

        // Act
        let out =
            backtracking_line_search(&Parabola, &mut theta, &(), &array![1.0], &mut step, 0.1, 0.0)
                .unwrap();

        // Assert
        assert!(!out.accepted);
        assert!(step.abs() <= MIN_LINE_SEARCH_STEP);
        assert_relative_eq!(theta[0], 1.0, epsilon = 1e-6);
        assert!(out.value < 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Objective failures abort the search.
    //
    // Given
    // -----
    // - An objective that always errors.
    //
    // Expect
    // ------
    // - The model error is returned.
    fn propagates_objective_errors() {
        struct Failing;
        impl LogLikelihood for Failing {
            type Data = ();
            fn value(&self, _theta: &Theta, _data: &()) -> OptResult<f64> {
                Err(OptError::Model { text: "boom".to_string() })
            }
            fn check(&self, _theta: &Theta, _data: &()) -> OptResult<()> {
                Ok(())
            }
        }
        let mut theta = array![0.0];
        let mut step = 0.1;

        let err =
            backtracking_line_search(&Failing, &mut theta, &(), &array![1.0], &mut step, 0.1, 0.0)
                .unwrap_err();

        assert_eq!(err, OptError::Model { text: "boom".to_string() });
    }

    #[test]
    // Purpose
    // -------
    // The relative change is symmetric-scaled and undefined at old + new = 0.
    //
    // Given
    // -----
    // - (old, new) = (-10, -9) and (1, -1).
    //
    // Expect
    // ------
    // - 2/19 and `None`.
    fn relative_change_matches_formula() {
        assert_relative_eq!(relative_change(-10.0, -9.0).unwrap(), 2.0 / 19.0);
        assert_eq!(relative_change(1.0, -1.0), None);
    }
}
